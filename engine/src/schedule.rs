//! Time schedules for event generators and samplers

use crate::Time;

/// Set of points in time
#[derive(Clone, Debug, PartialEq)]
pub enum Schedule {
    /// Every `interval` ms, starting at 0
    Regular {
        /// Time between two consecutive points (ms)
        interval: Time,
    },

    /// Explicit list of times (ms)
    Explicit(Vec<Time>),
}
//
impl Schedule {
    /// Regular schedule
    pub fn regular(interval: Time) -> Self {
        Self::Regular { interval }
    }

    /// Schedule with a single point in time
    pub fn once(time: Time) -> Self {
        Self::Explicit(vec![time])
    }

    /// Points of the schedule in `[0, end)`, in increasing order
    ///
    /// Regular points closer to `end` than a billionth of the interval are
    /// considered to fall on `end` and thus excluded.
    pub fn times_until(&self, end: Time) -> Vec<Time> {
        match self {
            Self::Regular { interval } => {
                if !(*interval > 0.0) || !end.is_finite() {
                    return Vec::new();
                }
                let limit = end - 1e-9 * interval;
                (0..)
                    .map(|idx| idx as Time * interval)
                    .take_while(|&time| time < limit)
                    .collect()
            }
            Self::Explicit(times) => {
                let mut times = times
                    .iter()
                    .copied()
                    .filter(|&time| (0.0..end).contains(&time))
                    .collect::<Vec<_>>();
                times.sort_by(Time::total_cmp);
                times
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular() {
        let schedule = Schedule::regular(0.01);
        assert_eq!(schedule.times_until(50.1).len(), 5010);
        assert_eq!(schedule.times_until(0.0), Vec::<Time>::new());
        assert_eq!(Schedule::regular(0.0).times_until(1.0), Vec::<Time>::new());
    }

    #[test]
    fn explicit() {
        let schedule = Schedule::Explicit(vec![3.0, 1.0, 7.0, -1.0]);
        assert_eq!(schedule.times_until(5.0), vec![1.0, 3.0]);
        assert_eq!(Schedule::once(0.0).times_until(1.0), vec![0.0]);
    }
}
