//! Tolerance bands and element-wise comparison

use data::Precision;
use ndarray::{ArrayView, Dimension, IntoDimension};
use std::fmt;

/// Relative tolerance applied on top of the absolute one, as `numpy.allclose`
/// does by default
pub const RELATIVE_TOLERANCE: Precision = 1e-5;

/// Accepted deviations, as fractions of the peak injected value
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tolerance {
    /// Deviation accepted on the initial state
    pub initial: Precision,

    /// Deviation accepted on the final, near-equilibrium state
    pub steady_state: Precision,

    /// Deviation accepted anywhere along the trajectory
    pub dynamic: Precision,
}
//
impl Default for Tolerance {
    fn default() -> Self {
        Self {
            initial: 0.05,
            steady_state: 0.05,
            dynamic: 0.20,
        }
    }
}
//
impl Tolerance {
    /// Convert to absolute tolerances, given the peak value of the field
    pub fn absolute(&self, peak: Precision) -> Self {
        Self {
            initial: self.initial * peak,
            steady_state: self.steady_state * peak,
            dynamic: self.dynamic * peak,
        }
    }
}

/// Outcome of an element-wise comparison
#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    /// Absolute tolerance that was used
    pub atol: Precision,

    /// Whether every element was within tolerance
    pub within_tolerance: bool,

    /// Number of elements outside of the tolerance
    pub num_mismatches: usize,

    /// Largest absolute deviation (NaN deviations count as infinite)
    pub max_deviation: Precision,

    /// Index of the largest deviation, if any element was compared
    pub worst_index: Option<Vec<usize>>,
}
//
impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mismatches, max deviation {:.3e} (atol {:.3e})",
            self.num_mismatches, self.max_deviation, self.atol
        )?;
        if let Some(index) = &self.worst_index {
            write!(f, " at {index:?}")?;
        }
        Ok(())
    }
}

/// Arrays of different shapes were compared
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
#[error("cannot compare arrays of shapes {observed:?} and {reference:?}")]
pub struct ShapeMismatch {
    pub observed: Vec<usize>,
    pub reference: Vec<usize>,
}

/// Element-wise check that `|observed - reference| <= atol + rtol·|reference|`
/// with `rtol` = [`RELATIVE_TOLERANCE`]
///
/// NaNs are never considered close to anything.
pub fn allclose<D: Dimension>(
    observed: ArrayView<Precision, D>,
    reference: ArrayView<Precision, D>,
    atol: Precision,
) -> Result<Comparison, ShapeMismatch> {
    if observed.shape() != reference.shape() {
        return Err(ShapeMismatch {
            observed: observed.shape().to_vec(),
            reference: reference.shape().to_vec(),
        });
    }

    let mut num_mismatches = 0;
    let mut worst: Option<(Precision, D::Pattern)> = None;
    for ((index, &a), &b) in observed.indexed_iter().zip(reference.iter()) {
        let deviation = (a - b).abs();
        if !(deviation <= atol + RELATIVE_TOLERANCE * b.abs()) {
            num_mismatches += 1;
        }
        let deviation = if deviation.is_nan() {
            Precision::INFINITY
        } else {
            deviation
        };
        if worst.as_ref().map_or(true, |(max, _)| deviation > *max) {
            worst = Some((deviation, index));
        }
    }

    let (max_deviation, worst_index) = match worst {
        Some((deviation, index)) => (
            deviation,
            Some(index.into_dimension().slice().to_vec()),
        ),
        None => (0.0, None),
    };
    Ok(Comparison {
        atol,
        within_tolerance: num_mismatches == 0,
        num_mismatches,
        max_deviation,
        worst_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn absolute_bands() {
        let absolute = Tolerance::default().absolute(2.0);
        assert_eq!(absolute.initial, 0.1);
        assert_eq!(absolute.steady_state, 0.1);
        assert_eq!(absolute.dynamic, 0.4);
    }

    #[test]
    fn close_arrays() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[1.05, 2.0], [3.0, 3.9]];
        let comparison = allclose(a.view(), b.view(), 0.11).unwrap();
        assert!(comparison.within_tolerance);
        assert_eq!(comparison.worst_index, Some(vec![1, 1]));
        assert!((comparison.max_deviation - 0.1).abs() < 1e-12);
    }

    #[test]
    fn distant_arrays() {
        let a = array![0.0, 0.5, 1.0];
        let b = array![0.0, 0.2, 1.0];
        let comparison = allclose(a.view(), b.view(), 0.1).unwrap();
        assert!(!comparison.within_tolerance);
        assert_eq!(comparison.num_mismatches, 1);
        assert_eq!(comparison.worst_index, Some(vec![1]));
    }

    #[test]
    fn relative_part() {
        let a = array![1e6 + 5.0];
        let b = array![1e6];
        assert!(allclose(a.view(), b.view(), 0.0).unwrap().within_tolerance);
    }

    #[test]
    fn nan_never_matches() {
        let a = array![Precision::NAN];
        let comparison = allclose(a.view(), a.view(), 1.0).unwrap();
        assert!(!comparison.within_tolerance);
        assert_eq!(comparison.max_deviation, Precision::INFINITY);
    }

    #[test]
    fn shape_mismatch() {
        let a = array![1.0, 2.0];
        let b = array![1.0, 2.0, 3.0];
        assert_eq!(
            allclose(a.view(), b.view(), 1.0),
            Err(ShapeMismatch {
                observed: vec![2],
                reference: vec![3],
            })
        );
    }
}
