//! Outcome of a validation run

use crate::tolerance::{allclose, Comparison, Tolerance};
use data::{field::Trace, parameters::Quantity, Precision};
use ndarray::{Array2, ArrayView2, Axis};
use std::fmt;

/// Part of the trajectory that a tolerance band applies to
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Band {
    /// First recorded time step
    Initial,

    /// Last recorded time step
    SteadyState,

    /// Every recorded time step
    Dynamic,
}
//
impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initial => "initial state",
            Self::SteadyState => "steady state",
            Self::Dynamic => "whole time course",
        })
    }
}

/// Comparison of one band, along with the compared data for diagnosis
#[derive(Clone, Debug, PartialEq)]
pub struct BandOutcome {
    pub band: Band,
    pub comparison: Comparison,

    /// Engine output restricted to the band, `[steps, cells]`
    pub observed: Array2<Precision>,

    /// Reference solver output restricted to the band, `[steps, cells]`
    pub reference: Array2<Precision>,
}
//
impl BandOutcome {
    /// Whether the band is within tolerance
    pub fn passed(&self) -> bool {
        self.comparison.within_tolerance
    }
}

/// Outcome of comparing an engine trace against a reference trace
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationReport {
    /// What the traces measure
    pub quantity: Quantity,

    /// Initial state, steady state and whole time course, in this order
    pub outcomes: [BandOutcome; 3],
}
//
impl ValidationReport {
    /// Compare two traces of identical shape against absolute tolerances
    ///
    /// Both traces must have at least one time step.
    pub(crate) fn compare(
        quantity: Quantity,
        observed: &Trace,
        reference: &Trace,
        absolute: &Tolerance,
    ) -> Result<Self, crate::HarnessError> {
        let last = reference.num_steps().saturating_sub(1);
        let outcome = |band: Band, steps: std::ops::Range<usize>, atol: Precision| {
            let observed = observed.view().slice_axis(Axis(0), steps.clone().into()).to_owned();
            let reference = reference.view().slice_axis(Axis(0), steps.into()).to_owned();
            let comparison = allclose(observed.view(), reference.view(), atol)?;
            Ok::<_, crate::HarnessError>(BandOutcome {
                band,
                comparison,
                observed,
                reference,
            })
        };
        let report = Self {
            quantity,
            outcomes: [
                outcome(Band::Initial, 0..1, absolute.initial)?,
                outcome(Band::SteadyState, last..last + 1, absolute.steady_state)?,
                outcome(Band::Dynamic, 0..reference.num_steps(), absolute.dynamic)?,
            ],
        };
        for outcome in &report.outcomes {
            if outcome.passed() {
                log::info!("{}: within tolerance ({})", outcome.band, outcome.comparison);
            } else {
                log::warn!("{}: out of tolerance ({})", outcome.band, outcome.comparison);
            }
        }
        Ok(report)
    }

    /// Whether every band is within tolerance
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(BandOutcome::passed)
    }

    /// Bands that are out of tolerance
    pub fn failures(&self) -> impl Iterator<Item = &BandOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.passed())
    }

    /// Outcome for a given band
    pub fn outcome(&self, band: Band) -> &BandOutcome {
        match band {
            Band::Initial => &self.outcomes[0],
            Band::SteadyState => &self.outcomes[1],
            Band::Dynamic => &self.outcomes[2],
        }
    }
}
//
impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:?} validation:", self.quantity)?;
        for outcome in &self.outcomes {
            let status = if outcome.passed() { "ok" } else { "FAILED" };
            writeln!(f, "- {}: {status}, {}", outcome.band, outcome.comparison)?;
        }
        for failure in self.failures() {
            writeln!(f, "{}:", failure.band)?;
            write_array(f, "observed", failure.observed.view())?;
            write_array(f, "reference", failure.reference.view())?;
        }
        Ok(())
    }
}

/// Display an array below a heading
fn write_array(
    f: &mut fmt::Formatter<'_>,
    heading: &str,
    array: ArrayView2<Precision>,
) -> fmt::Result {
    writeln!(f, "  {heading} =")?;
    writeln!(f, "{array:.4}")
}
