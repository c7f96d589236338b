//! Physical properties that any correct diffusion trace must exhibit
//!
//! These do not need a second solver to compare against, so they are used to
//! check the reference solver itself.

use data::{field::Trace, Precision};
use thiserror::Error;

/// A trace does not behave like no-flux diffusion should
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PropertyViolation {
    #[error("total went from {initial} to {total} at step {step}")]
    MassNotConserved {
        step: usize,
        initial: Precision,
        total: Precision,
    },

    #[error("spread grew from {before} to {after} at step {step}")]
    SpreadIncreased {
        step: usize,
        before: Precision,
        after: Precision,
    },

    #[error("cells {cell} and {mirror} differ at step {step}: {left} vs {right}")]
    Asymmetric {
        step: usize,
        cell: usize,
        mirror: usize,
        left: Precision,
        right: Precision,
    },

    #[error(
        "cell {cell} at step {step}: concentration {concentration} but amount / volume is {expected}"
    )]
    UnitMismatch {
        step: usize,
        cell: usize,
        concentration: Precision,
        expected: Precision,
    },

    #[error("traces of shapes {left:?} and {right:?} cannot be compared")]
    ShapeMismatch { left: [usize; 2], right: [usize; 2] },
}

/// Shape of a trace as `[steps, cells]`
fn shape(trace: &Trace) -> [usize; 2] {
    [trace.num_steps(), trace.num_cells()]
}

/// Check that the sum over the grid stays within `atol` of its initial value
pub fn check_mass_conservation(trace: &Trace, atol: Precision) -> Result<(), PropertyViolation> {
    if trace.is_empty() {
        return Ok(());
    }
    let initial = trace.total(0);
    for step in 1..trace.num_steps() {
        let total = trace.total(step);
        if !((total - initial).abs() <= atol) {
            return Err(PropertyViolation::MassNotConserved {
                step,
                initial,
                total,
            });
        }
    }
    Ok(())
}

/// Check that the max-min spread of the field never grows by more than `atol`
/// from one step to the next
///
/// Crank-Nicolson only guarantees this when `α <= 1/2`. Larger coefficients
/// are stable but let sharp initial gradients overshoot for a few steps.
pub fn check_monotone_relaxation(trace: &Trace, atol: Precision) -> Result<(), PropertyViolation> {
    for step in 1..trace.num_steps() {
        let before = trace.spread(step - 1);
        let after = trace.spread(step);
        if !(after <= before + atol) {
            return Err(PropertyViolation::SpreadIncreased {
                step,
                before,
                after,
            });
        }
    }
    Ok(())
}

/// Check that every recorded field is its own mirror image, within `atol`
pub fn check_symmetry(trace: &Trace, atol: Precision) -> Result<(), PropertyViolation> {
    let num_cells = trace.num_cells();
    for (step, field) in trace.steps().enumerate() {
        for cell in 0..num_cells / 2 {
            let mirror = num_cells - 1 - cell;
            let (left, right) = (field[cell], field[mirror]);
            if !((left - right).abs() <= atol) {
                return Err(PropertyViolation::Asymmetric {
                    step,
                    cell,
                    mirror,
                    left,
                    right,
                });
            }
        }
    }
    Ok(())
}

/// Check that `concentration = amount / cell_volume` pointwise, with a
/// tolerance relative to the concentration
pub fn check_unit_consistency(
    amount: &Trace,
    concentration: &Trace,
    cell_volume: Precision,
    rtol: Precision,
) -> Result<(), PropertyViolation> {
    if shape(amount) != shape(concentration) {
        return Err(PropertyViolation::ShapeMismatch {
            left: shape(amount),
            right: shape(concentration),
        });
    }
    for (step, (amounts, concentrations)) in amount.steps().zip(concentration.steps()).enumerate() {
        for (cell, (&amount, &concentration)) in amounts.iter().zip(&concentrations).enumerate() {
            let expected = amount / cell_volume;
            let scale = expected.abs().max(concentration.abs()).max(Precision::MIN_POSITIVE);
            if !((concentration - expected).abs() <= rtol * scale) {
                return Err(PropertyViolation::UnitMismatch {
                    step,
                    cell,
                    concentration,
                    expected,
                });
            }
        }
    }
    Ok(())
}
