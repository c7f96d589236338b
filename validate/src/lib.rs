//! Validation of an external simulation engine's diffusion against the
//! Crank-Nicolson reference solver
//!
//! A run goes as follows: the reference solver produces a trace for some
//! [`Parameters`](data::parameters::Parameters), the same experiment is
//! described to the engine as a [`DiffusionRecipe`], the engine's sampled
//! output is turned back into a trace, and both traces are compared over
//! three tolerance bands.

pub mod harness;
#[cfg(test)]
mod mock;
pub mod properties;
pub mod recipe;
pub mod report;
pub mod tolerance;

pub use crate::{
    harness::{extract_trace, run_validation},
    recipe::{DiffusionRecipe, InjectionMechanism, RecipeError, SpikeRelayRecipe},
    report::{Band, ValidationReport},
    tolerance::{allclose, Tolerance},
};
use thiserror::Error;

/// Errors that prevent a validation run from producing a report
///
/// Traces that do not agree within tolerance are not errors: they are
/// reported by the [`ValidationReport`].
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to describe the model")]
    Recipe(#[from] RecipeError),

    #[error("reference solver failed")]
    Solver(#[from] compute::Error),

    #[error("engine failed")]
    Engine(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("engine recorded no sample for the diffusion probe")]
    NoSamples,

    #[error("engine samples have shape {actual:?}, expected {expected:?} (steps, cells)")]
    SampleShape {
        expected: [usize; 2],
        actual: [usize; 2],
    },

    #[error(transparent)]
    Compare(#[from] tolerance::ShapeMismatch),
}
//
impl HarnessError {
    /// Wrap an engine-specific error
    pub fn engine(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Engine(Box::new(error))
    }
}
