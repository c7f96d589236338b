//! Interface to the external multicompartment simulation engine
//!
//! Nothing in here simulates anything. These are the records and traits
//! through which models are described to an engine, run, and sampled, so that
//! the engine's output can be compared against the reference solver.

pub mod cell;
pub mod morphology;
pub mod recipe;
pub mod sampling;
pub mod schedule;

use crate::{
    recipe::Recipe,
    sampling::{ProbeAddress, Sample, SampleHandle},
    schedule::Schedule,
};
use std::num::NonZeroUsize;

/// Simulated time (ms)
pub type Time = data::Precision;

/// Execution resources handed to an engine
///
/// Contexts are plain values that the caller creates and owns for as long as
/// the simulations using them live. Nothing about them is global.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Context {
    /// Number of worker threads
    pub threads: NonZeroUsize,

    /// GPU to be used, if any
    pub gpu_id: Option<u32>,
}
//
impl Context {
    /// Single-threaded context without GPU
    pub fn single() -> Self {
        Self {
            threads: NonZeroUsize::MIN,
            gpu_id: None,
        }
    }
}
//
impl Default for Context {
    fn default() -> Self {
        Self::single()
    }
}

/// Simulation engine that models can be instantiated on
pub trait Engine {
    /// Instantiated simulation
    type Simulation<'ctx>: EngineSimulation
    where
        Self: 'ctx;

    /// Errors reported while instantiating a recipe
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build a simulation of `recipe` on `context`
    fn instantiate<'ctx>(
        &'ctx self,
        recipe: &dyn Recipe,
        context: &'ctx Context,
    ) -> Result<Self::Simulation<'ctx>, Self::Error>;
}

/// Instantiated model which can be sampled and run
pub trait EngineSimulation {
    /// Errors reported while running
    type Error: std::error::Error + Send + Sync + 'static;

    /// Attach a sampler to a probe
    fn sample(&mut self, probe: ProbeAddress, schedule: Schedule) -> SampleHandle;

    /// Run until `t_final` (ms) with time step `dt` (ms)
    fn run(&mut self, t_final: Time, dt: Time) -> Result<(), Self::Error>;

    /// Samples recorded by a sampler, one per probed quantity
    fn samples(&self, handle: SampleHandle) -> &[Sample];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_context() {
        let context = Context::default();
        assert_eq!(context.threads.get(), 1);
        assert_eq!(context.gpu_id, None);
    }
}
