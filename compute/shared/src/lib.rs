//! Common facilities shared by all compute backends

#[cfg(feature = "criterion")]
pub mod benchmark;
pub mod crank_nicolson;

use data::{
    field::{Field, Trace},
    parameters::{ConfigError, Parameters},
};
use thiserror::Error;

/// Errors that a compute backend can run into
#[derive(Debug, Error)]
pub enum Error {
    /// Parameters do not describe a valid simulation
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A field did not have the shape of the grid
    #[error("field does not match the simulation grid: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// LU factorization found the implicit matrix to be singular
    #[error("implicit Crank-Nicolson matrix is singular")]
    SingularMatrix,

    /// Tridiagonal elimination ran into a vanishing pivot
    #[error("implicit Crank-Nicolson matrix has a vanishing pivot at row {row}")]
    ZeroPivot {
        /// Row of the offending pivot
        row: usize,
    },
}

/// Result type used by compute backends
pub type Result<T> = std::result::Result<T, Error>;

/// Common interface to all diffusion compute backends
pub trait SimulateBase: Sized {
    /// Human-readable backend name, used in logs and benchmarks
    const NAME: &'static str;

    /// Set up the simulation
    ///
    /// Implementations must validate `params` before doing anything else, so
    /// that invalid configurations fail before any time step is computed.
    fn new(params: Parameters) -> Result<Self>;

    /// Parameters that this simulation was set up with
    fn parameters(&self) -> &Parameters;

    /// Set up the field before the first time step
    fn make_field(&self) -> Field {
        self.parameters().initial_field()
    }
}

/// Simulation interface expected by the CLI programs and validation harness
pub trait Simulate: SimulateBase {
    /// Perform `steps` simulation time steps on `field`
    fn perform_steps(&self, field: &mut Field, steps: usize) -> Result<()>;

    /// Run the full simulation, recording the field before each update
    ///
    /// The result has `num_steps()` rows, the first of which is the initial
    /// stimulus. The state reached after the last update is not recorded.
    fn record_trace(&self) -> Result<Trace> {
        let params = self.parameters();
        let num_steps = params.num_steps();
        let mut field = self.make_field();
        let mut trace = Trace::new(params.num_cells);
        for _ in 0..num_steps {
            trace.record(field.view())?;
            self.perform_steps(&mut field, 1)?;
        }
        log::info!(
            "{} backend recorded {num_steps} steps over {} cells",
            Self::NAME,
            params.num_cells
        );
        Ok(trace)
    }
}

/// Simplified version of Simulate that simulates a single time step at a time
///
/// If you implement this, then a [`Simulate`] implementation that loops over
/// time steps will be automatically provided.
pub trait SimulateStep: SimulateBase {
    /// Advance `field` by a single time step
    fn perform_step(&self, field: &mut Field) -> Result<()>;
}
//
impl<T: SimulateStep> Simulate for T {
    fn perform_steps(&self, field: &mut Field, steps: usize) -> Result<()> {
        for _ in 0..steps {
            self.perform_step(field)?;
        }
        Ok(())
    }
}

/// Check that a field matches the grid of some simulation parameters
pub fn check_field(params: &Parameters, field: &Field) -> Result<()> {
    if field.len() == params.num_cells {
        Ok(())
    } else {
        Err(Error::Shape(ndarray::ShapeError::from_kind(
            ndarray::ErrorKind::IncompatibleShape,
        )))
    }
}
