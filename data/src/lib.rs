//! Data format used by the diffusion reference solver

pub mod field;
#[cfg(feature = "hdf5")]
pub mod hdf5;
pub mod parameters;
pub mod units;

/// Computation precision
pub type Precision = f64;
