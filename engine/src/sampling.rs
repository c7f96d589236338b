//! Sampled probe output

use crate::recipe::CellGid;
use data::Precision;
use ndarray::{s, Array2, ArrayView1, ArrayView2};
use thiserror::Error;

/// Probe of a specific cell, as addressed by samplers
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ProbeAddress {
    pub gid: CellGid,
    pub tag: String,
}
//
impl ProbeAddress {
    /// Address a probe by cell and tag
    pub fn new(gid: CellGid, tag: impl Into<String>) -> Self {
        Self {
            gid,
            tag: tag.into(),
        }
    }
}

/// Opaque handle to the samples recorded by a sampler
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SampleHandle(pub usize);

/// Information about what a sample measured
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleMetadata {
    /// Description of the sampled locations, one per value column
    pub locations: Vec<String>,
}

/// Time series recorded by one probe
///
/// Column 0 of `values` holds the sample times (ms), the remaining columns
/// hold one measured value per probed location.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    values: Array2<Precision>,
    metadata: SampleMetadata,
}
//
impl Sample {
    /// Wrap a `[times, 1 + locations]` matrix
    pub fn new(values: Array2<Precision>, metadata: SampleMetadata) -> Result<Self, SampleError> {
        if values.ncols() == 0 {
            return Err(SampleError::NoTimeColumn);
        }
        Ok(Self { values, metadata })
    }

    /// Full matrix, timestamps included
    pub fn raw(&self) -> ArrayView2<'_, Precision> {
        self.values.view()
    }

    /// Sample times
    pub fn times(&self) -> ArrayView1<'_, Precision> {
        self.values.column(0)
    }

    /// Measured values, without the timestamp column
    pub fn field_values(&self) -> ArrayView2<'_, Precision> {
        self.values.slice(s![.., 1..])
    }

    /// Number of sampled points in time
    pub fn num_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn metadata(&self) -> &SampleMetadata {
        &self.metadata
    }
}

/// Malformed sample data
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SampleError {
    #[error("sample matrix has no timestamp column")]
    NoTimeColumn,
}
