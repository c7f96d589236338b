//! Moving field traces to and from HDF5 files

use crate::{
    field::{FieldView, Trace},
    Precision,
};
use hdf5::{Dataset, File};
use std::path::Path;

pub use hdf5::Result;

/// Common configuration for reading and writing to HDF5 files
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Config<'dsname, FileName: AsRef<Path>> {
    /// Name of the HDF5 file to be accessed
    pub file_name: FileName,

    /// Name of the dataset within the file
    pub dataset_name: Option<&'dsname str>,
}
//
impl<'dsname, FileName: AsRef<Path>> Config<'dsname, FileName> {
    fn dataset_name(&self) -> &'dsname str {
        self.dataset_name.unwrap_or("trace")
    }
}

/// Mechanism to write a trace into an HDF5 file, one time step at a time
pub struct Writer {
    /// File handle
    file: File,

    /// `[steps, cells]` dataset
    dataset: Dataset,

    /// Number of time steps written so far
    position: usize,
}
//
impl Writer {
    /// Create or truncate a file
    ///
    /// The file will be dimensioned to store `num_steps` fields of
    /// `num_cells` values each.
    pub fn create(
        config: Config<'_, impl AsRef<Path>>,
        num_steps: usize,
        num_cells: usize,
    ) -> Result<Self> {
        let dataset_name = config.dataset_name();
        let file = File::create(config.file_name)?;
        let dataset = file
            .new_dataset::<Precision>()
            .chunk([1, num_cells])
            .shape([num_steps, num_cells])
            .lzf()
            .create(dataset_name)?;
        Ok(Self {
            file,
            dataset,
            position: 0,
        })
    }

    /// Write the field of the next time step
    pub fn write(&mut self, field: FieldView) -> Result<()> {
        self.dataset.write_slice(field, (self.position, ..))?;
        self.position += 1;
        Ok(())
    }

    /// Write a whole trace, starting at the current position
    pub fn write_trace(&mut self, trace: &Trace) -> Result<()> {
        for field in trace.steps() {
            self.write(field)?;
        }
        Ok(())
    }

    /// Flush the file to the underlying storage medium and close it
    ///
    /// This should automatically happen on Drop, but doing it manually allows
    /// you to catch and handle errors, instead of letting them lead to panics.
    pub fn close(self) -> Result<()> {
        self.file.close()
    }
}

/// Mechanism to read a trace back from an HDF5 file
pub struct Reader {
    /// `[steps, cells]` dataset
    dataset: Dataset,
}
//
impl Reader {
    /// Open an existing file
    pub fn open(config: Config<'_, impl AsRef<Path>>) -> Result<Self> {
        let dataset_name = config.dataset_name();
        let file = File::open(config.file_name)?;
        let dataset = file.dataset(dataset_name)?;
        Ok(Self { dataset })
    }

    /// `[steps, cells]` shape of the stored trace, if it is two-dimensional
    pub fn shape(&self) -> Option<[usize; 2]> {
        match self.dataset.shape()[..] {
            [steps, cells] => Some([steps, cells]),
            _ => None,
        }
    }

    /// Read the whole trace
    pub fn read_all(&self) -> Result<Trace> {
        Ok(Trace::from_array(self.dataset.read_2d::<Precision>()?))
    }
}
