//! Simulated field and its time history

use crate::Precision;
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis, ShapeError};

/// Value of the diffusing quantity in each cell of the grid
pub type Field = Array1<Precision>;

/// Scalar view of a [`Field`]
pub type FieldView<'a> = ArrayView1<'a, Precision>;

/// Time history of a field, one row per time step
///
/// Rows are only ever appended. Row 0 is the field before the first update,
/// i.e. the initial stimulus.
#[derive(Clone, Debug, PartialEq)]
pub struct Trace(Array2<Precision>);
//
impl Trace {
    /// Set up an empty trace for a grid of `num_cells` cells
    pub fn new(num_cells: usize) -> Self {
        Self(Array2::zeros((0, num_cells)))
    }

    /// Wrap an existing `[steps, cells]` matrix
    pub fn from_array(values: Array2<Precision>) -> Self {
        Self(values)
    }

    /// Append the current state of the field
    pub fn record(&mut self, field: FieldView) -> Result<(), ShapeError> {
        self.0.push_row(field)
    }

    /// Number of recorded time steps
    pub fn num_steps(&self) -> usize {
        self.0.nrows()
    }

    /// Number of grid cells
    pub fn num_cells(&self) -> usize {
        self.0.ncols()
    }

    /// Check if no time step was recorded yet
    pub fn is_empty(&self) -> bool {
        self.num_steps() == 0
    }

    /// Field at time step `step`
    ///
    /// # Panics
    ///
    /// If `step` is out of bounds
    pub fn row(&self, step: usize) -> FieldView<'_> {
        self.0.row(step)
    }

    /// Field before the first update, if any
    pub fn initial(&self) -> Option<FieldView<'_>> {
        (!self.is_empty()).then(|| self.row(0))
    }

    /// Last recorded field, if any
    pub fn last(&self) -> Option<FieldView<'_>> {
        (!self.is_empty()).then(|| self.row(self.num_steps() - 1))
    }

    /// View the trace as a `[steps, cells]` matrix
    pub fn view(&self) -> ArrayView2<'_, Precision> {
        self.0.view()
    }

    /// Extract the underlying `[steps, cells]` matrix
    pub fn into_array(self) -> Array2<Precision> {
        self.0
    }

    /// Iterate over recorded fields in time order
    pub fn steps(&self) -> impl Iterator<Item = FieldView<'_>> + '_ {
        self.0.axis_iter(Axis(0))
    }

    /// Sum of the field over the grid at time step `step`
    pub fn total(&self, step: usize) -> Precision {
        self.row(step).sum()
    }

    /// Difference between the largest and smallest value at time step `step`
    pub fn spread(&self, step: usize) -> Precision {
        let row = self.row(step);
        let (min, max) = row
            .iter()
            .fold((Precision::INFINITY, Precision::NEG_INFINITY), |(min, max), &x| {
                (min.min(x), max.max(x))
            });
        max - min
    }

    /// Same trace with every value multiplied by `factor`
    ///
    /// Dividing by the cell volume turns amounts into concentrations.
    pub fn scaled(&self, factor: Precision) -> Self {
        Self(&self.0 * factor)
    }

    /// Sub-trace covering the time steps in `steps`
    pub fn slice_steps(&self, steps: std::ops::Range<usize>) -> Self {
        Self(self.0.slice(s![steps, ..]).to_owned())
    }
}
