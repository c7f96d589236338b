//! Computation parameters

use crate::{field::Field, units, Precision};
use std::ops::Range;
use thiserror::Error;

/// Physical quantity that the simulated field represents
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Quantity {
    /// Absolute particle amount per cell
    #[default]
    Amount,

    /// Particle amount divided by the cell volume
    Concentration,
}

/// Computation parameters
///
/// Lengths are in µm, durations in ms and the diffusion constant in m²/s. Use
/// [`Parameters::validate()`] (or any solver constructor, which calls it) to
/// check that a set of parameters describes a valid simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    /// Length of the simulated line segment
    pub length: Precision,

    /// Number of cells the segment is discretized into
    pub num_cells: usize,

    /// Radius of the cylinder the segment is a part of
    pub radius: Precision,

    /// Diffusion constant of the particles
    pub diffusion_constant: Precision,

    /// Time step (make it shorter to increase precision)
    pub time_step: Precision,

    /// Total simulated duration
    pub duration: Precision,

    /// Cells which receive the initial injection
    pub stimulus: Range<usize>,

    /// Amount of particles injected into each stimulated cell
    pub inject_amount: Precision,

    /// Whether the field tracks amounts or concentrations
    pub quantity: Quantity,
}
//
impl Default for Parameters {
    fn default() -> Self {
        let num_cells = 100;
        Self {
            length: 10.0,
            num_cells,
            radius: 1.0,
            diffusion_constant: 1e-9,
            time_step: 0.01,
            duration: 50.1,
            stimulus: Self::centered_stimulus(num_cells, 0.4, 0.6),
            inject_amount: 1.0,
            quantity: Quantity::Amount,
        }
    }
}
//
impl Parameters {
    /// Stimulus covering the `[start, end)` fraction of a grid of `num_cells`
    ///
    /// Bounds are rounded down, so `(100, 0.4, 0.6)` yields `40..60`.
    pub fn centered_stimulus(num_cells: usize, start: Precision, end: Precision) -> Range<usize> {
        let bound = |fraction: Precision| (fraction * num_cells as Precision) as usize;
        bound(start)..bound(end)
    }

    /// Check that these parameters describe a valid simulation
    ///
    /// Nothing is ever clamped: the first problem found is reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("length", self.length),
            ("radius", self.radius),
            ("diffusion constant", self.diffusion_constant),
            ("time step", self.time_step),
            ("duration", self.duration),
            ("injected amount", self.inject_amount),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name, value });
            }
        }
        if self.num_cells == 0 {
            return Err(ConfigError::NoCells);
        }
        if self.length <= 0.0 {
            return Err(ConfigError::NonPositiveLength(self.length));
        }
        if self.radius <= 0.0 {
            return Err(ConfigError::NonPositiveRadius(self.radius));
        }
        if self.time_step <= 0.0 {
            return Err(ConfigError::NonPositiveTimeStep(self.time_step));
        }
        if self.duration <= 0.0 {
            return Err(ConfigError::NonPositiveDuration(self.duration));
        }
        if self.diffusion_constant < 0.0 {
            return Err(ConfigError::NegativeDiffusion(self.diffusion_constant));
        }
        if self.stimulus.start > self.stimulus.end || self.stimulus.end > self.num_cells {
            return Err(ConfigError::StimulusOutOfRange {
                stimulus: self.stimulus.clone(),
                num_cells: self.num_cells,
            });
        }
        if self.num_steps() == 0 {
            return Err(ConfigError::NoTimeSteps {
                duration: self.duration,
                time_step: self.time_step,
            });
        }
        Ok(())
    }

    /// Width of a single cell (µm)
    pub fn cell_width(&self) -> Precision {
        self.length / self.num_cells as Precision
    }

    /// Volume of a single cylindrical cell (µm³)
    pub fn cell_volume(&self) -> Precision {
        std::f64::consts::PI * self.radius * self.radius * self.cell_width()
    }

    /// Number of time steps that fit in the simulated duration
    ///
    /// This is `⌊duration / time_step⌋`, except that ratios which only miss
    /// an integer because of floating-point noise are rounded to it.
    pub fn num_steps(&self) -> usize {
        let ratio = self.duration / self.time_step;
        let nearest = ratio.round();
        let steps = if (ratio - nearest).abs() <= 1e-9 * nearest.max(1.0) {
            nearest
        } else {
            ratio.floor()
        };
        if steps.is_finite() && steps > 0.0 {
            steps as usize
        } else {
            0
        }
    }

    /// Dimensionless Crank-Nicolson coefficient `α = D·dt / (2·dx²)`
    pub fn alpha(&self) -> Precision {
        units::crank_nicolson_alpha(self.diffusion_constant, self.time_step, self.cell_width())
    }

    /// Initial value of the field in stimulated cells
    pub fn stimulus_value(&self) -> Precision {
        match self.quantity {
            Quantity::Amount => self.inject_amount,
            Quantity::Concentration => self.inject_amount / self.cell_volume(),
        }
    }

    /// Largest value the field will ever take, which tolerances scale with
    pub fn peak_value(&self) -> Precision {
        self.stimulus_value()
    }

    /// Field before the first time step: zero except in the stimulus range
    ///
    /// The parameters must have passed [`validate()`](Self::validate).
    ///
    /// # Panics
    ///
    /// If the stimulus range does not fit in the grid
    pub fn initial_field(&self) -> Field {
        debug_assert_eq!(self.validate(), Ok(()));
        let mut field = Field::zeros(self.num_cells);
        field
            .slice_mut(ndarray::s![self.stimulus.clone()])
            .fill(self.stimulus_value());
        field
    }
}

/// Reasons why a set of [`Parameters`] cannot be simulated
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Some parameter is NaN or infinite
    #[error("{name} must be finite, got {value}")]
    NonFinite {
        /// Parameter name
        name: &'static str,

        /// Offending value
        value: Precision,
    },

    #[error("the grid must have at least one cell")]
    NoCells,

    #[error("domain length must be positive, got {0} µm")]
    NonPositiveLength(Precision),

    #[error("cell radius must be positive, got {0} µm")]
    NonPositiveRadius(Precision),

    #[error("time step must be positive, got {0} ms")]
    NonPositiveTimeStep(Precision),

    #[error("simulated duration must be positive, got {0} ms")]
    NonPositiveDuration(Precision),

    #[error("diffusion constant cannot be negative, got {0} m²/s")]
    NegativeDiffusion(Precision),

    /// Stimulus range is reversed or reaches past the last cell
    #[error("stimulus range {stimulus:?} does not fit in [0, {num_cells})")]
    StimulusOutOfRange {
        /// Requested stimulus
        stimulus: Range<usize>,

        /// Number of cells in the grid
        num_cells: usize,
    },

    /// Duration is shorter than a single time step
    #[error("a duration of {duration} ms does not contain a single {time_step} ms time step")]
    NoTimeSteps {
        /// Simulated duration
        duration: Precision,

        /// Time step
        time_step: Precision,
    },
}
