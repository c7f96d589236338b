//! Stand-in engine for testing the harness
//!
//! It understands just enough of a [`DiffusionRecipe`](crate::DiffusionRecipe)
//! to rebuild the experiment's parameters, then simulates it with the banded
//! solver. Knobs reproduce the ways real engines have been seen to misbehave.

use crate::recipe::{synapse_label, InjectionMechanism};
use compute::{Simulate, SimulateBase};
use data::{
    field::Trace,
    parameters::{Parameters, Quantity},
    Precision,
};
use engine::{
    cell::Placeable,
    recipe::{ProbeKind, Recipe},
    sampling::{ProbeAddress, Sample, SampleError, SampleHandle, SampleMetadata},
    schedule::Schedule,
    Context, Engine, EngineSimulation, Time,
};
use ndarray::Array2;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct MockEngine {
    /// Record the initial state on top of the scheduled samples
    pub leading_row: bool,

    /// Number of bogus samples appended after the scheduled ones
    pub extra_rows: usize,

    /// Factor applied to the diffusion constant of the recipe
    pub diffusion_scale: Precision,
}
//
impl Default for MockEngine {
    fn default() -> Self {
        Self {
            leading_row: false,
            extra_rows: 0,
            diffusion_scale: 1.0,
        }
    }
}
//
impl Engine for MockEngine {
    type Simulation<'ctx> = MockSimulation<'ctx>;
    type Error = MockError;

    fn instantiate<'ctx>(
        &'ctx self,
        recipe: &dyn Recipe,
        context: &'ctx Context,
    ) -> Result<MockSimulation<'ctx>, MockError> {
        if recipe.cell_count() != 1 {
            return Err(MockError::Unsupported("multi-cell models"));
        }
        let cell = recipe.describe_cell(0);
        let probe = recipe
            .probes_for(0)
            .into_iter()
            .find(|probe| matches!(probe.kind, ProbeKind::IonDiffConcentrationCell { .. }))
            .ok_or(MockError::Unsupported("models without diffusion probe"))?;
        let ProbeKind::IonDiffConcentrationCell { ion } = &probe.kind else {
            return Err(MockError::Unsupported("models without diffusion probe"));
        };
        let diffusion_constant = cell
            .decor
            .ion(ion)
            .and_then(|settings| settings.diffusivity)
            .ok_or(MockError::Unsupported("non-diffusive ions"))?;

        let segments = cell.morphology.segments();
        let num_cells = segments.len();
        let mut stimulus = Vec::new();
        let mut injection = None;
        for placement in cell.decor.placements() {
            let Placeable::Synapse(mechanism) = &placement.item else {
                continue;
            };
            let Some(kind) = InjectionMechanism::from_name(mechanism.base_name()) else {
                continue;
            };
            let idx = (0..num_cells)
                .find(|&idx| synapse_label(idx) == placement.label)
                .ok_or(MockError::Unsupported("injection outside of a segment"))?;
            let amount = mechanism.parameter("alpha").unwrap_or(0.0);
            stimulus.push(idx);
            injection = Some((kind, amount));
        }
        let (kind, inject_amount) = injection.ok_or(MockError::Unsupported("unstimulated models"))?;
        let start = stimulus.iter().copied().min().unwrap_or(0);
        let end = stimulus.iter().copied().max().map_or(0, |last| last + 1);
        if end - start != stimulus.len() {
            return Err(MockError::Unsupported("non-contiguous stimuli"));
        }

        let params = Parameters {
            length: cell.morphology.total_length(),
            num_cells,
            radius: segments.first().map_or(0.0, |segment| segment.proximal.radius),
            diffusion_constant: diffusion_constant * self.diffusion_scale,
            stimulus: start..end,
            inject_amount,
            quantity: match kind {
                InjectionMechanism::NormAmount => Quantity::Amount,
                InjectionMechanism::NormConcentration => Quantity::Concentration,
            },
            ..Parameters::default()
        };
        log::debug!(
            "Mock engine instantiated {num_cells} segments on {} thread(s)",
            context.threads
        );
        Ok(MockSimulation {
            engine: self,
            params,
            tag: probe.tag,
            samplers: Vec::new(),
            samples: Vec::new(),
        })
    }
}

pub struct MockSimulation<'ctx> {
    engine: &'ctx MockEngine,
    params: Parameters,
    tag: String,
    samplers: Vec<(ProbeAddress, Schedule)>,
    samples: Vec<Vec<Sample>>,
}
//
impl MockSimulation<'_> {
    /// Sample matrix for one schedule, given the trace of the run
    fn sample_trace(&self, trace: &Trace, times: &[Time], dt: Time) -> Result<Sample, MockError> {
        let mut rows = Vec::new();
        if self.engine.leading_row {
            rows.push((0.0, 0));
        }
        let last = trace.num_steps().saturating_sub(1);
        for &time in times {
            rows.push((time, ((time / dt).round() as usize).min(last)));
        }
        let end = times.last().map_or(0.0, |&time| time + dt);
        for idx in 0..self.engine.extra_rows {
            rows.push((end + idx as Time * dt, last));
        }

        let mut values = Array2::zeros((rows.len(), 1 + trace.num_cells()));
        for (mut row, &(time, step)) in values.rows_mut().into_iter().zip(&rows) {
            row[0] = time;
            row.slice_mut(ndarray::s![1..]).assign(&trace.row(step));
        }
        let metadata = SampleMetadata {
            locations: (0..trace.num_cells())
                .map(|idx| format!("(cable 0 {idx})"))
                .collect(),
        };
        Ok(Sample::new(values, metadata)?)
    }
}
//
impl EngineSimulation for MockSimulation<'_> {
    type Error = MockError;

    fn sample(&mut self, probe: ProbeAddress, schedule: Schedule) -> SampleHandle {
        self.samplers.push((probe, schedule));
        SampleHandle(self.samplers.len() - 1)
    }

    fn run(&mut self, t_final: Time, dt: Time) -> Result<(), MockError> {
        let params = Parameters {
            time_step: dt,
            duration: t_final,
            ..self.params.clone()
        };
        let trace = compute_banded::Simulation::new(params)?.record_trace()?;
        let mut samples = Vec::with_capacity(self.samplers.len());
        for (probe, schedule) in &self.samplers {
            if probe.gid != 0 || probe.tag != self.tag {
                samples.push(Vec::new());
                continue;
            }
            let times = schedule.times_until(t_final);
            samples.push(vec![self.sample_trace(&trace, &times, dt)?]);
        }
        self.samples = samples;
        Ok(())
    }

    fn samples(&self, handle: SampleHandle) -> &[Sample] {
        self.samples
            .get(handle.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Error)]
pub enum MockError {
    #[error("mock engine does not support {0}")]
    Unsupported(&'static str),

    #[error(transparent)]
    Solver(#[from] compute::Error),

    #[error(transparent)]
    Sample(#[from] SampleError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        harness::{extract_trace, run_validation},
        recipe::DiffusionRecipe,
        report::Band,
        tolerance::Tolerance,
        HarnessError,
    };
    use data::parameters::ConfigError;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn short_run() -> Parameters {
        Parameters {
            duration: 5.0,
            ..Parameters::default()
        }
    }

    #[test]
    fn faithful_engine_passes() {
        init_logger();
        let report = run_validation::<compute_dense::Simulation, _>(
            &MockEngine::default(),
            &Context::single(),
            Parameters::default(),
            "my_ion",
            &Tolerance::default(),
        )
        .unwrap();
        assert!(report.passed(), "{report}");
        assert_eq!(report.quantity, Quantity::Amount);
        let dynamic = report.outcome(Band::Dynamic);
        assert_eq!(dynamic.observed.dim(), (5010, 100));
        assert!(dynamic.comparison.max_deviation < 1e-9);
    }

    #[test]
    fn leading_row_is_tolerated() {
        init_logger();
        let engine = MockEngine {
            leading_row: true,
            ..MockEngine::default()
        };
        let params = Parameters {
            quantity: Quantity::Concentration,
            ..short_run()
        };
        let report = run_validation::<compute_banded::Simulation, _>(
            &engine,
            &Context::single(),
            params,
            "x",
            &Tolerance::default(),
        )
        .unwrap();
        assert!(report.passed(), "{report}");
        assert_eq!(report.quantity, Quantity::Concentration);
        assert_eq!(report.outcome(Band::Dynamic).observed.nrows(), 500);
    }

    #[test]
    fn frozen_engine_fails_after_injection() {
        init_logger();
        let engine = MockEngine {
            diffusion_scale: 0.0,
            ..MockEngine::default()
        };
        let report = run_validation::<compute_banded::Simulation, _>(
            &engine,
            &Context::single(),
            Parameters::default(),
            "x",
            &Tolerance::default(),
        )
        .unwrap();
        assert!(!report.passed());
        assert!(report.outcome(Band::Initial).passed());
        assert!(!report.outcome(Band::SteadyState).passed());
        assert!(!report.outcome(Band::Dynamic).passed());
        assert_eq!(report.failures().count(), 2);

        let steady = report.outcome(Band::SteadyState);
        assert_eq!(steady.observed.dim(), (1, 100));
        assert_eq!(steady.observed[(0, 50)], 1.0);
        assert!((steady.reference[(0, 50)] - 0.2).abs() < 0.01);
        assert!(report.to_string().contains("FAILED"));
    }

    #[test]
    fn extra_samples_are_rejected() {
        let engine = MockEngine {
            extra_rows: 2,
            ..MockEngine::default()
        };
        let result = run_validation::<compute_banded::Simulation, _>(
            &engine,
            &Context::single(),
            short_run(),
            "x",
            &Tolerance::default(),
        );
        assert!(matches!(
            result,
            Err(HarnessError::SampleShape {
                expected: [500, 100],
                actual: [502, 100],
            })
        ));
    }

    #[test]
    fn unknown_probe_has_no_samples() {
        let engine = MockEngine::default();
        let context = Context::single();
        let recipe = DiffusionRecipe::new(&short_run(), "x").unwrap();
        let mut simulation = engine.instantiate(&recipe, &context).unwrap();
        let handle = simulation.sample(ProbeAddress::new(0, "tag_y"), Schedule::regular(0.01));
        simulation.run(5.0, 0.01).unwrap();
        assert!(simulation.samples(handle).is_empty());
        assert!(matches!(
            extract_trace(simulation.samples(handle), 500),
            Err(HarnessError::NoSamples)
        ));
    }

    #[test]
    fn invalid_parameters_are_reported() {
        let params = Parameters {
            time_step: 0.0,
            ..Parameters::default()
        };
        let result = run_validation::<compute_banded::Simulation, _>(
            &MockEngine::default(),
            &Context::single(),
            params,
            "x",
            &Tolerance::default(),
        );
        assert!(matches!(
            result,
            Err(HarnessError::Recipe(crate::RecipeError::Config(
                ConfigError::NonPositiveTimeStep(_)
            )))
        ));
    }
}
