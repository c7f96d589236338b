//! Driving an engine through a diffusion experiment

use crate::{
    recipe::DiffusionRecipe, report::ValidationReport, tolerance::Tolerance, HarnessError,
};
use compute::Simulate;
use data::{field::Trace, parameters::Parameters};
use engine::{
    sampling::{ProbeAddress, Sample},
    schedule::Schedule,
    Context, Engine, EngineSimulation,
};
use ndarray::s;

/// Turn the samples of the diffusion probe into a `[steps, cells]` trace
///
/// Only the first sample is used, since the probe measures a single ion. The
/// timestamp column is always dropped. Some engine versions record the state
/// before the first step on top of the expected samples: a single extra
/// leading row is thus tolerated and dropped, but any other row count is an
/// error.
pub fn extract_trace(samples: &[Sample], expected_steps: usize) -> Result<Trace, HarnessError> {
    let sample = samples.first().ok_or(HarnessError::NoSamples)?;
    let values = sample.field_values();
    let (rows, cols) = values.dim();
    let values = if rows == expected_steps {
        values
    } else if rows == expected_steps + 1 {
        log::warn!(
            "Engine recorded {rows} samples where {expected_steps} were expected, \
             dropping the leading one"
        );
        values.slice_move(s![1.., ..])
    } else {
        return Err(HarnessError::SampleShape {
            expected: [expected_steps, cols],
            actual: [rows, cols],
        });
    };
    Ok(Trace::from_array(values.to_owned()))
}

/// Run the diffusion experiment described by `params` on both the reference
/// solver `S` and the engine, then compare the resulting traces
///
/// The diffusing ion is called `ion` on the engine side. A report is returned
/// whether or not the traces agree, errors are only used for runs that could
/// not be carried out.
pub fn run_validation<S: Simulate, E: Engine>(
    engine: &E,
    context: &Context,
    params: Parameters,
    ion: &str,
    tolerance: &Tolerance,
) -> Result<ValidationReport, HarnessError> {
    let recipe = DiffusionRecipe::new(&params, ion)?;
    let num_steps = params.num_steps();
    log::info!(
        "Validating {:?} diffusion over {} cells and {num_steps} steps",
        params.quantity,
        params.num_cells
    );

    let observed = {
        let mut simulation = engine
            .instantiate(&recipe, context)
            .map_err(HarnessError::engine)?;
        let handle = simulation.sample(
            ProbeAddress::new(0, recipe.probe_tag()),
            Schedule::regular(params.time_step),
        );
        simulation
            .run(params.duration, params.time_step)
            .map_err(HarnessError::engine)?;
        extract_trace(simulation.samples(handle), num_steps)?
    };
    if observed.num_cells() != params.num_cells {
        return Err(HarnessError::SampleShape {
            expected: [num_steps, params.num_cells],
            actual: [observed.num_steps(), observed.num_cells()],
        });
    }
    log::debug!("Engine run complete");

    let quantity = params.quantity;
    let absolute = tolerance.absolute(params.peak_value());
    let reference = S::new(params)?.record_trace()?;
    log::debug!("Reference run of {} complete", S::NAME);

    ValidationReport::compare(quantity, &observed, &reference, &absolute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::sampling::SampleMetadata;
    use ndarray::array;

    fn sample(values: ndarray::Array2<f64>) -> Sample {
        Sample::new(values, SampleMetadata::default()).unwrap()
    }

    #[test]
    fn timestamps_are_dropped() {
        let samples = [sample(array![[0.0, 1.0, 2.0], [0.1, 3.0, 4.0]])];
        let trace = extract_trace(&samples, 2).unwrap();
        assert_eq!(trace.view(), array![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn spurious_leading_row_is_dropped() {
        let samples = [sample(array![
            [0.0, 9.0, 9.0],
            [0.0, 1.0, 2.0],
            [0.1, 3.0, 4.0]
        ])];
        let trace = extract_trace(&samples, 2).unwrap();
        assert_eq!(trace.view(), array![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn other_shapes_are_rejected() {
        let samples = [sample(array![[0.0, 1.0], [0.1, 2.0], [0.2, 3.0]])];
        assert!(matches!(
            extract_trace(&samples, 1),
            Err(HarnessError::SampleShape {
                expected: [1, 1],
                actual: [3, 1],
            })
        ));
        assert!(matches!(
            extract_trace(&samples, 5),
            Err(HarnessError::SampleShape { .. })
        ));
        assert!(matches!(
            extract_trace(&[], 3),
            Err(HarnessError::NoSamples)
        ));
    }
}
