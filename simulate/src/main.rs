use clap::Parser;
use compute::{Simulate, SimulateBase};
use compute_selector::Simulation;
use data::field::Trace;
use eyre::Result;
#[cfg(feature = "hdf5")]
use std::path::PathBuf;
use ui::SharedArgs;

/// Simulate the diffusion of particles injected into a cylindrical cable
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Physical parameters of the simulation
    #[command(flatten)]
    shared: SharedArgs,

    /// Number of progress updates over the course of the simulation
    #[arg(short = 'i', long, default_value_t = 100)]
    nbimage: usize,

    /// Path to the results output file
    #[cfg(feature = "hdf5")]
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Enable logging to syslog
    ui::init_logging();

    // Parse CLI arguments and handle clap-incompatible defaults
    let args = Args::parse();
    let params = ui::parameters(&args.shared);
    let num_steps = params.num_steps();
    let steps_per_image = num_steps.div_ceil(args.nbimage.max(1)).max(1);

    // Set up the simulation
    let simulation = Simulation::new(params)?;
    log::info!(
        "Simulating {num_steps} steps with the {} backend, alpha = {}",
        Simulation::NAME,
        simulation.parameters().alpha()
    );
    let mut field = simulation.make_field();
    let mut trace = Trace::new(field.len());

    // Run the simulation, recording the field before each step
    let progress = ui::init_progress_reporting("Running simulation step", num_steps);
    let mut remaining = num_steps;
    while remaining > 0 {
        let chunk = steps_per_image.min(remaining);
        for _ in 0..chunk {
            trace.record(field.view())?;
            simulation.perform_steps(&mut field, 1)?;
        }
        remaining -= chunk;
        progress.inc(chunk as u64);
    }
    progress.finish();

    // Summarize the outcome
    if let (Some(initial), Some(last)) = (trace.initial(), trace.last()) {
        log::info!(
            "Total went from {} to {}, spread from {} to {}",
            initial.sum(),
            last.sum(),
            trace.spread(0),
            trace.spread(trace.num_steps() - 1)
        );
    }

    // Write down the results
    #[cfg(feature = "hdf5")]
    {
        use data::hdf5::{self, Writer};
        let file_name = ui::simulation_output_path(args.output);
        let mut writer = Writer::create(
            hdf5::Config {
                file_name: file_name.clone(),
                ..Default::default()
            },
            trace.num_steps(),
            trace.num_cells(),
        )?;
        writer.write_trace(&trace)?;
        writer.close()?;
        log::info!("Wrote trace to {}", file_name.display());
    }
    #[cfg(not(feature = "hdf5"))]
    log::info!("HDF5 output is disabled, recorded trace is discarded");
    Ok(())
}
