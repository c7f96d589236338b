//! This crate collects elements that are shared between the CLI programs
//! data-to-pics and simulate.

#[cfg(feature = "simulation")]
use data::{
    parameters::{Parameters, Quantity},
    Precision,
};
use std::path::PathBuf;

/// CLI arguments shared by the executables which run a simulation
///
/// Every flag that is left out takes its value from the reference scenario.
#[cfg(feature = "simulation")]
#[derive(clap::Args, Debug)]
pub struct SharedArgs {
    /// Length of the simulated line segment (µm)
    #[arg(short = 'l', long)]
    pub length: Option<Precision>,

    /// Number of cells the segment is discretized into
    #[arg(short = 'n', long)]
    pub nbcell: Option<usize>,

    /// Radius of the cable (µm)
    #[arg(short = 'r', long)]
    pub radius: Option<Precision>,

    /// Diffusion constant (m²/s)
    #[arg(short = 'd', long)]
    pub diffusion: Option<Precision>,

    /// Simulated time interval on each simulation step (ms)
    #[arg(short = 't', long)]
    pub deltat: Option<Precision>,

    /// Total simulated duration (ms)
    #[arg(short = 'T', long)]
    pub duration: Option<Precision>,

    /// First stimulated cell (defaults to 40% of the grid)
    #[arg(long)]
    pub stim_start: Option<usize>,

    /// Cell after the last stimulated one (defaults to 60% of the grid)
    #[arg(long)]
    pub stim_end: Option<usize>,

    /// Amount of particles injected in each stimulated cell
    #[arg(short, long)]
    pub amount: Option<Precision>,

    /// Track concentrations instead of particle amounts
    #[arg(short, long)]
    pub concentration: bool,
}

/// Argument defaults that clap can't handle
///
/// The default stimulus follows the number of cells, so that it stays
/// centered on the grid.
#[cfg(feature = "simulation")]
pub fn parameters(args: &SharedArgs) -> Parameters {
    let defaults = Parameters::default();
    let num_cells = args.nbcell.unwrap_or(defaults.num_cells);
    let stimulus = Parameters::centered_stimulus(num_cells, 0.4, 0.6);
    Parameters {
        length: args.length.unwrap_or(defaults.length),
        num_cells,
        radius: args.radius.unwrap_or(defaults.radius),
        diffusion_constant: args.diffusion.unwrap_or(defaults.diffusion_constant),
        time_step: args.deltat.unwrap_or(defaults.time_step),
        duration: args.duration.unwrap_or(defaults.duration),
        stimulus: args.stim_start.unwrap_or(stimulus.start)..args.stim_end.unwrap_or(stimulus.end),
        inject_amount: args.amount.unwrap_or(defaults.inject_amount),
        quantity: if args.concentration {
            Quantity::Concentration
        } else {
            Quantity::Amount
        },
    }
}

/// Where simulation results go by default
pub fn simulation_output_path(output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| "output.h5".into())
}

/// Enable logging to syslog, or to stderr if there is no syslog daemon
#[cfg(feature = "tui")]
pub fn init_logging() {
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    if let Err(error) = syslog::init(syslog::Facility::default(), level, None) {
        env_logger::Builder::new().filter_level(level).init();
        log::warn!("Logging to stderr since syslog is unavailable: {error}");
    }
}

/// Set up a progress bar over `len` units of work
#[cfg(feature = "tui")]
pub fn init_progress_reporting(
    message: impl Into<std::borrow::Cow<'static, str>>,
    len: usize,
) -> indicatif::ProgressBar {
    let progress = indicatif::ProgressBar::new(len as u64)
        .with_message(message)
        .with_finish(indicatif::ProgressFinish::AndClear);
    if let Ok(style) =
        indicatif::ProgressStyle::with_template("{msg} {pos}/{len} {wide_bar} {elapsed}/~{duration}")
    {
        progress.set_style(style);
    }
    progress.enable_steady_tick(std::time::Duration::from_millis(100));
    progress
}

/// Color gradient of the data-to-pics visualization
#[cfg(feature = "visualization")]
pub const GRADIENT: colorous::Gradient = colorous::INFERNO;
