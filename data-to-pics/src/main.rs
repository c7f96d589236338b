use clap::Parser;
use data::{
    hdf5::{Config, Reader},
    Precision,
};
use eyre::{ensure, eyre, Result};
use image::{Rgb, RgbImage};
use ndarray::{ArrayView2, Axis};
use std::{num::NonZeroUsize, path::PathBuf};

/// Render a diffusion trace as a space-time image
///
/// Each row of the output image is one recorded time step, each column is one
/// cell of the simulated segment.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input HDF5 file
    #[arg(short, long)]
    input: PathBuf,

    /// Path to the output PNG image
    #[arg(short, long, default_value = "trace.png")]
    output: PathBuf,

    /// Only render one time step out of this many
    #[arg(short, long, default_value_t = NonZeroUsize::MIN)]
    every: NonZeroUsize,

    /// Width of each cell in pixels
    #[arg(short, long, default_value_t = NonZeroUsize::MIN)]
    cell_width: NonZeroUsize,

    /// Value which maps to the top of the color scale (defaults to the
    /// largest value of the trace)
    #[arg(short, long)]
    max: Option<Precision>,
}

fn main() -> Result<()> {
    // Enable logging to syslog
    ui::init_logging();

    // Parse CLI arguments
    let args = Args::parse();

    // Load the trace
    let reader = Reader::open(Config {
        file_name: &args.input,
        dataset_name: None,
    })?;
    let shape = reader
        .shape()
        .ok_or_else(|| eyre!("{} does not contain a [steps, cells] trace", args.input.display()))?;
    let trace = reader.read_all()?;
    ensure!(!trace.is_empty(), "{} contains no time step", args.input.display());
    log::info!("Loaded a trace of {} steps over {} cells", shape[0], shape[1]);

    // Set up color scaling
    let max = args
        .max
        .unwrap_or_else(|| trace.view().fold(0.0, |max: Precision, &value| max.max(value)));
    let norm = if max > 0.0 { 1.0 / max } else { 1.0 };

    // Render the image
    let steps = trace.view();
    let steps = steps.slice_axis(Axis(0), ndarray::Slice::new(0, None, args.every.get() as isize));
    let image = render(steps, args.cell_width.get(), norm)?;
    image.save(&args.output)?;
    log::info!("Wrote {}x{} image to {}", image.width(), image.height(), args.output.display());
    Ok(())
}

/// Render `[steps, cells]` values into an image, `norm · value` being the
/// position on the color gradient
fn render(steps: ArrayView2<Precision>, cell_width: usize, norm: Precision) -> Result<RgbImage> {
    let width = u32::try_from(steps.ncols() * cell_width)?;
    let height = u32::try_from(steps.nrows())?;
    let mut image = RgbImage::new(width, height);
    let progress = ui::init_progress_reporting("Rendering time step", steps.nrows());
    for (row, field) in steps.outer_iter().enumerate() {
        for (cell, &value) in field.iter().enumerate() {
            let color = ui::GRADIENT.eval_continuous((norm * value).clamp(0.0, 1.0));
            for offset in 0..cell_width {
                let x = (cell * cell_width + offset) as u32;
                image.put_pixel(x, row as u32, Rgb([color.r, color.g, color.b]));
            }
        }
        progress.inc(1);
    }
    progress.finish();
    Ok(image)
}
