//! Benchmarking utilities
//!
//! Please consider using the [`criterion_benchmark!`](crate::criterion_benchmark)
//! macro instead of calling these implementation details directly.

use crate::Simulate;
use criterion::{BenchmarkId, Criterion, Throughput};
use data::parameters::Parameters;
use std::{hint::black_box, sync::Once};

/// Re-export criterion for the criterion_benchmark macro
pub use criterion;

// Make sure env_logger is only initialized once
fn init_logger() {
    static INIT_LOGGER: Once = Once::new();
    INIT_LOGGER.call_once(env_logger::init);
}

/// Common criterion benchmark for all diffusion backends
pub fn criterion_benchmark<Simulation: Simulate>(c: &mut Criterion) {
    init_logger();

    let mut group = c.benchmark_group(Simulation::NAME);
    for num_cells_pow2 in 3..=10 {
        let num_cells = 2usize.pow(num_cells_pow2);
        let num_steps = 64;
        let params = Parameters {
            num_cells,
            length: num_cells as data::Precision * 0.1,
            stimulus: Parameters::centered_stimulus(num_cells, 0.4, 0.6),
            duration: num_steps as data::Precision * 0.01,
            ..Parameters::default()
        };
        let sim = match Simulation::new(black_box(params)) {
            Ok(sim) => sim,
            Err(e) => panic!("Failed to set up {num_cells}-cell benchmark: {e}"),
        };
        let mut field = sim.make_field();

        group.throughput(Throughput::Elements((num_cells * num_steps) as u64));
        group.bench_function(
            BenchmarkId::from_parameter(format!("{num_cells}cells,{num_steps}steps")),
            |b| {
                b.iter(|| {
                    if let Err(e) = sim.perform_steps(&mut field, num_steps) {
                        panic!("Failed to compute simulation steps: {e}");
                    }
                })
            },
        );
        black_box(&field);
    }
    group.finish();
}

/// Macro that generates a complete criterion benchmark harness for you
#[macro_export]
macro_rules! criterion_benchmark {
    ($backend:ident) => {
        fn criterion_benchmark(c: &mut $crate::benchmark::criterion::Criterion) {
            $crate::benchmark::criterion_benchmark::<$backend::Simulation>(c)
        }
        $crate::benchmark::criterion::criterion_group!(benches, criterion_benchmark);
        $crate::benchmark::criterion::criterion_main!(benches);
    };
}
