compute::criterion_benchmark!(compute_dense);
