compute::criterion_benchmark!(compute_banded);
