// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0


use criterion::{criterion_group, criterion_main};
use merge_many_bench::{bench_merge_many_bounded, bench_merge_many_unlimited};

criterion_group!(
    merge_benches,
    bench_merge_many_unlimited,
    bench_merge_many_bounded
);
criterion_main!(merge_benches);
