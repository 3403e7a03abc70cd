use criterion::*;

mod cdt_benchmark;

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = cdt_benchmark::cdt_benchmark, batch_benchmark::batch_benchmark
}

criterion_main!(benches);
