use criterion::*;

use planar_cdt::{compute, CdtBuilder, CdtOptions, OutputType};

use crate::benchmark_utilities::*;

pub fn cdt_benchmark(c: &mut Criterion) {
    use SampleDistribution::*;

    let mut group = c.benchmark_group("cdt benchmark");
    let sizes = &[1000, 2000, 4000, 8000, 16_000];

    for (distribution, with_edges) in [
        (Uniform, false),
        (Uniform, true),
        (RandomWalk, false),
        (RandomWalk, true),
    ] {
        let name = format!(
            "{distribution}, {}",
            if with_edges { "with edges" } else { "points only" }
        );
        for size in sizes {
            group.throughput(Throughput::Elements(*size as u64));
            group.bench_with_input(BenchmarkId::new(name.clone(), size), size, |b, &size| {
                let input = create_input(distribution, size, with_edges);
                b.iter(|| compute(&input, OutputType::Full).unwrap());
            });
        }
    }

    for size in &[250, 500, 1000] {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("random triangles", size), size, |b, &size| {
            let input = create_face_input(size);
            b.iter(|| compute(&input, OutputType::Full).unwrap());
        });
    }

    group.finish();

    let mut group = c.benchmark_group("extraction benchmark");
    let input = create_face_input(500);
    let finished = CdtBuilder::new(&input, CdtOptions::default())
        .unwrap()
        .run()
        .unwrap();

    for output_type in [
        OutputType::Full,
        OutputType::Inside,
        OutputType::Constraints,
        OutputType::ConstraintsValidBmesh,
    ] {
        group.bench_function(format!("{output_type:?}"), |b| {
            b.iter(|| finished.extract(output_type))
        });
    }

    group.finish();
}
