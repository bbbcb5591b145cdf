//! Benchmarks for pipeline preflight and execute
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use matpipe::data::{CreateOptions, DataContainerArray};
use matpipe::pipeline::filters::{CreateDataArray, RenameAttributeArray};
use matpipe::{AttributeMatrixType, DataArrayPath, ElementKind, FilterPipeline};

/// `stages` arrays created in one matrix, each renamed once
fn build_pipeline(stages: usize, tuples: usize) -> FilterPipeline {
    let mut pipeline = FilterPipeline::new("Bench");
    for i in 0..stages {
        let path = DataArrayPath::new("DC", "AM", &format!("Array{}", i));
        pipeline.push_back(Box::new(
            CreateDataArray::new(path.clone(), ElementKind::Float32, &[tuples]).with_value("1.5"),
        ));
        pipeline.push_back(Box::new(RenameAttributeArray::new(
            path,
            format!("Renamed{}", i),
        )));
    }
    pipeline
}

fn bench_preflight(c: &mut Criterion) {
    let mut group = c.benchmark_group("preflight");

    for stages in [4, 16, 64].iter() {
        let mut pipeline = build_pipeline(*stages, 1000);
        group.throughput(Throughput::Elements(pipeline.len() as u64));
        group.bench_with_input(BenchmarkId::new("stages", stages), stages, |b, _| {
            b.iter(|| black_box(pipeline.preflight_pipeline()));
        });
    }

    group.finish();
}

fn bench_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute");

    for tuples in [1_000, 100_000].iter() {
        let mut pipeline = build_pipeline(8, *tuples);
        pipeline.preflight_pipeline();
        group.throughput(Throughput::Elements((*tuples * 8) as u64));
        group.bench_with_input(BenchmarkId::new("tuples", tuples), tuples, |b, _| {
            b.iter(|| black_box(pipeline.execute()));
        });
    }

    group.finish();
}

fn bench_store_copies(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_copies");

    let mut dca = DataContainerArray::new();
    let matrix = DataArrayPath::matrix("DC", "AM");
    dca.create_container("DC").unwrap();
    dca.create_matrix(&matrix, &[100_000], AttributeMatrixType::Cell)
        .unwrap();
    for i in 0..8 {
        dca.create_array(
            &matrix,
            &format!("Array{}", i),
            ElementKind::Float64,
            &[100_000],
            &[3],
            CreateOptions::allocated(),
        )
        .unwrap();
    }

    group.bench_function("schema_copy", |b| {
        b.iter(|| black_box(dca.schema_copy()));
    });
    group.bench_function("deep_copy", |b| {
        b.iter(|| black_box(dca.deep_copy()));
    });

    group.finish();
}

criterion_group!(benches, bench_preflight, bench_execute, bench_store_copies);

criterion_main!(benches);
