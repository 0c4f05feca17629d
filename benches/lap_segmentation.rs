//! Benchmarks for lap segmentation and session assembly
//!
//! Measures:
//! - The segmentation state machine alone over pre-built samples
//! - End-to-end `parse` including decoding and per-lap series capture
//!
//! Platform: Cross-platform (synthetic IBT data, CI-safe)

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use stint::laps::{LapSample, LapSegmenter, SegmenterConfig};
use stint::test_utils::{IbtBuilder, SyntheticSample};
use stint::{ParseOptions, parse};

const RUNS: &[(i32, usize)] = &[(1, 5400), (2, 5450), (3, 5380), (4, 5500), (5, 2000)];

fn lap_samples() -> Vec<LapSample> {
    SyntheticSample::lap_sequence(RUNS, 60.0)
        .into_iter()
        .enumerate()
        .map(|(index, s)| LapSample {
            index,
            lap: s.lap,
            session_time: Some(s.session_time),
            lap_current_time: Some(s.lap_current_time as f64),
            lap_dist_pct: Some(s.lap_dist_pct as f64),
            speed: Some(s.speed as f64),
            ..LapSample::at(index, s.lap)
        })
        .collect()
}

fn bench_state_machine(c: &mut Criterion) {
    let samples = lap_samples();
    let config = SegmenterConfig { sector_starts: vec![0.0, 0.33, 0.66], ..Default::default() };

    let mut group = c.benchmark_group("segmenter");
    group.throughput(Throughput::Elements(samples.len() as u64));
    group.bench_function("transition", |b| {
        b.iter(|| {
            let laps = LapSegmenter::segment(config.clone(), samples.iter().cloned());
            black_box(laps)
        })
    });
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let bytes = IbtBuilder::new().samples(SyntheticSample::lap_sequence(RUNS, 60.0)).build();

    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("with_series", |b| {
        b.iter(|| black_box(parse(&bytes, ["Speed", "RPM", "Gear"], &ParseOptions::default())))
    });
    group.bench_function("without_series", |b| {
        let options = ParseOptions::new().with_series(false);
        b.iter(|| black_box(parse(&bytes, ["Speed", "RPM", "Gear"], &options)))
    });
    group.finish();
}

criterion_group!(benches, bench_state_machine, bench_parse);
criterion_main!(benches);
