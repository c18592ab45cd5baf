// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-step cost of the burst generator

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scgen_device::{burst_current, GeneratorParameters, SaccadeCurrentGenerator};
use scgen_kernel::{EventBuffer, Node, SimulationClock, StepRange};

fn params() -> GeneratorParameters {
    GeneratorParameters {
        amplitude: 300.0,
        decay_rate: 0.08,
        shape: 2.5,
        population_size: 0.6,
        distance: 0.3,
        onset: 20.0,
    }
}

fn bench_burst_current(c: &mut Criterion) {
    let params = params();
    c.bench_function("burst_current", |b| {
        b.iter(|| burst_current(black_box(&params), black_box(42.5)))
    });
}

fn bench_update_slice(c: &mut Criterion) {
    let clock = SimulationClock::new(0.1, 10).unwrap();
    let mut generator = SaccadeCurrentGenerator::with_parameters(clock, params()).unwrap();
    generator.calibrate().unwrap();
    let mut sink = EventBuffer::new();
    let mut origin = 0;

    c.bench_function("update_min_delay_slice", |b| {
        b.iter(|| {
            let range = StepRange::new(origin, 0, 10, &clock).unwrap();
            generator.update(range, &mut sink).unwrap();
            sink.drain();
            origin += 10;
        })
    });
}

criterion_group!(benches, bench_burst_current, bench_update_slice);
criterion_main!(benches);
