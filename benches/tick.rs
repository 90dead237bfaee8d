//! Benchmarks for the per-frame tick: physics plus software rasterization.
//!
//! Run with: `cargo bench`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mwpe::{DeviceId, Fidelity, Simulation};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;
const WARMUP_FRAMES: u32 = 300;

fn bench_tick_per_device(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    for device in DeviceId::ALL {
        // Warm the pool so the measurement reflects steady state.
        let mut sim = Simulation::new(device).with_seed(42);
        for _ in 0..WARMUP_FRAMES {
            sim.tick(WIDTH, HEIGHT);
        }

        group.bench_function(BenchmarkId::from_parameter(device.as_str()), |b| {
            b.iter(|| sim.tick(WIDTH, HEIGHT))
        });
    }
    group.finish();
}

fn bench_tick_by_fidelity(c: &mut Criterion) {
    let mut group = c.benchmark_group("fidelity");
    for fidelity in [Fidelity::Low, Fidelity::Medium, Fidelity::High] {
        let mut sim = Simulation::new(DeviceId::Magnetron)
            .with_fidelity(fidelity)
            .with_seed(42);
        for _ in 0..WARMUP_FRAMES {
            sim.tick(WIDTH, HEIGHT);
        }

        group.bench_function(BenchmarkId::from_parameter(fidelity.label()), |b| {
            b.iter(|| sim.tick(WIDTH, HEIGHT))
        });
    }
    group.finish();
}

fn bench_paused_redraw(c: &mut Criterion) {
    // Paused ticks skip physics but still rasterize the full frame.
    let mut sim = Simulation::new(DeviceId::TravelingWaveTube).with_seed(42);
    for _ in 0..WARMUP_FRAMES {
        sim.tick(WIDTH, HEIGHT);
    }
    sim.set_running(false);

    c.bench_function("paused_redraw", |b| b.iter(|| sim.tick(WIDTH, HEIGHT)));
}

criterion_group!(
    benches,
    bench_tick_per_device,
    bench_tick_by_fidelity,
    bench_paused_redraw
);
criterion_main!(benches);
