//! Benchmarks for the per-tick step and the force policy.
//!
//! Run with: `cargo bench` (add `--features parallel` for the rayon step)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use gridswarm::prelude::*;

fn bench_force_policy(c: &mut Criterion) {
    let mut group = c.benchmark_group("force_policy");

    let modes = [
        ("idle", SimConfig::default()),
        (
            "disperse",
            SimConfig {
                disperse: true,
                ..Default::default()
            },
        ),
        (
            "attract_capture",
            SimConfig {
                disperse: true,
                bring_to_point: true,
                ..Default::default()
            },
        ),
    ];

    for (name, config) in &modes {
        group.bench_function(*name, |b| {
            let policy = ForcePolicy::default();
            let ctx = ForceContext::new(config, Vec3::new(1.0, 1.0, 0.0));
            let mut rng = SmallRng::seed_from_u64(1);
            let mut particle = Particle::new(Vec3::new(3.0, 2.0, 0.0), 0.0);
            b.iter(|| {
                policy.apply(&mut particle, &ctx, &mut rng);
                black_box(particle.acceleration())
            })
        });
    }

    group.finish();
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for side in [10u32, 100, 300] {
        let config = SimConfig {
            num_particles: side,
            disperse: true,
            bring_to_point: true,
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("serial", side * side), &config, |b, config| {
            let mut sim = Simulation::new(1);
            sim.load_scene(config);
            b.iter(|| black_box(sim.step(config).count))
        });

        #[cfg(feature = "parallel")]
        group.bench_with_input(BenchmarkId::new("parallel", side * side), &config, |b, config| {
            let mut sim = Simulation::new(1);
            sim.load_scene(config);
            b.iter(|| black_box(sim.step_parallel(config).count))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_force_policy, bench_step);
criterion_main!(benches);
