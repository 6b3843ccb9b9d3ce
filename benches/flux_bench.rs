//! Benchmarks for numerical flux functions.
//!
//! Run with: `cargo bench --bench flux_bench`
//!
//! Compares the interface fluxes on a scalar law and on P_N moment systems,
//! and the cost of one full flux divergence per strategy.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fv_rs::boundary::PeriodicCoupler;
use fv_rs::equations::{Burgers1D, ConservationLaw, MomentSystem1D};
use fv_rs::flux::{
    Dissipation, FluxContext1D, FluxStrategy, GodunovFlux, LaxFriedrichsFlux, NumericalFlux1D,
};
use fv_rs::mesh::Mesh1D;
use fv_rs::operators::FiniteVolumeOperator;
use fv_rs::solver::{FVState, SlopeLimiter};

/// Generate interface state pairs for flux computation.
fn generate_test_states(n: usize, n_vars: usize) -> Vec<(Vec<f64>, Vec<f64>)> {
    (0..n)
        .map(|i| {
            let phase = i as f64 * 0.1;
            let left = (0..n_vars)
                .map(|l| (phase + l as f64).sin() / (l + 1) as f64)
                .collect();
            let right = (0..n_vars)
                .map(|l| (phase + 0.5 + l as f64).cos() / (l + 1) as f64)
                .collect();
            (left, right)
        })
        .collect()
}

fn fluxes() -> Vec<Box<dyn NumericalFlux1D>> {
    vec![
        Box::new(LaxFriedrichsFlux::new(Dissipation::MeshRatio)),
        Box::new(LaxFriedrichsFlux::new(Dissipation::Local)),
        Box::new(GodunovFlux),
    ]
}

/// Benchmark individual flux functions on Burgers.
fn bench_flux_functions(c: &mut Criterion) {
    let mut group = c.benchmark_group("flux_functions");

    let law = Burgers1D;
    let ctx = FluxContext1D::new(0.01, 0.005);
    let states = generate_test_states(1000, 1);

    for flux in fluxes() {
        group.bench_function(flux.name(), |b| {
            b.iter(|| {
                let mut total = 0.0;
                for (left, right) in &states {
                    let f = flux.compute(
                        black_box(&law),
                        black_box(left),
                        black_box(right),
                        black_box(1.0),
                        black_box(&ctx),
                    );
                    total += f[0];
                }
                total
            });
        });
    }

    group.finish();
}

/// Benchmark flux cost against the number of moments.
fn bench_flux_moments(c: &mut Criterion) {
    let mut group = c.benchmark_group("flux_moments");

    let ctx = FluxContext1D::new(0.01, 0.0005);
    for order in [1, 3, 7, 15] {
        let law = MomentSystem1D::new(order).unwrap();
        let states = generate_test_states(100, law.n_vars());

        for flux in fluxes() {
            group.bench_with_input(
                BenchmarkId::new(flux.name(), format!("P{}", order)),
                &order,
                |b, _| {
                    b.iter(|| {
                        let mut total = 0.0;
                        for (left, right) in &states {
                            let f = flux.compute(
                                black_box(&law),
                                black_box(left),
                                black_box(right),
                                black_box(1.0),
                                black_box(&ctx),
                            );
                            total += f[0];
                        }
                        total
                    });
                },
            );
        }
    }

    group.finish();
}

/// Benchmark one flux divergence over the whole mesh.
fn bench_operator_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("operator_apply");

    let strategies = [
        ("lf", FluxStrategy::default()),
        (
            "godunov",
            FluxStrategy::Godunov {
                limiter: SlopeLimiter::None,
            },
        ),
        ("godunov_superbee", FluxStrategy::godunov_superbee()),
    ];

    for n_cells in [100, 1000, 10000] {
        let mesh = Mesh1D::uniform_periodic(0.0, 1.0, n_cells).unwrap();
        let law: Arc<dyn ConservationLaw> = Arc::new(Burgers1D);
        let state = FVState::from_fn(&mesh, 1, |x| {
            vec![(2.0 * std::f64::consts::PI * x).sin()]
        })
        .unwrap();
        let dt = 0.5 * mesh.h_min();

        for (name, strategy) in strategies {
            let op = FiniteVolumeOperator::new(mesh.clone(), law.clone(), strategy, &PeriodicCoupler)
                .unwrap();
            group.bench_with_input(
                BenchmarkId::new(name, format!("{}_cells", n_cells)),
                &n_cells,
                |b, _| b.iter(|| op.apply(black_box(&state), black_box(dt))),
            );
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_flux_functions,
    bench_flux_moments,
    bench_operator_apply
);
criterion_main!(benches);
