//! Benchmarks for subdivision, neighbourhood queries and denoising.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use mesh_denoise::algo::adjacency::{distance_neighborhood, NeighborSearch};
use mesh_denoise::prelude::*;
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn create_grid_mesh(n: usize) -> TriangleMesh {
    let mut positions = Vec::with_capacity((n + 1) * (n + 1));
    let mut triangles = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            positions.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            triangles.push([v00, v10, v11]);
            triangles.push([v00, v11, v01]);
        }
    }

    TriangleMesh::new(positions, triangles).unwrap()
}

fn bench_subdivision(c: &mut Criterion) {
    let mesh = create_grid_mesh(30);
    let options = SubdivideOptions::new(1);

    c.bench_function("linear_subdivide_grid_30", |b| {
        b.iter_batched(
            || mesh.clone(),
            |mut m| {
                linear_subdivide(&mut m, &options);
                m
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("loop_subdivide_grid_30", |b| {
        b.iter_batched(
            || mesh.clone(),
            |mut m| {
                loop_subdivide(&mut m, &options);
                m
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_neighborhood(c: &mut Criterion) {
    let mesh = create_grid_mesh(30);

    c.bench_function("neighborhood_brute_force_grid_30", |b| {
        b.iter(|| distance_neighborhood(mesh.positions(), 2.0, NeighborSearch::BruteForce));
    });

    c.bench_function("neighborhood_uniform_grid_30", |b| {
        b.iter(|| distance_neighborhood(mesh.positions(), 2.0, NeighborSearch::Grid));
    });
}

fn bench_bilateral(c: &mut Criterion) {
    let mut noisy = create_grid_mesh(20);
    add_noise(&mut noisy, &NoiseOptions::default(), &mut StdRng::seed_from_u64(1));

    let options = BilateralOptions::new(1, 0.01)
        .unwrap()
        .with_sigma_c(1.0)
        .unwrap()
        .with_search(NeighborSearch::Grid);

    c.bench_function("bilateral_filter_grid_20", |b| {
        b.iter_batched(
            || noisy.clone(),
            |mut m| bilateral_filter(&mut m, &options, &mut StdRng::seed_from_u64(2)),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_subdivision, bench_neighborhood, bench_bilateral);
criterion_main!(benches);
