// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::{Arc, RwLock};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glam::Vec3;
use proximity_geometry::{Geometry, GeometryId, PointSet};
use proximity_index::{LooseOctree, OctreeConfig};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_f32(&mut self) -> f32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        ((x >> 40) as f32) / ((1u64 << 24) as f32)
    }
}

fn random_points(n: usize, extent: f32, seed: u64) -> Vec<Vec3> {
    let mut rng = Rng::new(seed);
    (0..n)
        .map(|_| {
            Vec3::new(
                (rng.next_f32() - 0.5) * extent,
                (rng.next_f32() - 0.5) * extent,
                (rng.next_f32() - 0.5) * extent,
            )
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_build");
    for &n in &[1_000usize, 10_000, 50_000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let points = random_points(n, 50.0, 42);
            b.iter(|| {
                let mut tree = LooseOctree::new(OctreeConfig {
                    min_width: 0.05,
                    ..Default::default()
                });
                tree.add_point_set(Arc::new(RwLock::new(Geometry::PointSet(PointSet::new(
                    GeometryId::new(0),
                    points.clone(),
                )))));
                tree.build();
            });
        });
    }
    group.finish();
}

fn bench_incremental_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_incremental_update");
    for &n in &[1_000usize, 10_000, 50_000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let points = random_points(n, 50.0, 7);
            let geom = Arc::new(RwLock::new(Geometry::PointSet(PointSet::new(GeometryId::new(0), points))));
            let mut tree = LooseOctree::new(OctreeConfig {
                min_width: 0.05,
                ..Default::default()
            });
            tree.add_point_set(geom.clone());
            tree.build();

            b.iter(|| {
                if let Geometry::PointSet(ps) = &mut *geom.write().unwrap() {
                    let jittered: Vec<Vec3> = ps.points().iter().map(|&p| p + Vec3::splat(0.001)).collect();
                    *ps = PointSet::new(GeometryId::new(0), jittered);
                }
                tree.update();
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_incremental_update);
criterion_main!(benches);
