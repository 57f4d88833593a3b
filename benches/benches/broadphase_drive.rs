// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glam::Vec3;
use proximity_broadphase::{drive, PairDispatcher};
use proximity_geometry::{Geometry, GeometryId, PointSet, SurfaceMesh};
use proximity_index::{LooseOctree, OctreeConfig, PrimitiveDescriptor};

struct CountingDispatcher {
    seen: AtomicUsize,
}

impl PairDispatcher for CountingDispatcher {
    fn is_registered(&self, a: GeometryId, b: GeometryId) -> bool {
        (a.raw() == 0 && b.raw() == 1) || (a.raw() == 1 && b.raw() == 0)
    }

    fn dispatch(&self, _a: &PrimitiveDescriptor, _b: &PrimitiveDescriptor) {
        self.seen.fetch_add(1, Ordering::Relaxed);
    }
}

fn unit_box_mesh(id: u32) -> SurfaceMesh {
    let v = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(1.0, 0.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(0.0, 1.0, 1.0),
    ];
    let faces = vec![
        [0, 1, 2],
        [0, 2, 3],
        [4, 6, 5],
        [4, 7, 6],
        [0, 4, 5],
        [0, 5, 1],
        [1, 5, 6],
        [1, 6, 2],
        [2, 6, 7],
        [2, 7, 3],
        [3, 7, 4],
        [3, 4, 0],
    ];
    SurfaceMesh::new(GeometryId::new(id), v.to_vec(), faces)
}

fn bench_drive(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadphase_drive");
    for &n in &[100usize, 1_000, 5_000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let points: Vec<Vec3> = (0..n)
                .map(|i| {
                    let t = i as f32 / n as f32;
                    Vec3::splat(t)
                })
                .collect();
            let mut tree = LooseOctree::new(OctreeConfig {
                min_width: 0.02,
                ..Default::default()
            });
            tree.add_point_set(Arc::new(RwLock::new(Geometry::PointSet(PointSet::new(
                GeometryId::new(0),
                points,
            )))));
            tree.add_triangle_mesh(Arc::new(RwLock::new(Geometry::SurfaceMesh(unit_box_mesh(1)))));
            tree.build();

            b.iter(|| {
                let dispatcher = CountingDispatcher { seen: AtomicUsize::new(0) };
                drive(&tree, &dispatcher);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_drive);
criterion_main!(benches);
