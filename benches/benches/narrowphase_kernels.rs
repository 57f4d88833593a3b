// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use proximity_data::CollisionData;
use proximity_geometry::{Cylinder, GeometryId, Plane, Sphere};
use proximity_narrowphase::kernels::{bidirectional_plane_to_sphere, sphere_to_cylinder, sphere_to_sphere, triangle_to_triangle};

fn bench_sphere_sphere(c: &mut Criterion) {
    let a = Sphere::new(GeometryId::new(0), Vec3::ZERO, 1.0);
    let b = Sphere::new(GeometryId::new(1), Vec3::new(0.5, 0.0, 0.0), 1.0);
    c.bench_function("sphere_to_sphere", |bench| {
        bench.iter(|| {
            let data = CollisionData::new();
            sphere_to_sphere(black_box(&a), black_box(&b), &data);
        });
    });
}

fn bench_plane_sphere(c: &mut Criterion) {
    let p = Plane::new(GeometryId::new(0), Vec3::ZERO, Vec3::Y);
    let s = Sphere::new(GeometryId::new(1), Vec3::new(0.0, 0.3, 0.0), 1.0);
    c.bench_function("bidirectional_plane_to_sphere", |bench| {
        bench.iter(|| {
            let data = CollisionData::new();
            bidirectional_plane_to_sphere(black_box(&p), black_box(&s), &data);
        });
    });
}

fn bench_sphere_cylinder(c: &mut Criterion) {
    let s = Sphere::new(GeometryId::new(0), Vec3::new(0.0, 1.0, 0.0), 0.75);
    let cyl = Cylinder::new(GeometryId::new(1), Vec3::ZERO, Vec3::X, 0.5);
    c.bench_function("sphere_to_cylinder", |bench| {
        bench.iter(|| {
            let data = CollisionData::new();
            sphere_to_cylinder(black_box(&s), black_box(&cyl), &data);
        });
    });
}

fn bench_triangle_triangle(c: &mut Criterion) {
    let face_a = [0u32, 1, 2];
    let verts_a = [Vec3::new(-1.0, -1.0, 0.0), Vec3::new(2.0, -1.0, 0.0), Vec3::new(-1.0, 2.0, 0.0)];
    let face_b = [3u32, 4, 5];
    let verts_b = [Vec3::new(-0.2, -0.2, -1.0), Vec3::new(-0.2, -0.2, 1.0), Vec3::new(1.0, 1.0, 0.5)];
    c.bench_function("triangle_to_triangle", |bench| {
        bench.iter(|| {
            let data = CollisionData::new();
            triangle_to_triangle(black_box(face_a), black_box(verts_a), 0, black_box(face_b), black_box(verts_b), &data);
        });
    });
}

criterion_group!(benches, bench_sphere_sphere, bench_plane_sphere, bench_sphere_cylinder, bench_triangle_triangle);
criterion_main!(benches);
