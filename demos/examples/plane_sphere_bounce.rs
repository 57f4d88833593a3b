// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Direct-family detection: the bidirectional plane/sphere kernel called
//! across a handful of simulated steps, with no octree involved at all.
//! This is the path a caller takes for a single known-cheap pair that
//! never needs broad-phase culling.
//!
//! Run:
//! - `cargo run -p proximity_demos --example plane_sphere_bounce`

use glam::Vec3;
use proximity_data::CollisionData;
use proximity_geometry::{GeometryId, Plane, Sphere};
use proximity_narrowphase::kernels::{bidirectional_plane_to_sphere, KernelOutcome};

fn main() {
    tracing_subscriber::fmt::init();

    let floor = Plane::new(GeometryId::new(0), Vec3::ZERO, Vec3::Y);
    let mut height = 1.5_f32;
    let radius = 0.5;
    let gravity = -0.35;

    for step in 0..6 {
        let ball = Sphere::new(GeometryId::new(1), Vec3::new(0.0, height, 0.0), radius);
        let data = CollisionData::new();
        match bidirectional_plane_to_sphere(&floor, &ball, &data) {
            KernelOutcome::Contact => {
                let count = data.elements_a().len() + data.elements_b().len();
                println!("step {step}: height {height:.3} -> contact ({count} element(s))");
            }
            KernelOutcome::NoContact => println!("step {step}: height {height:.3} -> no contact"),
            KernelOutcome::Degenerate => println!("step {step}: degenerate plane"),
        }
        height += gravity * 0.2;
    }
}
