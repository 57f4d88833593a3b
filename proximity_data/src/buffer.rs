//! The append-safe collision-data buffer read by the solver.

use std::sync::Mutex;

use crate::element::{CollisionElement, EdgeEdgeElement, PointTetrahedronElement, VertexTriangleElement};

/// Two append-only sequences of tagged collision elements (one per side of
/// a registered pair), plus the three legacy typed sub-buffers the older
/// per-test kernels still write through.
///
/// All pushes go through a mutex-guarded `Vec`; the lock's critical section
/// is a single `push`, matching "element appends are safe under concurrent
/// producers" without requiring a lock-free queue.
#[derive(Debug, Default)]
pub struct CollisionData {
    elements_a: Mutex<Vec<CollisionElement>>,
    elements_b: Mutex<Vec<CollisionElement>>,
    vt: Mutex<Vec<VertexTriangleElement>>,
    ee: Mutex<Vec<EdgeEdgeElement>>,
    pt: Mutex<Vec<PointTetrahedronElement>>,
}

impl CollisionData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_a(&self, element: impl Into<CollisionElement>) {
        self.elements_a
            .lock()
            .expect("collision data mutex poisoned")
            .push(element.into());
    }

    pub fn append_b(&self, element: impl Into<CollisionElement>) {
        self.elements_b
            .lock()
            .expect("collision data mutex poisoned")
            .push(element.into());
    }

    #[must_use]
    pub fn elements_a(&self) -> Vec<CollisionElement> {
        self.elements_a.lock().expect("collision data mutex poisoned").clone()
    }

    #[must_use]
    pub fn elements_b(&self) -> Vec<CollisionElement> {
        self.elements_b.lock().expect("collision data mutex poisoned").clone()
    }

    /// Clears every sub-buffer. Not meant to run concurrently with
    /// writers — callers call this once at the start of a detect call,
    /// before any narrow-phase dispatch for that step.
    pub fn clear_all(&self) {
        self.elements_a.lock().expect("collision data mutex poisoned").clear();
        self.elements_b.lock().expect("collision data mutex poisoned").clear();
        self.vt.lock().expect("collision data mutex poisoned").clear();
        self.ee.lock().expect("collision data mutex poisoned").clear();
        self.pt.lock().expect("collision data mutex poisoned").clear();
    }
}

/// Maps an `f32` to a `u32` whose unsigned ordering matches the float's
/// total order — used by the typed sub-buffers' sort-by-key post-process
/// (e.g. point-mesh dedup: sort by vertex id, then by closest distance).
#[must_use]
pub fn ordered_bits(v: f32) -> u32 {
    let bits = v.to_bits();
    if bits & 0x8000_0000 != 0 {
        !bits
    } else {
        bits | 0x8000_0000
    }
}

macro_rules! typed_subbuffer {
    ($field:ident, $elem:ty, $append:ident, $size:ident, $get:ident, $sort_by:ident, $resize:ident, $set:ident, $all:ident, $replace_all:ident) => {
        impl CollisionData {
            pub fn $append(&self, element: $elem) {
                self.$field.lock().expect("collision data mutex poisoned").push(element);
            }

            #[must_use]
            pub fn $size(&self) -> usize {
                self.$field.lock().expect("collision data mutex poisoned").len()
            }

            #[must_use]
            pub fn $get(&self, index: usize) -> $elem {
                self.$field.lock().expect("collision data mutex poisoned")[index]
            }

            #[must_use]
            pub fn $all(&self) -> Vec<$elem> {
                self.$field.lock().expect("collision data mutex poisoned").clone()
            }

            pub fn $set(&self, index: usize, element: $elem) {
                self.$field.lock().expect("collision data mutex poisoned")[index] = element;
            }

            pub fn $resize(&self, new_len: usize) {
                self.$field.lock().expect("collision data mutex poisoned").truncate(new_len);
            }

            /// Sorts the sub-buffer in place by `key`, used during the
            /// point-mesh dedup post-process (sort by vertex id then by
            /// closest distance).
            pub fn $sort_by<K: Ord>(&self, mut key: impl FnMut(&$elem) -> K) {
                self.$field
                    .lock()
                    .expect("collision data mutex poisoned")
                    .sort_by_key(|e| key(e));
            }

            /// Overwrites the sub-buffer wholesale — used by post-processing
            /// passes (e.g. point-mesh dedup) that compute a filtered/sorted
            /// copy and then publish it back.
            pub fn $replace_all(&self, items: Vec<$elem>) {
                *self.$field.lock().expect("collision data mutex poisoned") = items;
            }
        }
    };
}

typed_subbuffer!(
    vt,
    VertexTriangleElement,
    vt_safe_append,
    vt_size,
    vt_get,
    vt_sort_by,
    vt_resize,
    vt_set,
    vt_all,
    vt_replace_all
);
typed_subbuffer!(
    ee,
    EdgeEdgeElement,
    ee_safe_append,
    ee_size,
    ee_get,
    ee_sort_by,
    ee_resize,
    ee_set,
    ee_all,
    ee_replace_all
);
typed_subbuffer!(
    pt,
    PointTetrahedronElement,
    pt_safe_append,
    pt_size,
    pt_get,
    pt_sort_by,
    pt_resize,
    pt_set,
    pt_all,
    pt_replace_all
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::PointDirectionElement;
    use glam::Vec3;

    #[test]
    fn clear_all_empties_every_subbuffer() {
        let data = CollisionData::new();
        data.append_a(PointDirectionElement {
            point: Vec3::ZERO,
            direction: Vec3::Y,
            depth: 1.0,
        });
        data.vt_safe_append(VertexTriangleElement {
            vertex_idx: 0,
            triangle_idx: 0,
            closest_distance: 0.1,
        });
        data.clear_all();
        assert_eq!(data.elements_a().len(), 0);
        assert_eq!(data.vt_size(), 0);
    }

    #[test]
    fn vt_sort_orders_by_vertex_then_distance() {
        let data = CollisionData::new();
        data.vt_safe_append(VertexTriangleElement {
            vertex_idx: 2,
            triangle_idx: 0,
            closest_distance: 0.5,
        });
        data.vt_safe_append(VertexTriangleElement {
            vertex_idx: 1,
            triangle_idx: 3,
            closest_distance: 0.9,
        });
        data.vt_safe_append(VertexTriangleElement {
            vertex_idx: 1,
            triangle_idx: 1,
            closest_distance: 0.1,
        });
        data.vt_sort_by(|e| (e.vertex_idx, ordered_float_bits(e.closest_distance)));
        assert_eq!(data.vt_get(0).vertex_idx, 1);
        assert_eq!(data.vt_get(0).triangle_idx, 1);
        assert_eq!(data.vt_get(1).vertex_idx, 1);
        assert_eq!(data.vt_get(2).vertex_idx, 2);
    }

    fn ordered_float_bits(v: f32) -> u32 {
        let bits = v.to_bits();
        if bits & 0x8000_0000 != 0 {
            !bits
        } else {
            bits | 0x8000_0000
        }
    }
}
