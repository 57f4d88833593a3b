use glam::Vec3;

/// An axis-aligned bounding box in world space.
///
/// Degenerate boxes (`min > max` on some axis) are representable and treated
/// as empty by [`Aabb3::is_empty`]; callers that fold boxes together should
/// start from [`Aabb3::EMPTY`] and [`Aabb3::union`] rather than assume a
/// non-empty starting box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb3 {
    /// An AABB that contains no points; folds as the identity of [`Aabb3::union`].
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points
            .into_iter()
            .fold(Self::EMPTY, |acc, p| acc.union(&Self::from_point(p)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[must_use]
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Returns a box scaled by `factor` about its own center — used to derive
    /// a node's loose bounds from its tight bounds.
    #[must_use]
    pub fn scaled_about_center(&self, factor: f32) -> Self {
        let c = self.center();
        let he = self.half_extents() * factor;
        Self {
            min: c - he,
            max: c + he,
        }
    }

    #[must_use]
    pub fn min_edge_length(&self) -> f32 {
        let e = self.max - self.min;
        e.x.min(e.y).min(e.z)
    }
}
