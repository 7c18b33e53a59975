use glam::{U16Vec3, Vec3A};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3A,
    pub max: Vec3A,
}

impl Aabb {
    pub const ZERO: Self = Self {
        min: Vec3A::ZERO,
        max: Vec3A::ZERO,
    };

    #[inline]
    pub const fn new(min: Vec3A, max: Vec3A) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn center(&self) -> Vec3A {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn extents(&self) -> Vec3A {
        self.max - self.min
    }

    #[inline]
    pub fn intersects(&self, rhs: &Self) -> bool {
        self.min.cmple(rhs.max).all() && self.max.cmpge(rhs.min).all()
    }

    #[inline]
    pub fn contains_point(&self, point: Vec3A) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Inclusive overlap test on quantized bounds; touching boxes overlap.
#[inline]
pub fn test_quantized_aabb_against_quantized_aabb(
    aabb_min_1: U16Vec3,
    aabb_max_1: U16Vec3,
    aabb_min_2: U16Vec3,
    aabb_max_2: U16Vec3,
) -> bool {
    !(aabb_min_1.cmpgt(aabb_max_2).any() || aabb_max_1.cmplt(aabb_min_2).any())
}
