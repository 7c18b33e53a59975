use glam::Vec3A;

use crate::error::BroadphaseError;

/// Construction-time parameters of an [`AxisSweep3`](crate::collision::broadphase::AxisSweep3).
/// Nothing here can change once the broadphase is built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisSweepConfig {
    pub world_min: Vec3A,
    pub world_max: Vec3A,
    /// Number of handle slots, including the reserved null handle 0
    pub max_handles: usize,
    pub max_overlaps: usize,
}

impl Default for AxisSweepConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl AxisSweepConfig {
    pub const MAX_HANDLES_LIMIT: usize = 32768;
    pub const MAX_OVERLAPS_LIMIT: usize = 65536;

    pub const DEFAULT: Self = Self {
        world_min: Vec3A::splat(-1000.),
        world_max: Vec3A::splat(1000.),
        max_handles: 16384,
        max_overlaps: 65535,
    };

    #[must_use]
    pub const fn new(
        world_min: Vec3A,
        world_max: Vec3A,
        max_handles: usize,
        max_overlaps: usize,
    ) -> Self {
        Self {
            world_min,
            world_max,
            max_handles,
            max_overlaps,
        }
    }

    pub fn validate(&self) -> Result<(), BroadphaseError> {
        if !(2..Self::MAX_HANDLES_LIMIT).contains(&self.max_handles) {
            return Err(BroadphaseError::InvalidMaxHandles(self.max_handles));
        }

        validate_max_overlaps(self.max_overlaps)?;

        if !self.world_min.is_finite()
            || !self.world_max.is_finite()
            || self.world_min.cmpge(self.world_max).any()
        {
            return Err(BroadphaseError::InvalidWorldBounds {
                min: self.world_min,
                max: self.world_max,
            });
        }

        Ok(())
    }
}

pub(crate) fn validate_max_overlaps(max_overlaps: usize) -> Result<(), BroadphaseError> {
    if (1..AxisSweepConfig::MAX_OVERLAPS_LIMIT).contains(&max_overlaps) {
        Ok(())
    } else {
        Err(BroadphaseError::InvalidMaxOverlaps(max_overlaps))
    }
}
