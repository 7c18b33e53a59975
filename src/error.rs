use glam::Vec3A;
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CapacityResource {
    Handles,
    Overlaps,
}

impl fmt::Display for CapacityResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Handles => "handle",
            Self::Overlaps => "overlapping pair",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum BroadphaseError {
    #[error("max_handles must be in 2..32768, got {0}")]
    InvalidMaxHandles(usize),
    #[error("max_overlaps must be in 1..65536, got {0}")]
    InvalidMaxOverlaps(usize),
    #[error("world bounds must be finite and strictly increasing, got min {min} max {max}")]
    InvalidWorldBounds { min: Vec3A, max: Vec3A },
    #[error("{resource} capacity of {capacity} exceeded")]
    CapacityExceeded {
        resource: CapacityResource,
        capacity: usize,
    },
    #[error("handle {0} is not live")]
    InvalidHandle(u16),
}
