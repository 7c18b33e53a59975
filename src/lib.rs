//! Sweep-and-prune broadphase: three sorted axes of quantized AABB endpoints,
//! updated incrementally, feeding a fixed-capacity overlapping pair cache.

pub mod collision;
pub mod config;
pub mod error;
pub mod linear_math;
pub mod logging;

pub use collision::broadphase::{
    AxisSweep3, BroadphaseAabbCallback, BroadphaseInterface, BroadphasePair, BroadphaseProxy,
    CollisionFilterGroups, Edge, OverlapCallback, OverlappingPairCache,
};
pub use config::AxisSweepConfig;
pub use error::{BroadphaseError, CapacityResource};
pub use glam;
pub use linear_math::Aabb;
