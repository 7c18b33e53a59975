pub mod aabb_util_2;

pub use aabb_util_2::Aabb;
