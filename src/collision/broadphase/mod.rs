mod axis_sweep_3;
mod broadphase_interface;
mod broadphase_proxy;
mod overlapping_pair_cache;

pub use axis_sweep_3::*;
pub use broadphase_interface::*;
pub use broadphase_proxy::*;
pub use overlapping_pair_cache::*;
