use glam::Vec3A;

use super::{
    axis_sweep_3::AxisSweep3, broadphase_proxy::BroadphaseAabbCallback,
    overlapping_pair_cache::OverlappingPairCache,
};
use crate::{error::BroadphaseError, linear_math::aabb_util_2::Aabb};

pub trait BroadphaseInterface {
    fn create_proxy(
        &mut self,
        aabb_min: Vec3A,
        aabb_max: Vec3A,
        owner: usize,
        collision_filter_group: u16,
        collision_filter_mask: u16,
    ) -> Result<u16, BroadphaseError>;

    fn destroy_proxy(&mut self, proxy: u16) -> Result<(), BroadphaseError>;

    fn set_aabb(&mut self, proxy: u16, aabb_min: Vec3A, aabb_max: Vec3A)
    -> Result<(), BroadphaseError>;

    fn get_aabb(&self, proxy: u16) -> Option<Aabb>;

    fn aabb_test(&self, aabb_min: Vec3A, aabb_max: Vec3A, callback: &mut dyn BroadphaseAabbCallback);

    fn get_overlapping_pair_cache(&self) -> &OverlappingPairCache;

    fn get_overlapping_pair_cache_mut(&mut self) -> &mut OverlappingPairCache;

    fn get_broadphase_aabb(&self) -> Aabb;
}

impl BroadphaseInterface for AxisSweep3 {
    #[inline]
    fn create_proxy(
        &mut self,
        aabb_min: Vec3A,
        aabb_max: Vec3A,
        owner: usize,
        collision_filter_group: u16,
        collision_filter_mask: u16,
    ) -> Result<u16, BroadphaseError> {
        self.add_handle(
            aabb_min,
            aabb_max,
            owner,
            collision_filter_group,
            collision_filter_mask,
        )
    }

    #[inline]
    fn destroy_proxy(&mut self, proxy: u16) -> Result<(), BroadphaseError> {
        self.remove_handle(proxy)
    }

    #[inline]
    fn set_aabb(
        &mut self,
        proxy: u16,
        aabb_min: Vec3A,
        aabb_max: Vec3A,
    ) -> Result<(), BroadphaseError> {
        self.update_handle(proxy, aabb_min, aabb_max)
    }

    #[inline]
    fn get_aabb(&self, proxy: u16) -> Option<Aabb> {
        AxisSweep3::get_aabb(self, proxy)
    }

    fn aabb_test(
        &self,
        aabb_min: Vec3A,
        aabb_max: Vec3A,
        callback: &mut dyn BroadphaseAabbCallback,
    ) {
        AxisSweep3::aabb_test(self, aabb_min, aabb_max, callback);
    }

    #[inline]
    fn get_overlapping_pair_cache(&self) -> &OverlappingPairCache {
        self.pair_cache()
    }

    #[inline]
    fn get_overlapping_pair_cache_mut(&mut self) -> &mut OverlappingPairCache {
        self.pair_cache_mut()
    }

    #[inline]
    fn get_broadphase_aabb(&self) -> Aabb {
        self.world_aabb()
    }
}
