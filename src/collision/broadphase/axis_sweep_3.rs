use glam::{U16Vec3, Vec3A};
use log::{debug, trace, warn};

use super::{
    broadphase_proxy::{BroadphaseAabbCallback, BroadphasePair, BroadphaseProxy},
    overlapping_pair_cache::OverlappingPairCache,
};
use crate::{
    config::AxisSweepConfig,
    error::{BroadphaseError, CapacityResource},
    linear_math::aabb_util_2::{Aabb, test_quantized_aabb_against_quantized_aabb},
};

/// One interval endpoint on an axis.
///
/// The low bit of `pos` flags a max endpoint, so a min and a max at the same
/// coordinate always sort min-first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Edge {
    pub pos: u16,
    pub handle: u16,
}

impl Edge {
    #[inline]
    #[must_use]
    pub const fn is_max(&self) -> bool {
        self.pos & 1 != 0
    }
}

#[derive(Clone, Debug)]
enum Slot {
    /// Handle 0, owner of the two boundary edges of every axis
    Sentinel,
    Live(BroadphaseProxy),
    /// 0 terminates the free list
    Free { next_free: u16 },
}

/// Incremental sweep-and-prune broadphase over three axes.
///
/// Every live handle owns a min and a max edge per axis; each axis keeps its edges
/// sorted between two sentinel edges. Moving a handle re-sorts only its own edges,
/// and every time a min edge crosses a max edge of another handle the pair cache
/// is told whether the two boxes started or stopped overlapping.
pub struct AxisSweep3 {
    world_aabb_min: Vec3A,
    world_aabb_max: Vec3A,
    quantize: Vec3A,
    max_handles: u16,
    num_handles: u16,
    first_free_handle: u16,
    handles: Vec<Slot>,
    edges: [Vec<Edge>; 3],
    pair_cache: OverlappingPairCache,
    /// Pairs the full cache turned away during the current public operation
    dropped_pairs: Vec<(u16, u16)>,
}

impl AxisSweep3 {
    const SENTINEL_POS: u16 = 0xffff;

    pub fn new(config: AxisSweepConfig) -> Result<Self, BroadphaseError> {
        config.validate()?;

        let max_handles = config.max_handles as u16;
        let pair_cache = OverlappingPairCache::new(config.max_overlaps)?;

        let aabb_size = config.world_max - config.world_min;
        let quantize = Vec3A::splat(65535.0) / aabb_size;

        // handle 0 is the null handle and owns the sentinels, the rest start out free
        let mut handles = Vec::with_capacity(config.max_handles);
        handles.push(Slot::Sentinel);
        for i in 1..max_handles {
            let next_free = if i + 1 < max_handles { i + 1 } else { 0 };
            handles.push(Slot::Free { next_free });
        }

        let num_edges = config.max_handles * 2 + 2;
        let edges = std::array::from_fn(|_| {
            let mut axis_edges = vec![Edge::default(); num_edges];
            axis_edges[0] = Edge { pos: 0, handle: 0 };
            axis_edges[1] = Edge {
                pos: Self::SENTINEL_POS,
                handle: 0,
            };
            axis_edges
        });

        debug!(
            "Created sweep and prune broadphase over [{}, {}] with {} handles and {} overlaps",
            config.world_min, config.world_max, config.max_handles, config.max_overlaps
        );

        Ok(Self {
            world_aabb_min: config.world_min,
            world_aabb_max: config.world_max,
            quantize,
            max_handles,
            num_handles: 0,
            first_free_handle: 1,
            handles,
            edges,
            pair_cache,
            dropped_pairs: Vec::new(),
        })
    }

    pub fn with_bounds(
        world_min: Vec3A,
        world_max: Vec3A,
        max_handles: usize,
        max_overlaps: usize,
    ) -> Result<Self, BroadphaseError> {
        Self::new(AxisSweepConfig::new(
            world_min,
            world_max,
            max_handles,
            max_overlaps,
        ))
    }

    #[inline]
    pub const fn world_aabb(&self) -> Aabb {
        Aabb::new(self.world_aabb_min, self.world_aabb_max)
    }

    /// Number of live handles, not counting the null handle.
    #[inline]
    pub const fn num_handles(&self) -> usize {
        self.num_handles as usize
    }

    #[inline]
    pub const fn max_handles(&self) -> usize {
        self.max_handles as usize
    }

    #[inline]
    pub const fn pair_cache(&self) -> &OverlappingPairCache {
        &self.pair_cache
    }

    #[inline]
    pub const fn pair_cache_mut(&mut self) -> &mut OverlappingPairCache {
        &mut self.pair_cache
    }

    #[inline]
    pub fn overlapping_pairs(&self) -> &[BroadphasePair] {
        self.pair_cache.pairs()
    }

    /// The owners of both proxies of every overlapping pair.
    pub fn overlapping_pair_owners(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pair_cache
            .pairs()
            .iter()
            .map(|pair| (self.proxy(pair.proxy0).owner, self.proxy(pair.proxy1).owner))
    }

    /// The sorted edges of `axis`, both sentinels included.
    #[inline]
    pub fn edges(&self, axis: usize) -> &[Edge] {
        &self.edges[axis][..self.num_handles as usize * 2 + 2]
    }

    pub fn get_handle(&self, handle: u16) -> Option<&BroadphaseProxy> {
        match self.handles.get(handle as usize) {
            Some(Slot::Live(proxy)) => Some(proxy),
            _ => None,
        }
    }

    #[inline]
    fn proxy(&self, handle: u16) -> &BroadphaseProxy {
        match &self.handles[handle as usize] {
            Slot::Live(proxy) => proxy,
            slot => unreachable!("edge references handle {handle} in non-live slot {slot:?}"),
        }
    }

    #[inline]
    fn proxy_mut(&mut self, handle: u16) -> &mut BroadphaseProxy {
        match &mut self.handles[handle as usize] {
            Slot::Live(proxy) => proxy,
            slot => unreachable!("edge references handle {handle} in non-live slot {slot:?}"),
        }
    }

    /// Clamps `point` into the world bounds and maps it onto the even values of
    /// `0..=0xfffc`, with the low bit set for max endpoints.
    pub fn quantize(&self, point: Vec3A, is_max: bool) -> U16Vec3 {
        let clamped_point = point.clamp(self.world_aabb_min, self.world_aabb_max);
        let v = (clamped_point - self.world_aabb_min) * self.quantize;

        (v.as_u16vec3() & 0xfffc) | u16::from(is_max)
    }

    pub fn unquantize(&self, vec_in: U16Vec3) -> Vec3A {
        (vec_in & 0xfffc).as_vec3a() / self.quantize + self.world_aabb_min
    }

    pub fn get_quantized_aabb(&self, handle: u16) -> Option<(U16Vec3, U16Vec3)> {
        let proxy = self.get_handle(handle)?;
        let min = std::array::from_fn(|axis| self.edges[axis][proxy.min_edges[axis] as usize].pos);
        let max = std::array::from_fn(|axis| self.edges[axis][proxy.max_edges[axis] as usize].pos);

        Some((U16Vec3::from_array(min), U16Vec3::from_array(max)))
    }

    /// The bounds stored for `handle`, after clamping and quantization.
    pub fn get_aabb(&self, handle: u16) -> Option<Aabb> {
        let (min, max) = self.get_quantized_aabb(handle)?;
        Some(Aabb::new(self.unquantize(min), self.unquantize(max)))
    }

    fn alloc_handle(&mut self) -> Result<u16, BroadphaseError> {
        let handle = self.first_free_handle;
        if handle == 0 {
            return Err(BroadphaseError::CapacityExceeded {
                resource: CapacityResource::Handles,
                capacity: self.max_handles as usize - 1,
            });
        }

        let Slot::Free { next_free } = self.handles[handle as usize] else {
            unreachable!("free list head {handle} is not a free slot");
        };

        self.first_free_handle = next_free;
        self.num_handles += 1;

        Ok(handle)
    }

    fn free_handle(&mut self, handle: u16) {
        debug_assert!(handle > 0 && handle < self.max_handles);

        self.handles[handle as usize] = Slot::Free {
            next_free: self.first_free_handle,
        };
        self.first_free_handle = handle;
        self.num_handles -= 1;
    }

    fn check_live(&self, handle: u16) -> Result<(), BroadphaseError> {
        if self.get_handle(handle).is_some() {
            Ok(())
        } else {
            Err(BroadphaseError::InvalidHandle(handle))
        }
    }

    pub fn add_handle(
        &mut self,
        aabb_min: Vec3A,
        aabb_max: Vec3A,
        owner: usize,
        collision_filter_group: u16,
        collision_filter_mask: u16,
    ) -> Result<u16, BroadphaseError> {
        debug_assert!(aabb_min.cmple(aabb_max).all(), "Invalid aabb min/max");

        let min = self.quantize(aabb_min, false);
        let max = self.quantize(aabb_max, true);

        let handle = self.alloc_handle()?;

        // the freshly opened slots sit just inside the max sentinel
        let limit = self.num_handles * 2;
        for axis in 0..3 {
            let axis_edges = &mut self.edges[axis];
            axis_edges[limit as usize + 1] = axis_edges[limit as usize - 1];
            axis_edges[limit as usize - 1] = Edge {
                pos: min[axis],
                handle,
            };
            axis_edges[limit as usize] = Edge {
                pos: max[axis],
                handle,
            };
        }

        self.handles[handle as usize] = Slot::Live(BroadphaseProxy {
            unique_id: handle,
            owner,
            collision_filter_group,
            collision_filter_mask,
            min_edges: [limit - 1; 3],
            max_edges: [limit; 3],
        });

        // Axis 2 is placed first without overlap tracking. Axes 0 and 1 then report
        // overlaps; by the time axis 1 sorts, the other two axes are in place, so
        // every pair is found exactly once.
        for (axis, update_overlaps) in [(2, false), (0, true), (1, true)] {
            let min_edge = self.proxy(handle).min_edges[axis];
            self.sort_min_down(axis, min_edge, update_overlaps);

            let max_edge = self.proxy(handle).max_edges[axis];
            self.sort_max_down(axis, max_edge, update_overlaps);
        }

        if let Err(err) = self.settle_dropped_pairs() {
            // don't leave a handle behind that the caller never got an id for
            self.remove_handle(handle)?;
            return Err(err);
        }

        self.debug_validate();

        debug!(
            "Added handle {handle} for owner {owner} ({} live)",
            self.num_handles
        );

        Ok(handle)
    }

    pub fn remove_handle(&mut self, handle: u16) -> Result<(), BroadphaseError> {
        self.check_live(handle)?;

        self.pair_cache.remove_pairs_containing(handle);

        let limit = (self.num_handles * 2) as usize;

        // sort both edges up against the max sentinel, then let the min edge's slot
        // become the new sentinel
        for axis in 0..3 {
            let max_edge = self.proxy(handle).max_edges[axis];
            self.edges[axis][max_edge as usize].pos = Self::SENTINEL_POS;
            self.sort_max_up(axis, max_edge, false);

            let min_edge = self.proxy(handle).min_edges[axis];
            self.edges[axis][min_edge as usize].pos = Self::SENTINEL_POS;
            self.sort_min_up(axis, min_edge, false);

            debug_assert_eq!(self.proxy(handle).min_edges[axis] as usize, limit - 1);
            debug_assert_eq!(self.proxy(handle).max_edges[axis] as usize, limit);

            self.edges[axis][limit - 1] = Edge {
                pos: Self::SENTINEL_POS,
                handle: 0,
            };
        }

        self.free_handle(handle);

        debug!("Removed handle {handle} ({} live)", self.num_handles);

        self.debug_validate();

        Ok(())
    }

    /// Moves `handle` to new bounds and brings the pair cache up to date.
    ///
    /// `CapacityExceeded` means the new bounds are stored and every axis is sorted,
    /// but at least one new overlap did not fit in the pair cache. That pair stays
    /// missing for as long as the two boxes keep overlapping; remove and re-add one
    /// of the handles once capacity is available to recover it.
    pub fn update_handle(
        &mut self,
        handle: u16,
        aabb_min: Vec3A,
        aabb_max: Vec3A,
    ) -> Result<(), BroadphaseError> {
        self.check_live(handle)?;
        debug_assert!(aabb_min.cmple(aabb_max).all(), "Invalid aabb min/max");

        let min = self.quantize(aabb_min, false);
        let max = self.quantize(aabb_max, true);

        for axis in 0..3 {
            let proxy = self.proxy(handle);
            let (min_edge, max_edge) = (proxy.min_edges[axis], proxy.max_edges[axis]);

            let axis_edges = &mut self.edges[axis];
            let dmin = i32::from(min[axis]) - i32::from(axis_edges[min_edge as usize].pos);
            let dmax = i32::from(max[axis]) - i32::from(axis_edges[max_edge as usize].pos);

            axis_edges[min_edge as usize].pos = min[axis];
            axis_edges[max_edge as usize].pos = max[axis];

            // expanding only adds overlaps
            if dmin < 0 {
                self.sort_min_down(axis, min_edge, true);
            }

            if dmax > 0 {
                self.sort_max_up(axis, max_edge, true);
            }

            // shrinking only removes overlaps
            if dmin > 0 {
                self.sort_min_up(axis, min_edge, true);
            }

            if dmax < 0 {
                self.sort_max_down(axis, max_edge, true);
            }
        }

        let settled = self.settle_dropped_pairs();
        self.debug_validate();

        settled
    }

    /// Tests the two handles for overlap on every axis except `ignore_axis`, using
    /// their edge indices. Index order is position order because every axis stays sorted.
    fn test_overlap(&self, ignore_axis: usize, handle_a: u16, handle_b: u16) -> bool {
        let a = self.proxy(handle_a);
        let b = self.proxy(handle_b);

        (0..3).filter(|&axis| axis != ignore_axis).all(|axis| {
            a.max_edges[axis] >= b.min_edges[axis] && b.max_edges[axis] >= a.min_edges[axis]
        })
    }

    /// Overlap of the two handles on all three axes.
    fn test_overlap_all(&self, handle_a: u16, handle_b: u16) -> bool {
        let a = self.proxy(handle_a);
        let b = self.proxy(handle_b);

        (0..3).all(|axis| {
            a.max_edges[axis] >= b.min_edges[axis] && b.max_edges[axis] >= a.min_edges[axis]
        })
    }

    fn add_overlapping_pair(&mut self, handle_a: u16, handle_b: u16) {
        if self.pair_cache.add_pair(handle_a, handle_b).is_err() {
            trace!("Pair cache full, deferring handles {handle_a} and {handle_b}");
            self.dropped_pairs.push((handle_a, handle_b));
        }
    }

    /// Retries every pair the cache turned away while edges were moving. A pair
    /// found mid-sort may only have overlapped while the handle's edges were half
    /// placed, and a slot it needed may have been freed by a later removal.
    fn settle_dropped_pairs(&mut self) -> Result<(), BroadphaseError> {
        let mut result = Ok(());

        for (handle_a, handle_b) in std::mem::take(&mut self.dropped_pairs) {
            if !self.test_overlap_all(handle_a, handle_b)
                || self.pair_cache.contains_pair(handle_a, handle_b)
            {
                continue;
            }

            if let Err(err) = self.pair_cache.add_pair(handle_a, handle_b) {
                warn!("Dropping overlap between handles {handle_a} and {handle_b}: {err}");
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }

        result
    }

    fn sort_min_down(&mut self, axis: usize, edge: u16, update_overlaps: bool) {
        let mut edge = edge as usize;
        let handle_edge = self.edges[axis][edge].handle;

        while self.edges[axis][edge].pos < self.edges[axis][edge - 1].pos {
            let prev = self.edges[axis][edge - 1];
            debug_assert_ne!(prev.handle, 0, "sorted past a sentinel");

            if prev.is_max() {
                // min passing a max on its way down: the intervals start overlapping here
                if update_overlaps && self.test_overlap(axis, handle_edge, prev.handle) {
                    self.add_overlapping_pair(handle_edge, prev.handle);
                }

                self.proxy_mut(prev.handle).max_edges[axis] += 1;
            } else {
                self.proxy_mut(prev.handle).min_edges[axis] += 1;
            }

            self.proxy_mut(handle_edge).min_edges[axis] -= 1;
            self.edges[axis].swap(edge, edge - 1);
            edge -= 1;
        }
    }

    fn sort_min_up(&mut self, axis: usize, edge: u16, update_overlaps: bool) {
        let mut edge = edge as usize;
        let handle_edge = self.edges[axis][edge].handle;

        while self.edges[axis][edge].pos > self.edges[axis][edge + 1].pos {
            let next = self.edges[axis][edge + 1];
            debug_assert_ne!(next.handle, 0, "sorted past a sentinel");

            if next.is_max() {
                // min passing a max on its way up: any overlap between the two ends here
                if update_overlaps {
                    self.pair_cache.remove_pair(handle_edge, next.handle);
                }

                self.proxy_mut(next.handle).max_edges[axis] -= 1;
            } else {
                self.proxy_mut(next.handle).min_edges[axis] -= 1;
            }

            self.proxy_mut(handle_edge).min_edges[axis] += 1;
            self.edges[axis].swap(edge, edge + 1);
            edge += 1;
        }
    }

    fn sort_max_down(&mut self, axis: usize, edge: u16, update_overlaps: bool) {
        let mut edge = edge as usize;
        let handle_edge = self.edges[axis][edge].handle;

        while self.edges[axis][edge].pos < self.edges[axis][edge - 1].pos {
            let prev = self.edges[axis][edge - 1];
            debug_assert_ne!(prev.handle, 0, "sorted past a sentinel");

            if prev.is_max() {
                self.proxy_mut(prev.handle).max_edges[axis] += 1;
            } else {
                // max passing a min on its way down: any overlap between the two ends here
                if update_overlaps {
                    self.pair_cache.remove_pair(handle_edge, prev.handle);
                }

                self.proxy_mut(prev.handle).min_edges[axis] += 1;
            }

            self.proxy_mut(handle_edge).max_edges[axis] -= 1;
            self.edges[axis].swap(edge, edge - 1);
            edge -= 1;
        }
    }

    fn sort_max_up(&mut self, axis: usize, edge: u16, update_overlaps: bool) {
        let mut edge = edge as usize;
        let handle_edge = self.edges[axis][edge].handle;

        while self.edges[axis][edge].pos > self.edges[axis][edge + 1].pos {
            let next = self.edges[axis][edge + 1];
            debug_assert_ne!(next.handle, 0, "sorted past a sentinel");

            if next.is_max() {
                self.proxy_mut(next.handle).max_edges[axis] -= 1;
            } else {
                // max passing a min on its way up: the intervals start overlapping here
                if update_overlaps && self.test_overlap(axis, handle_edge, next.handle) {
                    self.add_overlapping_pair(handle_edge, next.handle);
                }

                self.proxy_mut(next.handle).min_edges[axis] -= 1;
            }

            self.proxy_mut(handle_edge).max_edges[axis] += 1;
            self.edges[axis].swap(edge, edge + 1);
            edge += 1;
        }
    }

    /// Visits every live handle whose stored bounds overlap the quantized query box.
    pub fn aabb_test<T: BroadphaseAabbCallback + ?Sized>(
        &self,
        aabb_min: Vec3A,
        aabb_max: Vec3A,
        callback: &mut T,
    ) {
        let query_min = self.quantize(aabb_min, false);
        let query_max = self.quantize(aabb_max, true);

        for slot in &self.handles {
            let Slot::Live(proxy) = slot else {
                continue;
            };

            let Some((min, max)) = self.get_quantized_aabb(proxy.unique_id) else {
                continue;
            };

            if test_quantized_aabb_against_quantized_aabb(min, max, query_min, query_max)
                && !callback.process(proxy)
            {
                return;
            }
        }
    }

    #[inline]
    fn debug_validate(&self) {
        if cfg!(debug_assertions) {
            self.validate();
        }
    }

    /// Panics if an axis is out of order, an edge and its handle disagree about
    /// where the edge is, or the free list doesn't account for every free slot.
    pub fn validate(&self) {
        let num_edges = self.num_handles as usize * 2 + 2;

        for (axis, axis_edges) in self.edges.iter().enumerate() {
            let axis_edges = &axis_edges[..num_edges];

            assert_eq!(axis_edges[0], Edge { pos: 0, handle: 0 });
            assert_eq!(
                axis_edges[num_edges - 1],
                Edge {
                    pos: Self::SENTINEL_POS,
                    handle: 0
                }
            );

            for (i, pair) in axis_edges.windows(2).enumerate() {
                assert!(
                    pair[0].pos <= pair[1].pos,
                    "axis {axis} unsorted at edge {i}: {} > {}",
                    pair[0].pos,
                    pair[1].pos
                );
            }

            for (i, edge) in axis_edges.iter().enumerate().take(num_edges - 1).skip(1) {
                let proxy = self.proxy(edge.handle);
                let cached = if edge.is_max() {
                    proxy.max_edges[axis]
                } else {
                    proxy.min_edges[axis]
                };
                assert_eq!(
                    cached as usize, i,
                    "handle {} lost track of its edge on axis {axis}",
                    edge.handle
                );
            }
        }

        let mut num_free = 0;
        let mut next = self.first_free_handle;
        while next != 0 {
            let Slot::Free { next_free } = self.handles[next as usize] else {
                panic!("free list runs through non-free slot {next}");
            };
            num_free += 1;
            next = next_free;
        }

        assert_eq!(num_free + self.num_handles, self.max_handles - 1);
    }
}
