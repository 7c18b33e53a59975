use ahash::AHashMap;
use log::trace;

use super::broadphase_proxy::{BroadphasePair, BroadphaseProxy};
use crate::{
    config::validate_max_overlaps,
    error::{BroadphaseError, CapacityResource},
};

pub trait OverlapCallback {
    /// Return `true` to remove the visited pair from the cache.
    fn process_overlap(&mut self, pair: &mut BroadphasePair) -> bool;
}

impl<F: FnMut(&mut BroadphasePair) -> bool> OverlapCallback for F {
    fn process_overlap(&mut self, pair: &mut BroadphasePair) -> bool {
        self(pair)
    }
}

/// Fixed-capacity registry of overlapping proxy pairs.
///
/// Pairs live in a flat array and are removed by swapping the last pair into the
/// freed slot, so indices into [`pairs`](Self::pairs) are only valid until the next
/// removal. The hash table maps each ordered id pair to its current array slot.
pub struct OverlappingPairCache {
    overlapping_pair_array: Vec<BroadphasePair>,
    hash_table: AHashMap<(u16, u16), usize>,
    max_overlaps: usize,
}

impl OverlappingPairCache {
    pub fn new(max_overlaps: usize) -> Result<Self, BroadphaseError> {
        validate_max_overlaps(max_overlaps)?;

        Ok(Self {
            overlapping_pair_array: Vec::with_capacity(max_overlaps),
            hash_table: AHashMap::with_capacity(max_overlaps),
            max_overlaps,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.overlapping_pair_array.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.overlapping_pair_array.is_empty()
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        self.max_overlaps
    }

    #[inline]
    pub fn pairs(&self) -> &[BroadphasePair] {
        &self.overlapping_pair_array
    }

    /// Stores a new pair. The caller guarantees no pair for `{proxy0, proxy1}` exists yet.
    pub fn add_pair(
        &mut self,
        proxy0: u16,
        proxy1: u16,
    ) -> Result<&mut BroadphasePair, BroadphaseError> {
        debug_assert_ne!(proxy0, proxy1, "a proxy can't overlap itself");
        debug_assert!(
            !self.contains_pair(proxy0, proxy1),
            "pair ({proxy0}, {proxy1}) is already stored"
        );

        if self.overlapping_pair_array.len() >= self.max_overlaps {
            return Err(BroadphaseError::CapacityExceeded {
                resource: CapacityResource::Overlaps,
                capacity: self.max_overlaps,
            });
        }

        let pair = BroadphasePair::new(proxy0, proxy1);
        let idx = self.overlapping_pair_array.len();
        self.hash_table.insert(pair.key(), idx);
        self.overlapping_pair_array.push(pair);

        trace!("add pair ({}, {})", pair.proxy0, pair.proxy1);

        Ok(&mut self.overlapping_pair_array[idx])
    }

    #[inline]
    fn find_pair_index(&self, proxy0: u16, proxy1: u16) -> Option<usize> {
        self.hash_table
            .get(&BroadphasePair::ordered(proxy0, proxy1))
            .copied()
    }

    pub fn find_pair(&self, proxy0: u16, proxy1: u16) -> Option<&BroadphasePair> {
        self.find_pair_index(proxy0, proxy1)
            .map(|idx| &self.overlapping_pair_array[idx])
    }

    pub fn find_pair_mut(&mut self, proxy0: u16, proxy1: u16) -> Option<&mut BroadphasePair> {
        self.find_pair_index(proxy0, proxy1)
            .map(|idx| &mut self.overlapping_pair_array[idx])
    }

    #[inline]
    pub fn contains_pair(&self, proxy0: u16, proxy1: u16) -> bool {
        self.hash_table
            .contains_key(&BroadphasePair::ordered(proxy0, proxy1))
    }

    fn remove_pair_at(&mut self, idx: usize) -> BroadphasePair {
        let pair = self.overlapping_pair_array.swap_remove(idx);
        self.hash_table.remove(&pair.key());

        if let Some(moved) = self.overlapping_pair_array.get(idx) {
            self.hash_table.insert(moved.key(), idx);
        }

        trace!("remove pair ({}, {})", pair.proxy0, pair.proxy1);

        pair
    }

    /// Removes the pair `{proxy0, proxy1}` if it is stored, returning it.
    pub fn remove_pair(&mut self, proxy0: u16, proxy1: u16) -> Option<BroadphasePair> {
        self.find_pair_index(proxy0, proxy1)
            .map(|idx| self.remove_pair_at(idx))
    }

    /// Removes every pair referencing `proxy` and returns how many were removed.
    pub fn remove_pairs_containing(&mut self, proxy: u16) -> usize {
        let mut num_removed = 0;

        // walk backwards so the pair swapped into a freed slot has already been checked
        for idx in (0..self.overlapping_pair_array.len()).rev() {
            if self.overlapping_pair_array[idx].contains(proxy) {
                self.remove_pair_at(idx);
                num_removed += 1;
            }
        }

        num_removed
    }

    /// Drops the narrow-phase algorithm of every pair referencing `proxy`, keeping the pairs.
    pub fn clean_proxy_from_pairs(&mut self, proxy: u16) {
        for pair in &mut self.overlapping_pair_array {
            if pair.contains(proxy) {
                pair.algorithm = None;
            }
        }
    }

    #[inline]
    pub const fn needs_collision(proxy0: &BroadphaseProxy, proxy1: &BroadphaseProxy) -> bool {
        (proxy0.collision_filter_group & proxy1.collision_filter_mask) != 0
            && (proxy1.collision_filter_group & proxy0.collision_filter_mask) != 0
    }

    pub fn process_all_overlapping_pairs<T: OverlapCallback>(&mut self, callback: &mut T) {
        let mut idx = 0;

        while idx < self.overlapping_pair_array.len() {
            if callback.process_overlap(&mut self.overlapping_pair_array[idx]) {
                self.remove_pair_at(idx);
            } else {
                idx += 1;
            }
        }
    }

    pub fn clear(&mut self) {
        self.overlapping_pair_array.clear();
        self.hash_table.clear();
    }
}
