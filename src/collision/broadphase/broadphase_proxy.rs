/// Collision filter bits, combined into the 16-bit group and mask of a proxy.
pub struct CollisionFilterGroups;

impl CollisionFilterGroups {
    pub const DEFAULT: u16 = 1;
    pub const STATIC: u16 = 1 << 1;
    pub const KINEMATIC: u16 = 1 << 2;
    pub const DEBRIS: u16 = 1 << 3;
    pub const SENSOR_TRIGGER: u16 = 1 << 4;
    pub const CHARACTER: u16 = 1 << 5;
    pub const ALL: u16 = u16::MAX;
}

/// A live entry of the sweep-and-prune handle pool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BroadphaseProxy {
    pub unique_id: u16,
    /// Opaque client value, never interpreted by the broadphase
    pub owner: usize,
    pub collision_filter_group: u16,
    pub collision_filter_mask: u16,
    /// Current index of this proxy's min endpoint in each axis' edge list
    pub min_edges: [u16; 3],
    /// Current index of this proxy's max endpoint in each axis' edge list
    pub max_edges: [u16; 3],
}

/// An unordered pair of overlapping proxies, stored with `proxy0 < proxy1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BroadphasePair {
    pub proxy0: u16,
    pub proxy1: u16,
    /// Index of the client's narrow-phase algorithm for this pair, if any
    pub algorithm: Option<usize>,
}

impl BroadphasePair {
    #[inline]
    #[must_use]
    pub const fn new(proxy0: u16, proxy1: u16) -> Self {
        let (proxy0, proxy1) = Self::ordered(proxy0, proxy1);

        Self {
            proxy0,
            proxy1,
            algorithm: None,
        }
    }

    #[inline]
    pub(crate) const fn ordered(proxy0: u16, proxy1: u16) -> (u16, u16) {
        if proxy0 > proxy1 {
            (proxy1, proxy0)
        } else {
            (proxy0, proxy1)
        }
    }

    #[inline]
    pub(crate) const fn key(&self) -> (u16, u16) {
        (self.proxy0, self.proxy1)
    }

    #[inline]
    #[must_use]
    pub const fn contains(&self, proxy: u16) -> bool {
        self.proxy0 == proxy || self.proxy1 == proxy
    }
}

pub trait BroadphaseAabbCallback {
    /// Return `false` to stop the query.
    fn process(&mut self, proxy: &BroadphaseProxy) -> bool;
}

impl<F: FnMut(&BroadphaseProxy) -> bool> BroadphaseAabbCallback for F {
    fn process(&mut self, proxy: &BroadphaseProxy) -> bool {
        self(proxy)
    }
}
