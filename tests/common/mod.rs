#![allow(dead_code)]

use std::collections::BTreeSet;

use sweep_prune::{
    AxisSweep3, CollisionFilterGroups,
    glam::Vec3A,
    linear_math::aabb_util_2::test_quantized_aabb_against_quantized_aabb,
};

pub const ALL: u16 = CollisionFilterGroups::ALL;

pub fn init() {
    let _ = sweep_prune::logging::try_init();
}

pub fn v(x: f32, y: f32, z: f32) -> Vec3A {
    Vec3A::new(x, y, z)
}

/// World `[(0,0,0), (100,100,100)]` with 8 handle slots and 8 overlaps.
pub fn small_world() -> AxisSweep3 {
    init();
    AxisSweep3::with_bounds(Vec3A::ZERO, Vec3A::splat(100.), 8, 8).unwrap()
}

pub fn add(sweep: &mut AxisSweep3, min: Vec3A, max: Vec3A, owner: usize) -> u16 {
    sweep.add_handle(min, max, owner, ALL, ALL).unwrap()
}

pub fn pair_set(sweep: &AxisSweep3) -> BTreeSet<(u16, u16)> {
    let set: BTreeSet<_> = sweep
        .overlapping_pairs()
        .iter()
        .map(|pair| (pair.proxy0.min(pair.proxy1), pair.proxy0.max(pair.proxy1)))
        .collect();

    assert_eq!(
        set.len(),
        sweep.overlapping_pairs().len(),
        "pair cache holds duplicates"
    );

    set
}

/// Every edge list is sorted by position and framed by the two sentinels.
pub fn assert_sorted(sweep: &AxisSweep3) {
    for axis in 0..3 {
        let edges = sweep.edges(axis);
        assert_eq!(edges.len(), sweep.num_handles() * 2 + 2);
        assert_eq!(edges[0].handle, 0);
        assert_eq!(edges[0].pos, 0);
        assert_eq!(edges[edges.len() - 1].handle, 0);
        assert_eq!(edges[edges.len() - 1].pos, 0xffff);

        for pair in edges.windows(2) {
            assert!(
                pair[0].pos <= pair[1].pos,
                "axis {axis} is out of order: {:?}",
                edges
            );
        }
    }
}

/// All overlapping pairs of `live`, found by testing every combination.
pub fn brute_force_pairs(sweep: &AxisSweep3, live: &[u16]) -> BTreeSet<(u16, u16)> {
    let mut pairs = BTreeSet::new();

    for (i, &a) in live.iter().enumerate() {
        let (a_min, a_max) = sweep.get_quantized_aabb(a).unwrap();
        for &b in &live[i + 1..] {
            let (b_min, b_max) = sweep.get_quantized_aabb(b).unwrap();
            if test_quantized_aabb_against_quantized_aabb(a_min, a_max, b_min, b_max) {
                pairs.insert((a.min(b), a.max(b)));
            }
        }
    }

    pairs
}

pub fn assert_consistent(sweep: &AxisSweep3, live: &[u16]) {
    sweep.validate();
    assert_sorted(sweep);
    assert_eq!(pair_set(sweep), brute_force_pairs(sweep, live));
}
