mod common;

use common::*;
use rand::{Rng, SeedableRng, rngs::StdRng};
use sweep_prune::{AxisSweep3, glam::Vec3A};

const WORLD: f32 = 100.;

fn random_box(rng: &mut StdRng, max_extent: f32) -> (Vec3A, Vec3A) {
    // a margin past the world on both sides exercises clamping
    let min = Vec3A::new(
        rng.gen_range(-10.0..WORLD),
        rng.gen_range(-10.0..WORLD),
        rng.gen_range(-10.0..WORLD),
    );
    let extent = Vec3A::new(
        rng.gen_range(0.0..max_extent),
        rng.gen_range(0.0..max_extent),
        rng.gen_range(0.0..max_extent),
    );

    (min, min + extent)
}

/// Boxes snapped to a coarse grid, so endpoints frequently coincide.
fn grid_box(rng: &mut StdRng) -> (Vec3A, Vec3A) {
    let cell = |rng: &mut StdRng| rng.gen_range(0..10) as f32 * 10.;
    let min = Vec3A::new(cell(rng), cell(rng), cell(rng));
    let size = Vec3A::new(
        rng.gen_range(0..3) as f32 * 10.,
        rng.gen_range(0..3) as f32 * 10.,
        rng.gen_range(0..3) as f32 * 10.,
    );

    (min, min + size)
}

fn nudge(rng: &mut StdRng, sweep: &AxisSweep3, handle: u16) -> (Vec3A, Vec3A) {
    let aabb = sweep.get_aabb(handle).unwrap();
    let shift = Vec3A::new(
        rng.gen_range(-3.0..3.0),
        rng.gen_range(-3.0..3.0),
        rng.gen_range(-3.0..3.0),
    );
    let grow = Vec3A::new(
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
    );

    let min = aabb.min + shift - grow;
    let max = (aabb.max + shift + grow).max(min);
    (min, max)
}

fn run_interleaving(seed: u64, steps: usize, use_grid: bool) {
    init();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sweep = AxisSweep3::with_bounds(Vec3A::ZERO, Vec3A::splat(WORLD), 48, 4096).unwrap();
    let mut live: Vec<u16> = Vec::new();

    for step in 0..steps {
        let roll = rng.gen_range(0..100);

        if live.is_empty() || (roll < 30 && live.len() < sweep.max_handles() - 1) {
            let (min, max) = if use_grid {
                grid_box(&mut rng)
            } else {
                random_box(&mut rng, 25.)
            };
            let handle = add(&mut sweep, min, max, step);
            assert!(!live.contains(&handle), "step {step}: id {handle} handed out twice");
            live.push(handle);
        } else if roll < 45 {
            let handle = live.swap_remove(rng.gen_range(0..live.len()));
            sweep.remove_handle(handle).unwrap();
            assert!(
                sweep.overlapping_pairs().iter().all(|pair| !pair.contains(handle)),
                "step {step}: pairs of removed handle {handle} survived"
            );
        } else {
            let handle = live[rng.gen_range(0..live.len())];
            let (min, max) = if use_grid {
                grid_box(&mut rng)
            } else if roll < 85 {
                nudge(&mut rng, &sweep, handle)
            } else {
                // teleport
                random_box(&mut rng, 40.)
            };
            sweep.update_handle(handle, min, max).unwrap();

            let (q_min, q_max) = sweep.get_quantized_aabb(handle).unwrap();
            assert_eq!(q_min, sweep.quantize(min, false));
            assert_eq!(q_max, sweep.quantize(max, true));
        }

        assert_consistent(&sweep, &live);
    }
}

#[test]
fn random_interleavings_match_brute_force() {
    for seed in 0..8 {
        run_interleaving(seed, 400, false);
    }
}

#[test]
fn coincident_endpoints_match_brute_force() {
    for seed in 100..106 {
        run_interleaving(seed, 300, true);
    }
}

#[test]
fn dense_insertion_finds_every_pair_once() {
    init();

    for seed in 200..210 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sweep =
            AxisSweep3::with_bounds(Vec3A::ZERO, Vec3A::splat(WORLD), 64, 4096).unwrap();
        let mut live = Vec::new();

        // everything crammed into one corner so nearly every box overlaps the others
        for owner in 0..63 {
            let min = Vec3A::new(
                rng.gen_range(0.0..20.0),
                rng.gen_range(0.0..20.0),
                rng.gen_range(0.0..20.0),
            );
            let max = min + Vec3A::splat(rng.gen_range(5.0..15.0));
            live.push(add(&mut sweep, min, max, owner));
            assert_consistent(&sweep, &live);
        }

        assert!(sweep.overlapping_pairs().len() > live.len());

        while let Some(handle) = live.pop() {
            sweep.remove_handle(handle).unwrap();
            assert_consistent(&sweep, &live);
        }

        assert!(sweep.overlapping_pairs().is_empty());
        assert_eq!(sweep.num_handles(), 0);
    }
}

#[test]
fn identical_boxes_pair_with_each_other() {
    init();
    let mut sweep = AxisSweep3::with_bounds(Vec3A::ZERO, Vec3A::splat(WORLD), 32, 1024).unwrap();

    let live: Vec<_> = (0..20)
        .map(|owner| add(&mut sweep, Vec3A::splat(40.), Vec3A::splat(60.), owner))
        .collect();

    assert_eq!(sweep.overlapping_pairs().len(), 20 * 19 / 2);
    assert_consistent(&sweep, &live);
}
