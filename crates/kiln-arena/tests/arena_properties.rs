//! Property tests for bump allocation, exhaustion, and scratch restore.
//!
//! Covers the allocator contract end to end through the public API:
//! non-overlapping zeroed regions, strict-capacity rejection with no state
//! change, exact restore across scratch regions (flat and nested), and
//! reset idempotence.

use kiln_arena::{ArenaError, ByteAlloc, FixedArena};
use proptest::prelude::*;

/// Walkthrough: 64-byte arena, push/scratch/push/fail/end/push.
#[test]
fn sixty_four_byte_walkthrough() {
    let mut arena = FixedArena::with_capacity(64).unwrap();

    let a = arena.push(20).expect("region A");
    assert_eq!(arena.used(), 20);

    let mark = arena.begin_scratch();
    let b = arena.push(30).expect("region B");
    assert_eq!(arena.used(), 50);
    assert!(!a.overlaps(&b));

    assert!(arena.push(20).is_none(), "50 + 20 >= 64 must fail");
    assert_eq!(arena.used(), 50);

    arena.end_scratch(mark);
    assert_eq!(arena.used(), 20);

    assert!(arena.push(40).is_some(), "20 + 40 < 64 must succeed");
    assert_eq!(arena.used(), 60);
    assert_eq!(arena.bytes(&a).unwrap().len(), 20);
}

#[test]
fn released_arena_reports_released() {
    let mut arena = FixedArena::with_capacity(32).unwrap();
    arena.release();
    assert_eq!(arena.try_push(1), Err(ArenaError::Released));
}

fn assert_pairwise_disjoint(regions: &[ByteAlloc]) -> Result<(), TestCaseError> {
    for (i, a) in regions.iter().enumerate() {
        for b in &regions[i + 1..] {
            prop_assert!(!a.overlaps(b), "{a} overlaps {b}");
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn pushes_within_headroom_are_disjoint_exact_and_zeroed(
        sizes in proptest::collection::vec(0usize..64, 0..32),
        dirty in any::<u8>(),
    ) {
        let capacity = sizes.iter().sum::<usize>() + sizes.len() + 1;
        let mut memory = vec![dirty; capacity];
        let mut arena = FixedArena::from_block(&mut memory[..]);

        let mut regions = Vec::with_capacity(sizes.len());
        for &size in &sizes {
            let region = arena.push(size);
            prop_assert!(region.is_some());
            let region = region.unwrap();
            prop_assert_eq!(region.len(), size);
            prop_assert!(arena.bytes(&region).unwrap().iter().all(|&b| b == 0));
            regions.push(region);
        }
        assert_pairwise_disjoint(&regions)?;
    }

    #[test]
    fn failed_push_leaves_used_unchanged(
        capacity in 2usize..512,
        prefill in 0usize..512,
        size in 0usize..1024,
    ) {
        let mut arena = FixedArena::with_capacity(capacity).unwrap();
        let prefill = prefill.min(capacity - 1);
        arena.push(prefill).unwrap();
        let before = arena.used();

        let result = arena.push(size);
        if before + size >= capacity {
            prop_assert!(result.is_none());
            prop_assert_eq!(arena.used(), before);
        } else {
            prop_assert!(result.is_some());
            prop_assert_eq!(arena.used(), before + size);
        }
    }

    #[test]
    fn scratch_round_trip_restores_exactly(
        prefill in 0usize..128,
        inner in proptest::collection::vec(0usize..200, 0..16),
    ) {
        let mut arena = FixedArena::with_capacity(1024).unwrap();
        arena.push(prefill).unwrap();
        let before = arena.used();

        let mark = arena.begin_scratch();
        for &size in &inner {
            // Failures are fine; the restore must be exact either way.
            let _ = arena.push(size);
        }
        arena.end_scratch(mark);
        prop_assert_eq!(arena.used(), before);
    }

    #[test]
    fn nested_scratch_restores_each_level(
        outer_sizes in proptest::collection::vec(1usize..32, 0..8),
        inner_sizes in proptest::collection::vec(1usize..32, 0..8),
    ) {
        let mut arena = FixedArena::with_capacity(1024).unwrap();
        arena.push(7).unwrap();
        let pre_a = arena.used();

        let a = arena.begin_scratch();
        for &s in &outer_sizes {
            arena.push(s).unwrap();
        }
        let pre_b = arena.used();

        let b = arena.begin_scratch();
        for &s in &inner_sizes {
            arena.push(s).unwrap();
        }
        prop_assert!(arena.check_scratch(&a).is_err());

        arena.end_scratch(b);
        prop_assert_eq!(arena.used(), pre_b);
        arena.end_scratch(a);
        prop_assert_eq!(arena.used(), pre_a);
    }

    #[test]
    fn reset_is_idempotent_and_frees_everything(
        capacity in 2usize..256,
        fills in proptest::collection::vec(0usize..64, 0..8),
    ) {
        let mut arena = FixedArena::with_capacity(capacity).unwrap();
        for &f in &fills {
            let _ = arena.push(f);
        }
        arena.reset();
        prop_assert_eq!(arena.used(), 0);
        arena.reset();
        prop_assert_eq!(arena.used(), 0);
        prop_assert!(arena.push(capacity - 1).is_some());
    }
}
