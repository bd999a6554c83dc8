//! Benchmark profiles for the Kiln transient arena.
//!
//! - [`setup_push_sizes`]: deterministic push sizes shaped like renderer
//!   setup traffic (small descriptors, occasional name tables)
//! - [`setup_arena`]: an owned arena sized for a profile

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use kiln_arena::{ArenaError, FixedArena};

/// Generate `n` push sizes from `seed`.
///
/// Roughly one in eight is a 256-byte-per-entry name table; the rest are
/// descriptor arrays of 8 to 64 bytes.
pub fn setup_push_sizes(n: usize, seed: u64) -> Vec<usize> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let r = (state >> 33) as usize;
            if r % 8 == 0 {
                256 * (1 + r % 4)
            } else {
                8 * (1 + r % 8)
            }
        })
        .collect()
}

/// Owned arena with room for every size in `sizes` at once.
pub fn setup_arena(sizes: &[usize]) -> Result<FixedArena<'static>, ArenaError> {
    FixedArena::with_capacity(sizes.iter().sum::<usize>() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_are_deterministic() {
        assert_eq!(setup_push_sizes(64, 42), setup_push_sizes(64, 42));
        assert_ne!(setup_push_sizes(64, 42), setup_push_sizes(64, 43));
    }

    #[test]
    fn sizes_stay_in_profile() {
        for size in setup_push_sizes(1000, 7) {
            assert!((8..=1024).contains(&size), "size {size} out of profile");
        }
    }

    #[test]
    fn profile_fits_its_arena() {
        let sizes = setup_push_sizes(200, 1);
        let mut arena = setup_arena(&sizes).unwrap();
        for &size in &sizes {
            assert!(arena.push(size).is_some());
        }
    }
}
