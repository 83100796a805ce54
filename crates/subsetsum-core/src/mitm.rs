//! Meet-in-the-middle exact solver for small inputs.
//!
//! Splits the sorted entries into a larger-valued half A (size ⌈n/2⌉) and
//! the rest B, enumerates every subset of each half, and pairs them through
//! a sum-keyed map. Time and space are O(2^⌈n/2⌉).

use crate::cancel::{CancelToken, Interrupted, MITM_POLL_INTERVAL};
use crate::input::{Entry, Problem};
use crate::report::Combination;
use std::collections::HashMap;
use tracing::trace;

/// Largest input the solver accepts; keeps each half at ≤ 2^20 subsets.
pub const MAX_MITM_SIZE: usize = 40;

/// Find the first qualifying subset, or `None` when none exists.
///
/// B masks form the outer loop and both halves are enumerated in ascending
/// mask order, so the witness is deterministic: smallest B mask first, then
/// the smallest A mask that pairs with it.
pub fn find_first(problem: &Problem) -> Option<Combination> {
    search(problem, None).unwrap_or_else(|Interrupted| unreachable!("no token to raise"))
}

/// Like [`find_first`], checking `cancel` every [`MITM_POLL_INTERVAL`] masks
/// of either half.
pub fn find_first_with(problem: &Problem, cancel: &CancelToken) -> Result<Option<Combination>, Interrupted> {
    search(problem, Some(cancel))
}

fn poll(mask: usize, cancel: Option<&CancelToken>) -> Result<(), Interrupted> {
    if mask % MITM_POLL_INTERVAL == 0 && cancel.is_some_and(CancelToken::is_cancelled) {
        trace!(mask, "meet-in-the-middle interrupted");
        return Err(Interrupted);
    }
    Ok(())
}

fn search(problem: &Problem, cancel: Option<&CancelToken>) -> Result<Option<Combination>, Interrupted> {
    let n = problem.len();
    assert!(n <= MAX_MITM_SIZE, "meet-in-the-middle called with {} entries", n);

    let target = problem.target();
    let max_count = problem.max_count();
    let split = n.div_ceil(2);
    let (left, right) = problem.entries().split_at(split);

    // sum -> [(mask, count)], each list in ascending mask order
    let mut left_map: HashMap<u64, Vec<(u32, usize)>> = HashMap::new();
    for (mask, &sum) in half_sums(left).iter().enumerate() {
        poll(mask, cancel)?;
        let count = (mask as u32).count_ones() as usize;
        if sum <= target && count <= max_count {
            left_map.entry(sum).or_default().push((mask as u32, count));
        }
    }
    trace!(left = left.len(), right = right.len(), keys = left_map.len(), "mitm left half indexed");

    for (rmask, &rsum) in half_sums(right).iter().enumerate() {
        poll(rmask, cancel)?;
        let rcount = (rmask as u32).count_ones() as usize;
        if rsum > target || rcount > max_count {
            continue;
        }
        let Some(candidates) = left_map.get(&(target - rsum)) else {
            continue;
        };
        let hit = candidates.iter().find(|&&(_, lcount)| {
            let total = lcount + rcount;
            total >= problem.min_count() && total <= max_count
        });
        if let Some(&(lmask, _)) = hit {
            let mut entries = decode(left, lmask);
            entries.extend(decode(right, rmask as u32));
            return Ok(Some(Combination::from_entries(entries).verified(target)));
        }
    }

    Ok(None)
}

/// Sum of every subset of `half`, indexed by bit mask.
fn half_sums(half: &[Entry]) -> Vec<u64> {
    let size = 1usize << half.len();
    let mut sums = vec![0u64; size];
    for mask in 1..size {
        let low = mask.trailing_zeros() as usize;
        sums[mask] = sums[mask & (mask - 1)] + half[low].value;
    }
    sums
}

fn decode(half: &[Entry], mask: u32) -> Vec<Entry> {
    half.iter()
        .enumerate()
        .filter(|&(bit, _)| mask & (1 << bit) != 0)
        .map(|(_, &e)| e)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SearchParams;

    fn problem(nums: &[u64], target: i64, min: usize, max: usize) -> Problem {
        Problem::from_values(nums, SearchParams::new(target, min, max)).unwrap()
    }

    #[test]
    fn test_half_sums() {
        let half = [
            Entry { index: 0, value: 5 },
            Entry { index: 1, value: 3 },
        ];
        assert_eq!(half_sums(&half), vec![0, 5, 3, 8]);
    }

    #[test]
    fn test_finds_simple_witness() {
        let p = problem(&[1, 2, 3, 4, 5], 9, 2, 3);
        let combo = find_first(&p).unwrap();
        assert_eq!(combo.sum, 9);
        assert!(combo.len() >= 2 && combo.len() <= 3);
    }

    #[test]
    fn test_first_witness_is_deterministic() {
        // Sorted: [5(4), 4(3), 3(2) | 2(1), 1(0)]. B mask 0 pairs with A = {5}.
        let p = problem(&[1, 2, 3, 4, 5], 5, 1, 5);
        let combo = find_first(&p).unwrap();
        assert_eq!(combo.indices, vec![4]);
        assert_eq!(combo.values, vec![5]);
    }

    #[test]
    fn test_respects_count_bounds() {
        // Only {2,3} and {1,4} have two elements
        let p = problem(&[1, 2, 3, 4, 5], 5, 2, 2);
        let combo = find_first(&p).unwrap();
        assert_eq!(combo.len(), 2);
        assert_eq!(combo.sum, 5);
    }

    #[test]
    fn test_exact_single() {
        let p = problem(&[100, 200, 300], 200, 1, 1);
        let combo = find_first(&p).unwrap();
        assert_eq!(combo.indices, vec![1]);
        assert_eq!(combo.values, vec![200]);
    }

    #[test]
    fn test_no_solution() {
        assert!(find_first(&problem(&[10, 20, 30], 5, 1, 3)).is_none());
        assert!(find_first(&problem(&[2, 4, 6, 8], 7, 1, 4)).is_none());
    }

    #[test]
    fn test_large_magnitudes() {
        let p = problem(
            &[
                1_000_000_000_000,
                500_000_000_000,
                250_000_000_000,
                125_000_000_000,
                375_000_000_000,
            ],
            875_000_000_000,
            2,
            4,
        );
        let combo = find_first(&p).unwrap();
        assert_eq!(combo.sum, 875_000_000_000);
    }

    #[test]
    fn test_full_size_input() {
        let nums: Vec<u64> = (1..=40).collect();
        let p = problem(&nums, 777, 20, 40);
        let combo = find_first(&p).unwrap();
        assert_eq!(combo.sum, 777);
        assert!(combo.len() >= 20);
    }

    #[test]
    fn test_empty_subset_for_zero_target() {
        let combo = find_first(&problem(&[3, 4], 0, 0, 2)).unwrap();
        assert!(combo.is_empty());
        assert_eq!(combo.sum, 0);
    }

    #[test]
    fn test_raised_token_stops_search() {
        let p = problem(&[1, 2, 3, 4, 5], 5, 1, 5);
        let cancel = CancelToken::new();
        assert_eq!(find_first_with(&p, &cancel).unwrap().unwrap().indices, vec![4]);

        cancel.cancel();
        assert_eq!(find_first_with(&p, &cancel), Err(Interrupted));
    }
}
