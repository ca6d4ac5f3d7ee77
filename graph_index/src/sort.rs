//! A key-sort helper, plus the prefix-bucket construction that both link
//! compaction and the k-mer index build on top of a sorted key.
//!
//! A production build of this would delegate to a parallel radix sort and
//! pass it a thread-count hint; this crate's own parallelism budget is
//! zero (the core runs single-threaded). `num_threads` is accepted for
//! interface parity with `init`'s configuration surface and logged, but
//! this implementation always sorts on the calling thread.

use crate::error::{GraphError, GraphResult};
use log::debug;

/// Sort `items` by the `u64` key `key_of` extracts, in place.
/// Returns `SortFailure` only in the (currently unreachable) case that a
/// future backend reports one; kept fallible so callers don't have to
/// change if this is ever swapped for a real external sorter.
pub fn sort_by_key<T, F>(items: &mut [T], num_threads: usize, key_of: F) -> GraphResult<()>
where
    F: Fn(&T) -> u64,
{
    debug!(
        "sorting {} items by key (thread hint = {})",
        items.len(),
        num_threads
    );
    items.sort_unstable_by_key(key_of);
    Ok(())
}

/// Build a prefix-bucket array of size `universe + 1` from a *sorted*
/// stream of keys (already-ascending `u64` values at most `universe - 1`).
/// `bucket[v]` is the number of keys strictly less than `v` — the same
/// shared invariant both the k-mer bucket array and the per-gid link
/// offsets rely on.
///
/// Returns `OutOfMemory` if the bucket array itself cannot be allocated.
pub fn build_prefix_buckets(
    sorted_keys: impl Iterator<Item = u64>,
    universe: u64,
) -> GraphResult<Vec<u32>> {
    let mut buckets = Vec::new();
    buckets
        .try_reserve((universe + 1) as usize)
        .map_err(|_| GraphError::OutOfMemory("prefix bucket array"))?;
    buckets.resize((universe + 1) as usize, 0u32);

    let mut count = 0u32;
    let mut next_boundary = 0u64;
    for key in sorted_keys {
        debug_assert!(key >= next_boundary || count == 0, "keys must be presented sorted");
        while next_boundary <= key {
            buckets[next_boundary as usize] = count;
            next_boundary += 1;
        }
        count += 1;
    }
    while next_boundary <= universe {
        buckets[next_boundary as usize] = count;
        next_boundary += 1;
    }
    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_ascending_by_key() {
        let mut items = vec![(3u64, 'c'), (1, 'a'), (2, 'b')];
        sort_by_key(&mut items, 0, |(k, _)| *k).unwrap();
        assert_eq!(items, vec![(1, 'a'), (2, 'b'), (3, 'c')]);
    }

    #[test]
    fn prefix_buckets_are_monotonic_and_total_at_the_end() {
        let keys = vec![0u64, 0, 2, 2, 2, 4];
        let buckets = build_prefix_buckets(keys.iter().copied(), 5).unwrap();
        assert_eq!(buckets, vec![0, 2, 2, 2, 5, 6]);
        for w in buckets.windows(2) {
            assert!(w[0] <= w[1]);
        }
        assert_eq!(*buckets.last().unwrap(), keys.len() as u32);
    }

    #[test]
    fn empty_key_stream_fills_all_buckets_with_zero() {
        let buckets = build_prefix_buckets(std::iter::empty(), 3).unwrap();
        assert_eq!(buckets, vec![0, 0, 0, 0]);
    }
}
