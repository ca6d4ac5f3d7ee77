//! Link table compaction: `freeze`/`melt`.
//!
//! A user-supplied link is stored alongside its canonical dual the moment
//! it is appended (so the Pool's raw link list is already closed under
//! `(from,to) -> (rev(to), rev(from))`); `freeze` only has to sort it by
//! source gid and compact it into per-vertex slices.

use crate::error::GraphResult;
use crate::section::Gid;
use crate::sort::{build_prefix_buckets, sort_by_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkRaw {
    pub from: Gid,
    pub to: Gid,
}

/// Result of compacting a Pool's raw link list into Archive form.
pub struct CompactedLinks {
    /// Destination gids only, grouped contiguously by source gid.
    pub table: Vec<Gid>,
    /// Prefix-bucket array of length `2*num_gid_sections + 1`:
    /// `gid_offsets[g]` is the index in `table` where gid `g`'s forward
    /// edges begin; `gid_offsets[g+1]` is where they end. This is the
    /// "two half-records per section, 2N+1 entries indexed by gid" trick,
    /// built with the same prefix-bucket helper the k-mer index uses.
    pub gid_offsets: Vec<u32>,
}

/// `num_gid_sections` must include the tail sentinel (so the gid universe
/// is `2 * num_gid_sections`).
pub fn freeze(
    mut links: Vec<LinkRaw>,
    num_threads: usize,
    num_gid_sections: u32,
) -> GraphResult<CompactedLinks> {
    sort_by_key(&mut links, num_threads, |l| l.from as u64)?;

    let universe = 2u64 * num_gid_sections as u64;
    let gid_offsets = build_prefix_buckets(links.iter().map(|l| l.from as u64), universe)?;

    // Project (from, to) down to just `to`: the source array is already
    // sorted by `from`, so the destination order is exactly the order the
    // bucket boundaries above describe.
    let table = links.into_iter().map(|l| l.to).collect();

    Ok(CompactedLinks { table, gid_offsets })
}

/// Inverse of `freeze`: re-expand a compacted `(to)`-only table back into
/// `(from, to)` pairs by scanning the gid offsets. The result is a
/// permutation of the original link list, not necessarily in the original
/// insertion order.
pub fn melt(compacted: &CompactedLinks) -> Vec<LinkRaw> {
    let mut out = Vec::with_capacity(compacted.table.len());
    let num_gids = compacted.gid_offsets.len() - 1;
    for gid in 0..num_gids {
        let start = compacted.gid_offsets[gid] as usize;
        let end = compacted.gid_offsets[gid + 1] as usize;
        for &to in &compacted.table[start..end] {
            out.push(LinkRaw { from: gid as Gid, to });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::gid_of;

    fn dual(l: LinkRaw) -> LinkRaw {
        LinkRaw { from: l.to ^ 1, to: l.from ^ 1 }
    }

    #[test]
    fn freeze_groups_edges_contiguously_by_source_gid() {
        // sec0 -> sec1, plus its mandatory dual, plus one tail sentinel (sec2).
        let l0 = LinkRaw { from: gid_of(0, false), to: gid_of(1, false) };
        let links = vec![l0, dual(l0)];
        let compacted = freeze(links, 0, 3).unwrap();

        let sec0_fwd = gid_of(0, false) as usize;
        let start = compacted.gid_offsets[sec0_fwd] as usize;
        let end = compacted.gid_offsets[sec0_fwd + 1] as usize;
        assert_eq!(&compacted.table[start..end], &[gid_of(1, false)]);

        let sec1_rev = gid_of(1, true) as usize;
        let start = compacted.gid_offsets[sec1_rev] as usize;
        let end = compacted.gid_offsets[sec1_rev + 1] as usize;
        assert_eq!(&compacted.table[start..end], &[gid_of(0, true)]);
    }

    #[test]
    fn sentinel_boundary_is_contiguous_with_the_previous_section() {
        let l0 = LinkRaw { from: gid_of(0, false), to: gid_of(1, false) };
        let links = vec![l0, dual(l0)];
        let compacted = freeze(links, 0, 3).unwrap();
        // sec1.rv_link_base == sec2(sentinel).fw_link_base, i.e. gid 3 == gid 4 boundary.
        assert_eq!(compacted.gid_offsets[3], compacted.gid_offsets[4]);
    }

    #[test]
    fn melt_recovers_the_original_multiset() {
        let l0 = LinkRaw { from: gid_of(0, false), to: gid_of(1, false) };
        let l1 = LinkRaw { from: gid_of(1, false), to: gid_of(2, false) };
        let mut original = vec![l0, dual(l0), l1, dual(l1)];
        let compacted = freeze(original.clone(), 0, 4).unwrap();
        let mut recovered = melt(&compacted);

        let sort_key = |l: &LinkRaw| (l.from, l.to);
        original.sort_by_key(sort_key);
        recovered.sort_by_key(sort_key);
        assert_eq!(original, recovered);
    }
}
