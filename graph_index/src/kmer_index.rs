//! The k-mer index: projects the walker's `(kmer, gid, pos)` stream into
//! an O(1)-matchable structure.
//!
//! `IndexMode::Hash` builds a minimal perfect hash function over the
//! distinct k-mer set with `boomphf` — already a `fasta_reader`
//! dependency in this workspace, carried but never actually called there —
//! rather than a `4^k`-sized dense array: k can be as large as 32, and
//! `4^32` entries is not an array anyone allocates. `IndexMode::IterOnly`
//! skips building a
//! hash structure at all and matches by binary search over the sorted
//! distinct-key table, which is the natural reading of "iteration only, no
//! persistent hash" for a structure that is still, underneath, a sorted
//! table.

use crate::error::{GraphError, GraphResult};
use crate::params::IndexMode;
use crate::section::Gid;
use crate::sort::sort_by_key;
use boomphf::Mphf;
use log::debug;

/// A single k-mer's occurrence, stripped of the k-mer value itself (the
/// caller already knows it — it is the lookup key).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub gid: Gid,
    pub pos: u32,
}

pub struct KmerIndex {
    k: usize,
    mode: IndexMode,
    /// Sorted, de-duplicated k-mer values.
    distinct_kmers: Vec<u64>,
    /// Prefix-bucket offsets into `postings`, parallel to `distinct_kmers`
    /// plus one trailing total (len `distinct_kmers.len() + 1`).
    offsets: Vec<u32>,
    postings: Vec<Hit>,
    /// `Some` only in `Hash` mode: maps an MPHF-assigned index to its rank
    /// in `distinct_kmers`/`offsets` (the MPHF's own bijection need not
    /// agree with sorted order).
    mphf: Option<Mphf<u64>>,
    rank_of_hash: Vec<u32>,
}

/// Consume every tuple a [`crate::walker::KmerWalker`] produces and build
/// the index from it. Propagates the first error the walker raises,
/// leaving no partial index behind on failure.
pub fn build_index<I>(tuples: I, k: usize, mode: IndexMode) -> GraphResult<KmerIndex>
where
    I: IntoIterator<Item = GraphResult<(u64, Gid, u32)>>,
{
    let mut all: Vec<(u64, Gid, u32)> = Vec::new();
    for item in tuples {
        all.push(item?);
    }
    debug!("k-mer walk produced {} tuples", all.len());

    sort_by_key(&mut all, 0, |(kmer, _, _)| *kmer)?;

    let mut distinct_kmers: Vec<u64> = Vec::new();
    let mut counts: Vec<u32> = Vec::new();
    let mut postings: Vec<Hit> = Vec::with_capacity(all.len());
    for &(kmer, gid, pos) in &all {
        postings.push(Hit { gid, pos });
        if distinct_kmers.last() == Some(&kmer) {
            *counts.last_mut().unwrap() += 1;
        } else {
            distinct_kmers.push(kmer);
            counts.push(1);
        }
    }

    let mut offsets = Vec::with_capacity(distinct_kmers.len() + 1);
    let mut running = 0u32;
    offsets.push(0);
    for c in &counts {
        running += c;
        offsets.push(running);
    }

    let (mphf, rank_of_hash) = match mode {
        IndexMode::Hash if !distinct_kmers.is_empty() => {
            let mphf = Mphf::new(1.7, &distinct_kmers);
            let mut rank_of_hash = vec![0u32; distinct_kmers.len()];
            for (rank, key) in distinct_kmers.iter().enumerate() {
                let h = mphf.hash(key) as usize;
                rank_of_hash[h] = rank as u32;
            }
            (Some(mphf), rank_of_hash)
        }
        _ => (None, Vec::new()),
    };

    Ok(KmerIndex {
        k,
        mode,
        distinct_kmers,
        offsets,
        postings,
        mphf,
        rank_of_hash,
    })
}

impl KmerIndex {
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn mode(&self) -> IndexMode {
        self.mode
    }

    pub fn distinct_kmer_count(&self) -> usize {
        self.distinct_kmers.len()
    }

    /// The largest number of occurrences any single distinct k-mer has —
    /// `max(offsets[v+1] - offsets[v])` over the bucket array.
    pub fn max_occurrence(&self) -> usize {
        self.offsets
            .windows(2)
            .map(|w| (w[1] - w[0]) as usize)
            .max()
            .unwrap_or(0)
    }

    /// Resolve a packed k-mer to its rank in `distinct_kmers`, or `None`
    /// if it was never observed by the walk.
    fn rank_of(&self, kmer: u64) -> Option<usize> {
        match (&self.mphf, self.mode) {
            (Some(mphf), _) => {
                let h = mphf.try_hash(&kmer)? as usize;
                let rank = *self.rank_of_hash.get(h)? as usize;
                if self.distinct_kmers.get(rank) == Some(&kmer) {
                    Some(rank)
                } else {
                    None
                }
            }
            (None, _) => self.distinct_kmers.binary_search(&kmer).ok(),
        }
    }

    /// O(1) in `Hash` mode (one MPHF evaluation plus a verifying
    /// comparison), O(log n) in `IterOnly` mode.
    pub fn match_packed(&self, kmer: u64) -> &[Hit] {
        match self.rank_of(kmer) {
            Some(rank) => {
                let start = self.offsets[rank] as usize;
                let end = self.offsets[rank + 1] as usize;
                &self.postings[start..end]
            }
            None => &[],
        }
    }

    /// Encode an ASCII k-mer (length must equal `k`) and match it.
    pub fn match_ascii(&self, bases: &[u8]) -> GraphResult<&[Hit]> {
        if bases.len() != self.k {
            return Err(GraphError::BadParam("match_ascii: wrong k-mer length"));
        }
        let mut kmer = 0u64;
        for (i, &b) in bases.iter().enumerate() {
            let code = crate::iupac::ascii_to_two_bit(b);
            kmer |= (code as u64) << (2 * i);
        }
        Ok(self.match_packed(kmer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::gid_of;

    fn tuple(kmer: u64, gid: Gid, pos: u32) -> GraphResult<(u64, Gid, u32)> {
        Ok((kmer, gid, pos))
    }

    #[test]
    fn hash_mode_matches_every_distinct_kmer() {
        let g0 = gid_of(0, false);
        let tuples = vec![
            tuple(5, g0, 0),
            tuple(9, g0, 1),
            tuple(5, g0, 4),
            tuple(2, g0, 9),
        ];
        let index = build_index(tuples, 3, IndexMode::Hash).unwrap();
        assert_eq!(index.distinct_kmer_count(), 3);
        assert_eq!(index.max_occurrence(), 2); // kmer 5 occurs twice

        let mut hits: Vec<u32> = index.match_packed(5).iter().map(|h| h.pos).collect();
        hits.sort();
        assert_eq!(hits, vec![0, 4]);
        assert_eq!(index.match_packed(9).len(), 1);
        assert_eq!(index.match_packed(2).len(), 1);
        assert!(index.match_packed(1234).is_empty());
    }

    #[test]
    fn iter_only_mode_matches_via_binary_search() {
        let g0 = gid_of(0, false);
        let tuples = vec![tuple(7, g0, 0), tuple(3, g0, 1)];
        let index = build_index(tuples, 3, IndexMode::IterOnly).unwrap();
        assert_eq!(index.match_packed(7).len(), 1);
        assert_eq!(index.match_packed(3).len(), 1);
        assert!(index.match_packed(999).is_empty());
    }

    #[test]
    fn match_ascii_rejects_the_wrong_length() {
        let tuples: Vec<GraphResult<(u64, Gid, u32)>> = vec![];
        let index = build_index(tuples, 4, IndexMode::Hash).unwrap();
        assert!(matches!(index.match_ascii(b"ACG"), Err(GraphError::BadParam(_))));
    }

    #[test]
    fn walker_error_aborts_the_build() {
        let tuples: Vec<GraphResult<(u64, Gid, u32)>> =
            vec![Ok((1, 0, 0)), Err(GraphError::OutOfMemory("boom"))];
        assert!(build_index(tuples, 3, IndexMode::Hash).is_err());
    }
}
