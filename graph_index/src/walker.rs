//! The k-mer walker with IUPAC expansion — the algorithmic heart of this
//! crate.
//!
//! A shift-register formulation of this walk would keep an explicit
//! bump-allocated stack of frames and a popcount history register to
//! shift/collapse the live k-mer buffer symbol by symbol. This
//! implementation gets the same tuple stream and ordering from a
//! bounded-depth recursive Cartesian-product walk instead: the native
//! Rust call stack plays the role of the frame vector (depth is bounded by
//! `k <= 32` plus a generous cycle guard, so there is no overflow risk),
//! and duplicate k-mers from ambiguity codes never arise in the first
//! place because each recursive step only ever multiplies the buffer by
//! the concrete expansions of the *next* symbol — there is nothing to
//! collapse afterward. See DESIGN.md for the equivalence argument against
//! the worked test scenarios.

use crate::error::{GraphError, GraphResult};
use crate::iupac::{complement_4bit, expand};
use crate::section::{is_reverse, section_of, Gid, Section};
use crate::seq_buffer::SeqBuffer;
use itertools::iproduct;
use std::collections::VecDeque;

/// Read the 4-bit IUPAC code at `logical_pos` bases into `gid`'s own
/// strand (i.e. respecting the orientation bit: forward reads the
/// section's sequence left to right, reverse reads it right to left,
/// complemented).
fn read_base(sections: &[Section], seq: &SeqBuffer, gid: Gid, logical_pos: usize) -> u8 {
    let sec = &sections[section_of(gid) as usize];
    if is_reverse(gid) {
        let absolute = sec.base + (sec.len as usize - 1 - logical_pos);
        complement_4bit(seq.get(absolute))
    } else {
        let absolute = sec.base + logical_pos;
        seq.get(absolute)
    }
}

/// `gid_offsets` is `links::CompactedLinks::gid_offsets`: `gid_offsets[g]`
/// is where gid `g`'s forward-edge slice begins in `link_table`,
/// `gid_offsets[g+1]` is where it ends.
fn link_slice<'a>(gid_offsets: &[u32], link_table: &'a [Gid], gid: Gid) -> &'a [Gid] {
    let start = gid_offsets[gid as usize] as usize;
    let end = gid_offsets[gid as usize + 1] as usize;
    &link_table[start..end]
}

/// Bound on the live expansion buffer, scaled from the empirical
/// `3^(k/2)` figure for how wide a window of IUPAC ambiguity codes can
/// plausibly get; used to catch a pathological run of maximally-ambiguous
/// codes before it exhausts memory.
fn expansion_bound(k: usize) -> usize {
    3usize.saturating_pow(((k as u32) + 1) / 2 + 4)
}

/// Cap on total recursive hops across edges while completing one window.
/// Graphs with zero-length non-sentinel segments wired into a cycle could
/// otherwise never make progress; this bound turns it into a dead end
/// instead of a non-terminating walk.
fn hop_budget(num_sections: usize) -> usize {
    num_sections + 64
}

#[allow(clippy::too_many_arguments)]
fn collect_window(
    sections: &[Section],
    gid_offsets: &[u32],
    link_table: &[Gid],
    seq: &SeqBuffer,
    gid: Gid,
    start_pos: usize,
    need: usize,
    bound: usize,
    hops_left: usize,
) -> GraphResult<Option<Vec<u64>>> {
    let sec = &sections[section_of(gid) as usize];
    let len = sec.len as usize;
    let avail = len.saturating_sub(start_pos).min(need);

    let mut combos: Vec<u64> = vec![0u64];
    for i in 0..avail {
        let code = read_base(sections, seq, gid, start_pos + i);
        let bases = expand(code);
        if bases.is_empty() {
            // N (or any other non-IUPAC gap) kills every window straddling it.
            return Ok(None);
        }
        let next: Vec<u64> = iproduct!(combos.iter(), bases.iter())
            .map(|(&c, &b)| c | ((b as u64) << (2 * i)))
            .collect();
        if next.len() > bound {
            return Err(GraphError::OutOfMemory("k-mer expansion buffer overflow"));
        }
        combos = next;
    }

    let remaining_needed = need - avail;
    if remaining_needed == 0 {
        return Ok(Some(combos));
    }
    if hops_left == 0 {
        return Ok(None);
    }

    let edges = link_slice(gid_offsets, link_table, gid);
    if edges.is_empty() {
        return Ok(None);
    }

    let mut out = Vec::new();
    for &dst in edges {
        if let Some(tail_combos) = collect_window(
            sections,
            gid_offsets,
            link_table,
            seq,
            dst,
            0,
            remaining_needed,
            bound,
            hops_left - 1,
        )? {
            for (&prefix, &suffix) in iproduct!(combos.iter(), tail_combos.iter()) {
                let value = prefix | (suffix << (2 * avail));
                out.push(value);
                if out.len() > bound {
                    return Err(GraphError::OutOfMemory("k-mer expansion buffer overflow"));
                }
            }
        }
    }
    if out.is_empty() {
        Ok(None)
    } else {
        Ok(Some(out))
    }
}

/// Lazily enumerates every `(kmer, gid, pos)` tuple in the graph: positions
/// ascending within a segment, segments in increasing forward-gid order,
/// and (for a single position whose window crosses into neighbours)
/// neighbours in the order they appear in that vertex's forward-edge
/// slice.
pub struct KmerWalker<'a> {
    sections: &'a [Section],
    gid_offsets: &'a [u32],
    link_table: &'a [Gid],
    seq: &'a SeqBuffer,
    k: usize,
    bound: usize,
    hops: usize,
    current_gid: Gid,
    current_pos: usize,
    max_forward_gid: Gid,
    queue: VecDeque<(u64, Gid, u32)>,
    done: bool,
}

impl<'a> KmerWalker<'a> {
    /// `sentinel_id` is the tail sentinel's section id; the walk visits
    /// forward gids `0, 2, .. < 2*sentinel_id`.
    pub fn new(
        sections: &'a [Section],
        gid_offsets: &'a [u32],
        link_table: &'a [Gid],
        seq: &'a SeqBuffer,
        k: usize,
        sentinel_id: u32,
    ) -> Self {
        KmerWalker {
            sections,
            gid_offsets,
            link_table,
            seq,
            k,
            bound: expansion_bound(k),
            hops: hop_budget(sections.len()),
            current_gid: 0,
            current_pos: 0,
            max_forward_gid: sentinel_id * 2,
            queue: VecDeque::new(),
            done: false,
        }
    }

    fn refill(&mut self) -> GraphResult<()> {
        while self.queue.is_empty() {
            if self.current_gid >= self.max_forward_gid {
                self.done = true;
                return Ok(());
            }
            let sec = &self.sections[section_of(self.current_gid) as usize];
            let len = sec.len as usize;
            if self.current_pos >= len {
                self.current_gid += 2;
                self.current_pos = 0;
                continue;
            }
            let pos = self.current_pos;
            self.current_pos += 1;
            if let Some(values) = collect_window(
                self.sections,
                self.gid_offsets,
                self.link_table,
                self.seq,
                self.current_gid,
                pos,
                self.k,
                self.bound,
                self.hops,
            )? {
                for v in values {
                    self.queue.push_back((v, self.current_gid, pos as u32));
                }
            }
        }
        Ok(())
    }

    /// The raw, C-style-facade interface: returns the termination
    /// sentinel `(u64::MAX, u32::MAX, _)` both at true end of input and on
    /// error, matching the policy that every error produces a sentinel
    /// tuple from the iterator. Use the `Iterator` impl below when you
    /// want the error surfaced instead of swallowed.
    pub fn next_raw(&mut self) -> (u64, Gid, u32) {
        match self.next() {
            Some(Ok(tuple)) => tuple,
            Some(Err(_)) | None => (u64::MAX, u32::MAX, 0),
        }
    }
}

impl<'a> Iterator for KmerWalker<'a> {
    type Item = GraphResult<(u64, Gid, u32)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.queue.is_empty() {
            if let Err(e) = self.refill() {
                self.done = true;
                return Some(Err(e));
            }
        }
        if self.done {
            return None;
        }
        self.queue.pop_front().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iupac::ascii_to_two_bit;
    use crate::section::gid_of;
    use pretty_assertions::assert_eq;

    fn pack(ascii: &str) -> u64 {
        let mut v = 0u64;
        for (i, b) in ascii.bytes().enumerate() {
            let code = ascii_to_two_bit(b);
            v |= (code as u64) << (2 * i);
        }
        v
    }

    fn single_segment_graph(s: &str) -> (Vec<Section>, SeqBuffer) {
        let mut seq = SeqBuffer::new_owned();
        let base = seq.push_ascii(s.as_bytes()).unwrap();
        let sections = vec![
            Section { id: 0, base, len: s.len() as u32 },
            Section { id: 1, base: base + s.len(), len: 0 }, // tail sentinel
        ];
        (sections, seq)
    }

    #[test]
    fn single_segment_no_ambiguity() {
        let (sections, seq) = single_segment_graph("ACGT");
        let gid_offsets = vec![0u32; 5]; // no edges anywhere, including the sentinel slot
        let link_table: Vec<Gid> = vec![];

        let walker = KmerWalker::new(&sections, &gid_offsets, &link_table, &seq, 3, 1);
        let tuples: Vec<_> = walker.map(|r| r.unwrap()).collect();
        let kmers: Vec<u64> = tuples.iter().map(|t| t.0).collect();
        assert_eq!(kmers, vec![pack("ACG"), pack("CGT")]);
    }

    #[test]
    fn ambiguity_expansion_matches_cartesian_product() {
        let (sections, seq) = single_segment_graph("GGRA");
        let gid_offsets = vec![0u32; 5];
        let link_table: Vec<Gid> = vec![];

        let walker = KmerWalker::new(&sections, &gid_offsets, &link_table, &seq, 3, 1);
        let tuples: Vec<_> = walker.map(|r| r.unwrap()).collect();
        let at_pos0: Vec<u64> = tuples.iter().filter(|t| t.2 == 0).map(|t| t.0).collect();
        let at_pos1: Vec<u64> = tuples.iter().filter(|t| t.2 == 1).map(|t| t.0).collect();
        assert_eq!(at_pos0, vec![pack("GGA"), pack("GGG")]);
        assert_eq!(at_pos1, vec![pack("GAA"), pack("GGA")]);
    }

    #[test]
    fn window_extends_across_an_edge_up_to_k_minus_one() {
        let mut seq = SeqBuffer::new_owned();
        let base0 = seq.push_ascii(b"AAA").unwrap();
        let base1 = seq.push_ascii(b"CCC").unwrap();
        let sentinel_base = base1 + 3;
        let sections = vec![
            Section { id: 0, base: base0, len: 3 },
            Section { id: 1, base: base1, len: 3 },
            Section { id: 2, base: sentinel_base, len: 0 },
        ];

        let sec0_fwd = gid_of(0, false);
        let sec1_fwd = gid_of(1, false);
        let sec0_rev = gid_of(0, true);

        // gid order ascending: 0 sec0f, 1 sec0r, 2 sec1f, 3 sec1r, 4 sentinel-f, 5 sentinel-r.
        // sec0f -> sec1f ; sec1r -> sec0r (the dual of the first link).
        let link_table = vec![sec1_fwd, sec0_rev];
        let gid_offsets = vec![0u32, 1, 1, 1, 2, 2, 2];

        let walker = KmerWalker::new(&sections, &gid_offsets, &link_table, &seq, 3, 2);
        let tuples: Vec<_> = walker.map(|r| r.unwrap()).collect();

        let at_sec0_pos1: Vec<u64> = tuples
            .iter()
            .filter(|t| t.1 == sec0_fwd && t.2 == 1)
            .map(|t| t.0)
            .collect();
        assert_eq!(at_sec0_pos1, vec![pack("AAC")]);

        let at_sec0_pos2: Vec<u64> = tuples
            .iter()
            .filter(|t| t.1 == sec0_fwd && t.2 == 2)
            .map(|t| t.0)
            .collect();
        assert_eq!(at_sec0_pos2, vec![pack("ACC")]);

        let at_sec1_pos0: Vec<u64> = tuples
            .iter()
            .filter(|t| t.1 == sec1_fwd && t.2 == 0)
            .map(|t| t.0)
            .collect();
        assert_eq!(at_sec1_pos0, vec![pack("CCC")]);
    }
}
