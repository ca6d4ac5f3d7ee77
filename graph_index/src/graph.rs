//! The public lifecycle handle: Pool / Archive / Index.
//!
//! This is a single enum over three state-specific payloads rather than
//! one struct whose fields alias differently depending on a runtime tag.
//! Transitions take `&mut self` and move the old payload out with
//! `std::mem::replace`, so there is never a window where the handle
//! holds a half-converted state — if a transition fails partway, the
//! handle is left in the placeholder `Invalid` variant and every
//! subsequent operation reports `InvalidState`, funneling every error
//! path to a single teardown.

use crate::error::{GraphError, GraphResult};
use crate::kmer_index::{build_index, Hit, KmerIndex};
use crate::links::{self, CompactedLinks, LinkRaw};
use crate::name_map::NameMap;
use crate::params::{CopyMode, InitParams, SeqFormat};
use crate::section::{gid_of, rev, Section};
use crate::seq_buffer::SeqBuffer;
use crate::walker::KmerWalker;

const MAX_SEGMENT_LEN: usize = 1 << 31;

struct Shared {
    params: InitParams,
    names: NameMap,
    seq: SeqBuffer,
    sections: Vec<Section>,
}

struct PoolData {
    shared: Shared,
    links: Vec<LinkRaw>,
}

struct ArchiveData {
    shared: Shared,
    compacted: CompactedLinks,
    /// The tail sentinel's section id, appended by `freeze`.
    sentinel_id: u32,
}

struct IndexData {
    archive: ArchiveData,
    index: KmerIndex,
}

enum State {
    Pool(PoolData),
    Archive(ArchiveData),
    Index(IndexData),
    /// Only observed transiently inside a transition, or after `clean`.
    Invalid,
}

pub struct Graph {
    state: State,
}

impl Graph {
    /// Allocate an empty Pool.
    pub fn init(params: InitParams) -> GraphResult<Self> {
        params.validate()?;
        if params.copy_mode == CopyMode::NoCopy {
            return Err(GraphError::BadParam(
                "init: NOCOPY requires a pre-encoded buffer, use init_nocopy",
            ));
        }
        let shared = Shared {
            names: NameMap::with_capacity(params.hash_bucket_hint),
            seq: SeqBuffer::new_owned(),
            sections: Vec::new(),
            params,
        };
        Ok(Graph {
            state: State::Pool(PoolData { shared, links: Vec::new() }),
        })
    }

    /// Adopt a caller-supplied, already nibble-packed buffer without
    /// copying it (`seq_format = FOUR_BIT`, `copy_mode = NOCOPY`).
    /// Segment boundaries into this buffer are then registered with
    /// `append_segment_borrowed`.
    pub fn init_nocopy(params: InitParams, storage: Vec<u64>, total_len: usize) -> GraphResult<Self> {
        params.validate()?;
        if params.copy_mode != CopyMode::NoCopy || params.seq_format != SeqFormat::FourBit {
            return Err(GraphError::BadParam(
                "init_nocopy requires copy_mode=NOCOPY and seq_format=FOUR_BIT",
            ));
        }
        let shared = Shared {
            names: NameMap::with_capacity(params.hash_bucket_hint),
            seq: SeqBuffer::from_packed_words(storage, total_len),
            sections: Vec::new(),
            params,
        };
        Ok(Graph {
            state: State::Pool(PoolData { shared, links: Vec::new() }),
        })
    }

    fn pool_mut(&mut self) -> GraphResult<&mut PoolData> {
        match &mut self.state {
            State::Pool(p) => Ok(p),
            _ => Err(GraphError::InvalidState("operation requires the Pool state")),
        }
    }

    fn ensure_section(shared: &mut Shared, name: &[u8]) -> u32 {
        let id = shared.names.insert_or_get(name);
        while shared.sections.len() <= id as usize {
            let new_id = shared.sections.len() as u32;
            shared.sections.push(Section::new(new_id));
        }
        id
    }

    /// Append a segment with ASCII input. A name may already have an
    /// "unfilled" section record from a prior `append_link` call; this
    /// fills it in rather than rejecting it.
    pub fn append_segment_ascii(&mut self, name: &[u8], bases: &[u8]) -> GraphResult<u32> {
        let pool = self.pool_mut()?;
        if pool.shared.params.seq_format != SeqFormat::Ascii {
            return Err(GraphError::BadParam("append_segment_ascii requires seq_format=ASCII"));
        }
        let id = Self::ensure_section(&mut pool.shared, name);
        let truncated = &bases[..bases.len().min(MAX_SEGMENT_LEN)];
        let base = pool.shared.seq.push_ascii(truncated)?;
        let sec = &mut pool.shared.sections[id as usize];
        sec.base = base;
        sec.len = truncated.len() as u32;
        Ok(id)
    }

    /// Append a segment with pre-encoded 4-bit codes (`seq_format = FOUR_BIT`,
    /// `copy_mode = COPY`).
    pub fn append_segment_four_bit(&mut self, name: &[u8], codes: &[u8]) -> GraphResult<u32> {
        let pool = self.pool_mut()?;
        if pool.shared.params.seq_format != SeqFormat::FourBit
            || pool.shared.params.copy_mode != CopyMode::Copy
        {
            return Err(GraphError::BadParam(
                "append_segment_four_bit requires seq_format=FOUR_BIT, copy_mode=COPY",
            ));
        }
        let id = Self::ensure_section(&mut pool.shared, name);
        let truncated = &codes[..codes.len().min(MAX_SEGMENT_LEN)];
        let base = pool.shared.seq.push_codes(truncated)?;
        let sec = &mut pool.shared.sections[id as usize];
        sec.base = base;
        sec.len = truncated.len() as u32;
        Ok(id)
    }

    /// Append a segment for a NOCOPY pool: the bytes already live in the
    /// buffer handed to `init_nocopy`; this only records the boundary.
    pub fn append_segment_borrowed(&mut self, name: &[u8], base: usize, len: u32) -> GraphResult<u32> {
        let pool = self.pool_mut()?;
        if pool.shared.params.copy_mode != CopyMode::NoCopy {
            return Err(GraphError::BadParam("append_segment_borrowed requires copy_mode=NOCOPY"));
        }
        let id = Self::ensure_section(&mut pool.shared, name);
        let sec = &mut pool.shared.sections[id as usize];
        sec.base = base;
        sec.len = len.min(MAX_SEGMENT_LEN as u32);
        Ok(id)
    }

    /// Resolve (or, on first mention, allocate) the numeric id for `name`
    /// without supplying a sequence yet. Lets a caller that only knows
    /// segment names (e.g. a text-format loader) build the numeric ids
    /// `append_link` needs before every segment has been appended.
    pub fn resolve_name(&mut self, name: &[u8]) -> GraphResult<u32> {
        let pool = self.pool_mut()?;
        Ok(Self::ensure_section(&mut pool.shared, name))
    }

    /// Append a link `(src, src_dir) -> (dst, dst_dir)`. Endpoints may not
    /// have an `append_segment` call yet; an unfilled `Section` is
    /// allocated for them, since append order between segments and links
    /// is unconstrained.
    pub fn append_link(&mut self, src: u32, src_dir: bool, dst: u32, dst_dir: bool) -> GraphResult<()> {
        let pool = self.pool_mut()?;
        for id in [src, dst] {
            while pool.shared.sections.len() <= id as usize {
                let new_id = pool.shared.sections.len() as u32;
                pool.shared.sections.push(Section::new(new_id));
            }
        }
        let from = gid_of(src, src_dir);
        let to = gid_of(dst, dst_dir);
        pool.links.push(LinkRaw { from, to });
        pool.links.push(LinkRaw { from: rev(to), to: rev(from) });
        Ok(())
    }

    /// Declared but reserved for a future revision.
    pub fn append_snp(&mut self) -> GraphResult<()> {
        Err(GraphError::InvalidState("append_snp is declared but not implemented"))
    }

    /// Declared but reserved for a future revision.
    pub fn split_section(&mut self) -> GraphResult<()> {
        Err(GraphError::InvalidState("split_section is declared but not implemented"))
    }

    /// `clean(*)`: release all storage for any lifecycle state, returning
    /// the handle to a fresh, empty Pool with the same configuration.
    pub fn clean(&mut self) -> GraphResult<()> {
        let params = self.params().clone();
        *self = Graph::init(params)?;
        Ok(())
    }

    fn params(&self) -> &InitParams {
        match &self.state {
            State::Pool(p) => &p.shared.params,
            State::Archive(a) => &a.shared.params,
            State::Index(i) => &i.archive.shared.params,
            State::Invalid => unreachable!("params queried on an invalid handle"),
        }
    }

    /// Transition a Pool into an Archive.
    pub fn freeze(&mut self) -> GraphResult<()> {
        let old = std::mem::replace(&mut self.state, State::Invalid);
        let pool = match old {
            State::Pool(p) => p,
            other => {
                self.state = other;
                return Err(GraphError::InvalidState("freeze requires the Pool state"));
            }
        };
        let PoolData { mut shared, links } = pool;
        for sec in &shared.sections {
            if sec.is_unfilled() {
                log::warn!(
                    "section {} was referenced by a link but never given a sequence",
                    sec.id
                );
            }
        }
        let sentinel_id = shared.sections.len() as u32;
        let sentinel_base = shared.seq.len();
        shared.sections.push(Section { id: sentinel_id, base: sentinel_base, len: 0 });

        let num_gid_sections = shared.sections.len() as u32;
        let compacted = match links::freeze(links, shared.params.num_threads, num_gid_sections) {
            Ok(c) => c,
            Err(e) => return Err(e),
        };

        self.state = State::Archive(ArchiveData { shared, compacted, sentinel_id });
        Ok(())
    }

    /// Transition an Archive back into a Pool.
    pub fn melt(&mut self) -> GraphResult<()> {
        let old = std::mem::replace(&mut self.state, State::Invalid);
        let archive = match old {
            State::Archive(a) => a,
            other => {
                self.state = other;
                return Err(GraphError::InvalidState("melt requires the Archive state"));
            }
        };
        let ArchiveData { mut shared, compacted, .. } = archive;
        let links = links::melt(&compacted);
        shared.sections.pop(); // drop the tail sentinel
        self.state = State::Pool(PoolData { shared, links });
        Ok(())
    }

    /// Transition an Archive into an Index by walking and hashing every k-mer.
    pub fn build(&mut self) -> GraphResult<()> {
        let old = std::mem::replace(&mut self.state, State::Invalid);
        let archive = match old {
            State::Archive(a) => a,
            other => {
                self.state = other;
                return Err(GraphError::InvalidState("build requires the Archive state"));
            }
        };
        let walker = KmerWalker::new(
            &archive.shared.sections,
            &archive.compacted.gid_offsets,
            &archive.compacted.table,
            &archive.shared.seq,
            archive.shared.params.k,
            archive.sentinel_id,
        );
        let index = match build_index(walker, archive.shared.params.k, archive.shared.params.index_mode) {
            Ok(i) => i,
            Err(e) => return Err(e),
        };
        self.state = State::Index(IndexData { archive, index });
        Ok(())
    }

    /// Transition an Index back into an Archive: release the bucket and
    /// position arrays, retain the link table.
    pub fn disable_index(&mut self) -> GraphResult<()> {
        let old = std::mem::replace(&mut self.state, State::Invalid);
        let indexed = match old {
            State::Index(i) => i,
            other => {
                self.state = other;
                return Err(GraphError::InvalidState("disable_index requires the Index state"));
            }
        };
        self.state = State::Archive(indexed.archive);
        Ok(())
    }

    /// Enumerate every `(kmer, gid, pos)` tuple, valid only on an Archive.
    pub fn iter_kmers(&self) -> GraphResult<KmerWalker<'_>> {
        match &self.state {
            State::Archive(a) => Ok(KmerWalker::new(
                &a.shared.sections,
                &a.compacted.gid_offsets,
                &a.compacted.table,
                &a.shared.seq,
                a.shared.params.k,
                a.sentinel_id,
            )),
            _ => Err(GraphError::InvalidState("iter_kmers requires the Archive state")),
        }
    }

    fn index(&self) -> GraphResult<&KmerIndex> {
        match &self.state {
            State::Index(i) => Ok(&i.index),
            _ => Err(GraphError::InvalidState("match requires the Index state")),
        }
    }

    /// Look up every k-mer in `bases` against the built index.
    pub fn match_ascii(&self, bases: &[u8]) -> GraphResult<&[Hit]> {
        self.index()?.match_ascii(bases)
    }

    /// Look up a single pre-packed k-mer word against the built index.
    pub fn match_packed(&self, kmer: u64) -> GraphResult<&[Hit]> {
        Ok(self.index()?.match_packed(kmer))
    }

    /// Number of distinct k-mers the built index holds.
    pub fn distinct_kmer_count(&self) -> GraphResult<usize> {
        Ok(self.index()?.distinct_kmer_count())
    }

    /// The largest number of occurrences any single distinct k-mer has.
    pub fn max_kmer_occurrence(&self) -> GraphResult<usize> {
        Ok(self.index()?.max_occurrence())
    }

    /// Total number of directed link-table entries (both orientations of
    /// every user-supplied link plus its mandatory dual), valid on an
    /// Archive or Index.
    pub fn link_count(&self) -> GraphResult<usize> {
        match &self.state {
            State::Archive(a) => Ok(a.compacted.table.len()),
            State::Index(i) => Ok(i.archive.compacted.table.len()),
            _ => Err(GraphError::InvalidState("link_count requires the Archive or Index state")),
        }
    }

    fn shared(&self) -> GraphResult<&Shared> {
        match &self.state {
            State::Pool(p) => Ok(&p.shared),
            State::Archive(a) => Ok(&a.shared),
            State::Index(i) => Ok(&i.archive.shared),
            State::Invalid => Err(GraphError::InvalidState("handle was left invalid by a failed transition")),
        }
    }

    /// `get_section(id) -> (id, len, base)`.
    pub fn get_section(&self, id: u32) -> GraphResult<(u32, u32, usize)> {
        let shared = self.shared()?;
        let sec = shared
            .sections
            .get(id as usize)
            .ok_or(GraphError::BadParam("get_section: id out of range"))?;
        Ok((sec.id, sec.len, sec.base))
    }

    /// `get_name(id) -> bytes`.
    pub fn get_name(&self, id: u32) -> GraphResult<&[u8]> {
        self.shared()?
            .names
            .get_key(id)
            .ok_or(GraphError::BadParam("get_name: id out of range"))
    }

    /// `get_seq_ptr()`: direct access to the packed sequence buffer, for
    /// callers that want to read it without going through `get_section`.
    pub fn get_seq_ptr(&self) -> GraphResult<&SeqBuffer> {
        Ok(&self.shared()?.seq)
    }

    pub fn get_total_len(&self) -> GraphResult<usize> {
        Ok(self.shared()?.seq.len())
    }

    /// `get_section_count()`: user-visible segments only, excluding the
    /// tail sentinel if one is currently present.
    pub fn get_section_count(&self) -> GraphResult<u32> {
        match &self.state {
            State::Pool(p) => Ok(p.shared.sections.len() as u32),
            State::Archive(a) => Ok(a.sentinel_id),
            State::Index(i) => Ok(i.archive.sentinel_id),
            State::Invalid => Err(GraphError::InvalidState("handle was left invalid by a failed transition")),
        }
    }

    /// Declared but stubbed; persistence is out of scope.
    pub fn dump_index(&self) -> GraphResult<()> {
        Err(GraphError::InvalidState("dump_index is declared but not implemented"))
    }

    /// Declared but stubbed; persistence is out of scope.
    pub fn load_index(&mut self) -> GraphResult<()> {
        Err(GraphError::InvalidState("load_index is declared but not implemented"))
    }
}
