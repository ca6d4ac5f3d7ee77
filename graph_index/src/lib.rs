//! A k-mer index over a bidirected string graph of nucleotide sequences.
//!
//! See [`graph::Graph`] for the Pool/Archive/Index lifecycle handle, the
//! crate's single entry point.

pub mod error;
pub mod graph;
pub mod iupac;
pub mod kmer_index;
pub mod links;
pub mod name_map;
pub mod params;
pub mod section;
pub mod seq_buffer;
pub mod sort;
pub mod walker;

pub use error::{GraphError, GraphResult};
pub use graph::Graph;
pub use kmer_index::Hit;
pub use params::{CopyMode, IndexMode, InitParams, SeqFormat};
pub use section::{gid_of, is_reverse, rev, section_of, Gid};
