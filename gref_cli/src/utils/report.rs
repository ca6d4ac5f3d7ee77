// A small k-mer-stats report: section count, total sequence length, and
// (once built) total tuple count / distinct k-mer count. Not part of the
// core index surface; a supplemented reporting path for the CLI driver.

use std::fmt::Write as _;
use std::io::Write;

use graph_index::Graph;

pub fn kmer_stats_report(graph: &Graph, tuple_count: usize, distinct_kmer_count: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "sections: {}", graph.get_section_count().unwrap_or(0));
    let _ = writeln!(out, "total sequence length: {}", graph.get_total_len().unwrap_or(0));
    let _ = writeln!(out, "links: {}", graph.link_count().unwrap_or(0));
    let _ = writeln!(out, "k-mer tuples emitted: {}", tuple_count);
    let _ = writeln!(out, "distinct k-mers: {}", distinct_kmer_count);
    let _ = writeln!(out, "max k-mer occurrence: {}", graph.max_kmer_occurrence().unwrap_or(0));
    out
}

pub fn write_report(report: &str, stats_out: &Option<String>) -> std::io::Result<()> {
    match stats_out {
        Some(path) => {
            let mut f = common::file_tools::open_file(path, true)?;
            f.write_all(report.as_bytes())
        }
        None => {
            print!("{}", report);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_index::InitParams;

    #[test]
    fn report_contains_every_field() {
        let mut params = InitParams::default();
        params.k = 3;
        let mut graph = Graph::init(params).unwrap();
        graph.append_segment_ascii(b"sec0", b"ACGT").unwrap();
        let report = kmer_stats_report(&graph, 2, 2);
        assert!(report.contains("sections: 1"));
        assert!(report.contains("k-mer tuples emitted: 2"));
    }
}
