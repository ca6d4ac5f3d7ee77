// A minimal GFA-like text loader: S (segment) and L (link) lines only.
// Persistence and ingestion formats are out of scope for the core
// library, but every binary in this workspace pairs a core lib with a
// driver that reads a concrete file format, so gref_cli gets one too.
//
// S <name> <sequence>
// L <from> <+|-> <to> <+|-> <overlap>
//
// `overlap` is accepted and ignored (this loader does not model CIGAR
// trimming); everything past the fifth field on an L line, and past the
// third field on an S line, is ignored as well.

use std::collections::HashMap;
use std::fmt;

use common::file_tools::read_lines;
use graph_index::{Graph, GraphError};

#[derive(Debug)]
pub enum GfaError {
    Io(std::io::Error),
    Parse { line_no: usize, message: String },
    Graph(GraphError),
}

impl fmt::Display for GfaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GfaError::Io(e) => write!(f, "io error: {}", e),
            GfaError::Parse { line_no, message } => {
                write!(f, "parse error on line {}: {}", line_no, message)
            }
            GfaError::Graph(e) => write!(f, "graph error: {}", e),
        }
    }
}

impl std::error::Error for GfaError {}

impl From<std::io::Error> for GfaError {
    fn from(e: std::io::Error) -> Self {
        GfaError::Io(e)
    }
}

impl From<GraphError> for GfaError {
    fn from(e: GraphError) -> Self {
        GfaError::Graph(e)
    }
}

fn parse_orientation(token: &str, line_no: usize) -> Result<bool, GfaError> {
    match token {
        "+" => Ok(false),
        "-" => Ok(true),
        other => Err(GfaError::Parse {
            line_no,
            message: format!("expected '+' or '-' for orientation, got {:?}", other),
        }),
    }
}

/// Load every S/L line in `path` into a freshly-initialized Pool on
/// `graph`. Segment order follows the file; links may reference a segment
/// name before its S line appears, since append order between segments
/// and links is unconstrained.
pub fn load_gfa(graph: &mut Graph, path: &str) -> Result<(), GfaError> {
    let mut names: HashMap<String, u32> = HashMap::new();
    for (line_no, line) in read_lines(path)?.enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        if line.contains(' ') && !line.contains('\t') {
            fields = line.split(' ');
        }
        let fields: Vec<&str> = fields.collect();
        match fields.first() {
            Some(&"S") => {
                let name = fields.get(1).ok_or_else(|| GfaError::Parse {
                    line_no,
                    message: "S line missing name".into(),
                })?;
                let seq = fields.get(2).ok_or_else(|| GfaError::Parse {
                    line_no,
                    message: "S line missing sequence".into(),
                })?;
                let id = graph.append_segment_ascii(name.as_bytes(), seq.as_bytes())?;
                names.insert(name.to_string(), id);
            }
            Some(&"L") => {
                let from_name = fields.get(1).ok_or_else(|| GfaError::Parse {
                    line_no,
                    message: "L line missing from-segment".into(),
                })?;
                let from_orient = parse_orientation(fields.get(2).unwrap_or(&""), line_no)?;
                let to_name = fields.get(3).ok_or_else(|| GfaError::Parse {
                    line_no,
                    message: "L line missing to-segment".into(),
                })?;
                let to_orient = parse_orientation(fields.get(4).unwrap_or(&""), line_no)?;

                let from_id = *names
                    .entry(from_name.to_string())
                    .or_insert(graph.resolve_name(from_name.as_bytes())?);
                let to_id = *names
                    .entry(to_name.to_string())
                    .or_insert(graph.resolve_name(to_name.as_bytes())?);
                graph.append_link(from_id, from_orient, to_id, to_orient)?;
            }
            Some(other) => {
                log::debug!("ignoring unrecognized GFA line type {:?} on line {}", other, line_no);
            }
            None => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_index::InitParams;
    use std::io::Write;

    #[test]
    fn loads_segments_and_links() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "S\tsec0\tAAA").unwrap();
        writeln!(file, "S\tsec1\tCCC").unwrap();
        writeln!(file, "L\tsec0\t+\tsec1\t+\t0M").unwrap();
        file.flush().unwrap();

        let mut params = InitParams::default();
        params.k = 3;
        let mut graph = Graph::init(params).unwrap();
        load_gfa(&mut graph, file.path().to_str().unwrap()).unwrap();
        assert_eq!(graph.get_section_count().unwrap(), 2);

        graph.freeze().unwrap();
        graph.build().unwrap();
        assert!(!graph.match_ascii(b"ACC").unwrap().is_empty());
    }

    #[test]
    fn link_can_reference_a_segment_before_its_s_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "L\tsec0\t+\tsec1\t+\t0M").unwrap();
        writeln!(file, "S\tsec0\tAAA").unwrap();
        writeln!(file, "S\tsec1\tCCC").unwrap();
        file.flush().unwrap();

        let params = InitParams::default();
        let mut graph = Graph::init(params).unwrap();
        load_gfa(&mut graph, file.path().to_str().unwrap()).unwrap();
        assert_eq!(graph.get_section_count().unwrap(), 2);
    }
}
