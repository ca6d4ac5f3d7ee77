extern crate clap;
extern crate log;
extern crate simplelog;

pub mod utils;

use clap::Parser;
use log::*;
use simplelog::*;
use std::fs::File;

use common::file_tools::check_parent;
use common::logging::parse_level;
use graph_index::{CopyMode, Graph, IndexMode, InitParams, SeqFormat};
use utils::cli;
use utils::config::{build_config_from_args, read_config_yaml, RunConfiguration};
use utils::gfa::load_gfa;
use utils::report::{kmer_stats_report, write_report};

fn main() {
    info!("Begin processing");
    let args = cli::Cli::parse();
    let level_filter = parse_level(&args.log_level);

    let log_destination = check_parent(&args.log_dest).unwrap();
    CombinedLogger::init(vec![
        TermLogger::new(level_filter, Config::default(), TerminalMode::Stdout, ColorChoice::Auto),
        WriteLogger::new(level_filter, Config::default(), File::create(log_destination).unwrap()),
    ])
    .unwrap();

    let config = if !args.config.is_empty() {
        info!("Using configuration file input: {}", &args.config);
        read_config_yaml(args.config)
    } else {
        info!("Using command line arguments.");
        debug!("Command line args: {:?}", &args);
        build_config_from_args(args)
    };

    run(*config).unwrap_or_else(|error| panic!("gref_cli encountered a problem: {}", error))
}

#[derive(Debug)]
enum RunError {
    Graph(graph_index::GraphError),
    Gfa(utils::gfa::GfaError),
    Io(std::io::Error),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Graph(e) => write!(f, "{}", e),
            RunError::Gfa(e) => write!(f, "{}", e),
            RunError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl From<graph_index::GraphError> for RunError {
    fn from(e: graph_index::GraphError) -> Self {
        RunError::Graph(e)
    }
}

impl From<utils::gfa::GfaError> for RunError {
    fn from(e: utils::gfa::GfaError) -> Self {
        RunError::Gfa(e)
    }
}

impl From<std::io::Error> for RunError {
    fn from(e: std::io::Error) -> Self {
        RunError::Io(e)
    }
}

fn run(config: RunConfiguration) -> Result<(), RunError> {
    let params = InitParams {
        k: config.k,
        hash_bucket_hint: config.hash_bucket_hint,
        seq_format: SeqFormat::Ascii,
        copy_mode: CopyMode::Copy,
        index_mode: if config.iter_only { IndexMode::IterOnly } else { IndexMode::Hash },
        num_threads: config.num_threads,
    };
    let mut graph = Graph::init(params)?;

    info!("Loading GFA-like input: {}", &config.input);
    load_gfa(&mut graph, &config.input)?;

    info!("Freezing graph ({} sections)", graph.get_section_count()?);
    graph.freeze()?;

    let mut tuple_count = 0usize;
    for tuple in graph.iter_kmers()? {
        tuple.map_err(RunError::from)?;
        tuple_count += 1;
    }

    info!("Building k-mer index (k={})", config.k);
    graph.build()?;

    if let Some(query) = &config.query {
        match graph.match_ascii(query.as_bytes()) {
            Ok(hits) => {
                info!("match({}) -> {} hit(s)", query, hits.len());
                for hit in hits {
                    println!("gid={} pos={}", hit.gid, hit.pos);
                }
            }
            Err(e) => warn!("query {:?} failed: {}", query, e),
        }
    }

    let distinct = graph.distinct_kmer_count()?;
    let report = kmer_stats_report(&graph, tuple_count, distinct);
    write_report(&report, &config.stats_out)?;

    info!("Done.");
    Ok(())
}
