// Clap CLI for gref_cli. Mirrors this workspace's usual shape: a config
// yaml overrides command line arguments; logging options are independent
// of the config either way.

extern crate clap;

use clap::Parser;
use std::env;

#[derive(Parser, Debug)]
pub struct Cli {
    #[arg(short='C', long="configuration_yaml", default_value_t=String::new(),
        help="Enter a full path and filename to a configuration file. \
        This will override most other options")]
    pub config: String,

    #[arg(short='i', long="input", default_value_t=String::new(),
        help="GFA-like input file (S and L lines) describing segments and links")]
    pub input: String,

    #[arg(short='k', long="seed-length", default_value_t = 14,
        help="K-mer seed length, 1..=32")]
    pub k: usize,

    #[arg(long="hash-bucket-hint", default_value_t = 1024)]
    pub hash_bucket_hint: usize,

    #[arg(long="iter-only", default_value_t = false,
        help="Build the index in ITER_ONLY mode instead of HASH")]
    pub iter_only: bool,

    #[arg(long="threads", default_value_t = 0,
        help="Thread-count hint passed to the external sort (0 = sorter default)")]
    pub num_threads: usize,

    #[arg(short='q', long="query", default_value_t=String::new(),
        help="An ASCII k-mer (length must equal -k) to match against the built index")]
    pub query: String,

    #[arg(long="stats-out", default_value_t=String::new(),
        help="Write a k-mer-stats report to this path instead of stdout")]
    pub stats_out: String,

    #[arg(long="log-level", default_value_t=String::from("Info"),
        help="Enter one of Trace, Debug, Info, Warn, Error, Off")]
    pub log_level: String,

    #[arg(long="log-dest", default_value_t=env::current_dir().unwrap().display().to_string() + "/gref_cli.log",
        help="Full path and name to log file")]
    pub log_dest: String,
}

// Tests are handled in other places.
