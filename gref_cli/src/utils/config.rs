// Run configuration for gref_cli, built either from command line arguments
// or from a config yaml (which overrides everything else except logging).

use log::info;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_yaml::Value;

use super::cli::Cli;

#[derive(Debug)]
pub struct RunConfiguration {
    pub input: String,
    pub k: usize,
    pub hash_bucket_hint: usize,
    pub iter_only: bool,
    pub num_threads: usize,
    pub query: Option<String>,
    pub stats_out: Option<String>,
}

impl RunConfiguration {
    pub fn build() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

pub struct ConfigBuilder {
    pub(crate) input: Option<String>,
    k: usize,
    hash_bucket_hint: usize,
    iter_only: bool,
    num_threads: usize,
    query: Option<String>,
    stats_out: Option<String>,
}

impl ConfigBuilder {
    pub fn new() -> ConfigBuilder {
        ConfigBuilder {
            input: None,
            k: 14,
            hash_bucket_hint: 1024,
            iter_only: false,
            num_threads: 0,
            query: None,
            stats_out: None,
        }
    }

    pub fn check_and_print_config(&self) {
        if self.input.is_none() {
            panic!("No input GFA-like file was specified.")
        }
        info!("Running gref_cli on {} with...", self.input.clone().unwrap());
        info!("  >k: {}", self.k);
        info!("  >hash_bucket_hint: {}", self.hash_bucket_hint);
        info!("  >index_mode: {}", if self.iter_only { "ITER_ONLY" } else { "HASH" });
        info!("  >threads: {}", self.num_threads);
        if self.k == 0 || self.k > 32 {
            panic!("k must be in 1..=32, got {}", self.k);
        }
    }

    pub fn build(self) -> RunConfiguration {
        RunConfiguration {
            input: self.input.unwrap(),
            k: self.k,
            hash_bucket_hint: self.hash_bucket_hint,
            iter_only: self.iter_only,
            num_threads: self.num_threads,
            query: self.query,
            stats_out: self.stats_out,
        }
    }
}

fn generate_error(key: &str, key_type: &str, value: &Value) -> String {
    format!("Input {} could not be converted to {}: {:?}", key, key_type, value)
}

pub fn read_config_yaml(yaml: String) -> Box<RunConfiguration> {
    let f = fs::File::open(&yaml);
    let file = match f {
        Ok(l) => l,
        Err(error) => panic!("Problem reading the config file: {}", error),
    };
    let scrape_config: HashMap<String, Value> =
        serde_yaml::from_reader(file).expect("Could not read values");

    let mut config_builder = ConfigBuilder::new();
    for (key, value) in scrape_config {
        match key.as_str() {
            "input" => {
                let input_path = Path::new(value.as_str().unwrap());
                if !input_path.is_file() {
                    panic!("Input file not found: {}", value.as_str().unwrap())
                }
                config_builder.input = value.as_str().unwrap().to_string().into();
            }
            _ => match &value.as_str() {
                Some(".") => continue,
                _ => match key.as_str() {
                    "k" => {
                        config_builder.k =
                            value.as_u64().expect(&generate_error(&key, "integer", &value)) as usize
                    }
                    "hash_bucket_hint" => {
                        config_builder.hash_bucket_hint =
                            value.as_u64().expect(&generate_error(&key, "integer", &value)) as usize
                    }
                    "iter_only" => {
                        config_builder.iter_only =
                            value.as_bool().expect(&generate_error(&key, "boolean", &value))
                    }
                    "num_threads" => {
                        config_builder.num_threads =
                            value.as_u64().expect(&generate_error(&key, "integer", &value)) as usize
                    }
                    "query" => {
                        config_builder.query = value.as_str().unwrap().to_string().into()
                    }
                    "stats_out" => {
                        config_builder.stats_out = value.as_str().unwrap().to_string().into()
                    }
                    _ => continue,
                },
            },
        }
    }
    config_builder.check_and_print_config();
    Box::new(config_builder.build())
}

pub fn build_config_from_args(args: Cli) -> Box<RunConfiguration> {
    let mut config_builder = ConfigBuilder::new();
    if !args.input.is_empty() {
        config_builder.input = args.input.into();
    } else {
        panic!("No input specified");
    }
    config_builder.k = args.k;
    config_builder.hash_bucket_hint = args.hash_bucket_hint;
    config_builder.iter_only = args.iter_only;
    config_builder.num_threads = args.num_threads;
    if !args.query.is_empty() {
        config_builder.query = Some(args.query);
    }
    if !args.stats_out.is_empty() {
        config_builder.stats_out = Some(args.stats_out);
    }
    config_builder.check_and_print_config();
    Box::new(config_builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_config_from_args_requires_input() {
        let builder = RunConfiguration::build();
        assert!(builder.input.is_none());
    }

    #[test]
    fn command_line_inputs_round_trip() {
        let args = Cli {
            config: String::new(),
            input: String::from("graph.gfa"),
            k: 21,
            hash_bucket_hint: 2048,
            iter_only: true,
            num_threads: 4,
            query: String::from("ACG"),
            stats_out: String::new(),
            log_level: String::from("Trace"),
            log_dest: String::new(),
        };
        let config = build_config_from_args(args);
        assert_eq!(config.input, "graph.gfa");
        assert_eq!(config.k, 21);
        assert!(config.iter_only);
        assert_eq!(config.query, Some("ACG".to_string()));
    }

    #[test]
    #[should_panic]
    fn missing_input_panics() {
        let args = Cli {
            config: String::new(),
            input: String::new(),
            k: 14,
            hash_bucket_hint: 1024,
            iter_only: false,
            num_threads: 0,
            query: String::new(),
            stats_out: String::new(),
            log_level: String::from("Trace"),
            log_dest: String::new(),
        };
        build_config_from_args(args);
    }

    #[test]
    #[should_panic]
    fn k_out_of_range_panics() {
        let mut builder = RunConfiguration::build();
        builder.input = Some("graph.gfa".to_string());
        builder.k = 33;
        builder.check_and_print_config();
    }
}
