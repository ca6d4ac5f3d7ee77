pub extern crate log;

pub use log::*;

/// Map a case-insensitive level name (as accepted by the CLI `--log-level` flag)
/// to a `log::LevelFilter`. Panics on an unrecognized level, same as the CLI did
/// before this was factored out of `main`.
pub fn parse_level(level: &str) -> log::LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        "off" => log::LevelFilter::Off,
        _ => panic!(
            "Unknown log level, please set to one of \
            Trace, Debug, Info, Warn, Error, or Off (case insensitive)."
        ),
    }
}
