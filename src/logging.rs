//! Logger setup for the command-line tools

use log::LevelFilter;

/// Install the `env_logger` backend.
///
/// `RUST_LOG` takes precedence; otherwise the level is `info`, or `debug`
/// when `verbose` is set. Calling this more than once is harmless.
pub fn init(verbose: bool) {
    let default = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = env_logger::Builder::new()
        .filter_level(default)
        .parse_default_env()
        .format_target(false)
        .format_timestamp_secs()
        .try_init();
}
