//! Log setup for the deploy binary.
//!
//! Progress is logged at `info`. Per-file decisions are logged at `debug`
//! and appear with `--verbose` or when a GitHub Actions run has step
//! debugging enabled. `RUST_LOG` overrides both.

use log::LevelFilter;

/// Environment variable GitHub Actions sets when step debug logging is on.
pub const STEP_DEBUG_ENV: &str = "ACTIONS_STEP_DEBUG";

/// The default level for the given switches.
#[must_use]
pub const fn level(verbose: bool, step_debug: bool) -> LevelFilter {
    if verbose || step_debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Whether a step debug value turns debug logging on.
#[must_use]
pub fn is_step_debug(value: Option<&str>) -> bool {
    value.is_some_and(|text| text.trim().eq_ignore_ascii_case("true"))
}

/// Install the global logger, writing to stderr.
///
/// Later calls are ignored.
pub fn init(verbose: bool) {
    let step_debug = is_step_debug(std::env::var(STEP_DEBUG_ENV).ok().as_deref());
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level(verbose, step_debug))
        .format_target(false)
        .parse_env(env_logger::Env::default());
    if builder.try_init().is_err() {
        // A logger is already installed.
    }
}
