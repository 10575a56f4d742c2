//! Tracing setup for the CLI. Logs go to stderr so command output on stdout
//! stays clean for piping.

use std::io;

use shared::config::client::ClientConfig;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt};

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// Returns the level the filter defaulted to.
pub fn initialize_tracing(config: &ClientConfig) -> LevelFilter {
    let default_level = default_level(config);
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let installed = fmt::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }

    default_level
}

fn default_level(config: &ClientConfig) -> LevelFilter {
    config
        .log_level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::INFO)
}
