use std::io;

use snafu::ResultExt as _;
use snafu_utils::GenericError;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// Builds the event filter.
///
/// An explicit `directives` string wins over `RUST_LOG`; without either,
/// only warnings and errors are shown.
pub fn filter(directives: Option<&str>) -> Result<EnvFilter, GenericError> {
    match directives {
        Some(directives) => EnvFilter::try_new(directives)
            .with_whatever_context(|_| format!("invalid log filter `{directives}`")),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Installs the global subscriber. Events go to stderr so they never mix
/// with command output.
pub fn init(directives: Option<&str>, ansi: bool) -> Result<(), GenericError> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(directives)?)
        .with_writer(io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .try_init()
        .whatever_context("failed to install log subscriber")
}
