//! Log output setup.
//!
//! `RUST_LOG` wins when it is set and parses; otherwise the crate and the
//! binary log at the configured level and everything else stays quiet.

use tracing::{info_span, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{ProtocolError, Result};

const STANDARD_ENV_VAR: &str = "RUST_LOG";

fn filter_for(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_env(STANDARD_ENV_VAR) {
        Ok(filter) => Ok(filter),
        Err(e) if std::env::var(STANDARD_ENV_VAR).is_ok() => Err(ProtocolError::ConfigError(
            format!("{STANDARD_ENV_VAR} (set in environment) was not understood: {e}"),
        )),
        Err(_) => {
            let level = config.log_level.to_string().to_lowercase();
            EnvFilter::try_new(format!(
                "submission_protocol={level},submit_client={level}"
            ))
            .map_err(|e| ProtocolError::ConfigError(format!("Invalid log filter: {e}")))
        }
    }
}

/// Install the global subscriber. Output goes to stderr.
///
/// Fails if a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = filter_for(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json_format {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    installed.map_err(|e| ProtocolError::ConfigError(format!("Failed to set up logging: {e}")))
}

/// Span that tags everything logged inside it with the application name.
pub fn app_span(config: &LoggingConfig) -> Span {
    info_span!("app", app = %config.app_name)
}
