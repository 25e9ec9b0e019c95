//! Tracing subscriber setup
//!
//! Log lines go to stderr so stdout stays pipeable.

use miette::Diagnostic;
use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a log filter override
pub const LOG_ENV: &str = "FLEET_LOG";

#[derive(Debug, Error, Diagnostic)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    #[diagnostic(code(fleet::telemetry::filter))]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },

    #[error("telemetry error: {0}")]
    #[diagnostic(code(fleet::telemetry::subscriber))]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// Install the global subscriber; `FLEET_LOG` wins over `level`
pub fn init(level: &str) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|source| TelemetryError::EnvFilter {
            value: level.to_string(),
            source,
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
