use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a log filter, checked before `RUST_LOG`.
pub const LOG_ENV: &str = "NAESIN_LOG";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}'")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("telemetry error: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// Filter used when no environment override is set.
pub fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

fn build_filter(verbose: bool) -> Result<EnvFilter, TelemetryError> {
    if let Ok(value) = std::env::var(LOG_ENV) {
        return EnvFilter::try_new(&value).map_err(|source| TelemetryError::EnvFilter { value, source });
    }
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => {
            let level = default_level(verbose);
            EnvFilter::try_new(level).map_err(|source| TelemetryError::EnvFilter {
                value: level.to_string(),
                source,
            })
        }
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for reports.
pub fn init(verbose: bool) -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbose)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(true), "debug");
        assert_eq!(default_level(false), "warn");
    }

    #[test]
    fn test_bad_filter_is_reported() {
        let err = EnvFilter::try_new("naesin=notalevel").map_err(|source| TelemetryError::EnvFilter {
            value: "naesin=notalevel".to_string(),
            source,
        });
        assert!(err.unwrap_err().to_string().contains("naesin=notalevel"));
    }
}
