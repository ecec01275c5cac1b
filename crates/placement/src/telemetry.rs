use crate::config::TelemetryConfig;
use std::env;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Variable that overrides the configured level when set.
pub const FILTER_OVERRIDE_VAR: &str = "RUST_LOG";
pub const LOG_LEVEL_VAR: &str = "PLACEMENT_LOG_LEVEL";

#[derive(Debug)]
pub enum TelemetryError {
    Filter {
        variable: &'static str,
        directive: String,
        source: ParseError,
    },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Filter {
                variable,
                directive,
                source,
            } => write!(f, "{variable}='{directive}' is not a valid log filter: {source}"),
            TelemetryError::Subscriber(err) => {
                write!(f, "could not install the log subscriber: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::Filter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Pick the filter directive: a non-empty `RUST_LOG` wins over the configured level.
fn filter_directive(config: &TelemetryConfig) -> (&'static str, String) {
    match env::var(FILTER_OVERRIDE_VAR) {
        Ok(value) if !value.trim().is_empty() => (FILTER_OVERRIDE_VAR, value),
        _ => (LOG_LEVEL_VAR, config.log_level.clone()),
    }
}

fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    let (variable, directive) = filter_directive(config);
    EnvFilter::try_new(&directive).map_err(|source| TelemetryError::Filter {
        variable,
        directive,
        source,
    })
}

/// Install the global subscriber. Events go to stderr so table output on stdout stays
/// machine readable.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = build_filter(config)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_names_the_placement_variable() {
        env::remove_var(FILTER_OVERRIDE_VAR);
        let config = TelemetryConfig {
            log_level: "placement=notalevel".to_string(),
        };
        let err = build_filter(&config).expect_err("bad level is refused");
        match &err {
            TelemetryError::Filter {
                variable,
                directive,
                ..
            } => {
                assert_eq!(*variable, LOG_LEVEL_VAR);
                assert_eq!(directive, "placement=notalevel");
            }
            other => panic!("expected filter error, got {other:?}"),
        }
        assert!(err
            .to_string()
            .starts_with("PLACEMENT_LOG_LEVEL='placement=notalevel' is not a valid log filter"));
    }

    #[test]
    fn configured_level_builds_a_filter() {
        env::remove_var(FILTER_OVERRIDE_VAR);
        let config = TelemetryConfig {
            log_level: "placement=debug,warn".to_string(),
        };
        assert!(build_filter(&config).is_ok());
    }
}
