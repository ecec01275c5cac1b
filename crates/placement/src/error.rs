use crate::client::ApiError;
use crate::config::ConfigError;
use crate::session::SessionError;
use crate::telemetry::TelemetryError;
use crate::views::ViewError;
use crate::workflows::applications::LifecycleError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Api(ApiError),
    Session(SessionError),
    Lifecycle(LifecycleError),
    View(ViewError),
    Input(String),
}

impl AppError {
    /// Whether the failure means the stored session has to be discarded.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            AppError::Api(err) => err.is_unauthorized(),
            AppError::Session(SessionError::Api(err)) => err.is_unauthorized(),
            AppError::Lifecycle(LifecycleError::Api(err)) => err.is_unauthorized(),
            _ => false,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Api(err) => write!(f, "{}", err.user_message()),
            AppError::Session(err) => write!(f, "session error: {}", err),
            AppError::Lifecycle(err) => write!(f, "{}", err.user_message()),
            AppError::View(err) => write!(f, "output error: {}", err),
            AppError::Input(message) => write!(f, "invalid input: {}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Api(err) => Some(err),
            AppError::Session(err) => Some(err),
            AppError::Lifecycle(err) => Some(err),
            AppError::View(err) => Some(err),
            AppError::Input(_) => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ApiError> for AppError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

impl From<SessionError> for AppError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

impl From<LifecycleError> for AppError {
    fn from(value: LifecycleError) -> Self {
        Self::Lifecycle(value)
    }
}

impl From<ViewError> for AppError {
    fn from(value: ViewError) -> Self {
        Self::View(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_is_detected_through_wrappers() {
        assert!(AppError::from(ApiError::Unauthorized).is_unauthorized());
        assert!(AppError::from(SessionError::Api(ApiError::Unauthorized)).is_unauthorized());
        assert!(AppError::from(LifecycleError::Api(ApiError::Unauthorized)).is_unauthorized());
        assert!(!AppError::from(SessionError::NotLoggedIn).is_unauthorized());
    }

    #[test]
    fn backend_messages_are_shown_as_is() {
        let err = AppError::from(ApiError::Rejected {
            status: 400,
            message: "Position is closed".to_string(),
        });
        assert_eq!(err.to_string(), "Position is closed");
    }
}
