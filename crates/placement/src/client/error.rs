use serde_json::Value;

pub const TRANSPORT_MESSAGE: &str = "Unable to reach the placement service";

/// Failures talking to the placement backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unable to reach the placement service: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("not authorized; the session is no longer valid")]
    Unauthorized,
    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected response from the placement service: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("cannot build request url for '{path}'")]
    InvalidPath { path: String },
}

impl ApiError {
    /// The single line shown beside the affected table.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => TRANSPORT_MESSAGE.to_string(),
            ApiError::Unauthorized => "Your session has expired, please log in again".to_string(),
            ApiError::Rejected { message, .. } => message.clone(),
            ApiError::Decode(_) | ApiError::InvalidPath { .. } => {
                "Unexpected response from the placement service".to_string()
            }
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Reduce an error response body to one readable line.
///
/// Preference order: a problem-details `title`, then every field validation message from
/// `errors` joined with "; ", then a plain text (or JSON string) body, then a generic line
/// naming the status code.
pub fn describe_failure(status: u16, body: &str) -> String {
    let trimmed = body.trim();

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(fields)) => {
            if let Some(title) = fields
                .get("title")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|title| !title.is_empty())
            {
                return title.to_string();
            }

            let messages = fields
                .get("errors")
                .map(flatten_messages)
                .unwrap_or_default();
            if !messages.is_empty() {
                return messages.join("; ");
            }
        }
        Ok(Value::String(text)) if !text.trim().is_empty() => return text.trim().to_string(),
        Ok(_) => {}
        Err(_) if !trimmed.is_empty() => return trimmed.to_string(),
        Err(_) => {}
    }

    generic_failure(status)
}

fn generic_failure(status: u16) -> String {
    format!("Request failed with status {status}")
}

fn flatten_messages(value: &Value) -> Vec<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => vec![text.trim().to_string()],
        Value::Array(items) => items.iter().flat_map(flatten_messages).collect(),
        Value::Object(fields) => fields.values().flat_map(flatten_messages).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_wins_over_field_errors() {
        let body = r#"{"title":"One or more validation errors occurred.","errors":{"Status":["Invalid status"]}}"#;
        assert_eq!(
            describe_failure(400, body),
            "One or more validation errors occurred."
        );
    }

    #[test]
    fn field_errors_are_flattened_in_key_order() {
        let body = r#"{"errors":{"InterviewDate":["Date is required"],"InterviewLocation":["Location is required","Location too long"]}}"#;
        assert_eq!(
            describe_failure(400, body),
            "Date is required; Location is required; Location too long"
        );
    }

    #[test]
    fn plain_text_bodies_are_used_verbatim() {
        assert_eq!(
            describe_failure(409, "Position is closed\n"),
            "Position is closed"
        );
        assert_eq!(
            describe_failure(409, r#""Already applied""#),
            "Already applied"
        );
    }

    #[test]
    fn empty_or_unhelpful_bodies_fall_back_to_generic_message() {
        assert_eq!(describe_failure(500, ""), "Request failed with status 500");
        assert_eq!(
            describe_failure(400, r#"{"title":"  ","errors":{}}"#),
            "Request failed with status 400"
        );
    }

    #[test]
    fn rejected_errors_surface_their_message() {
        let err = ApiError::Rejected {
            status: 400,
            message: "Date is required".to_string(),
        };
        assert_eq!(err.user_message(), "Date is required");
        assert!(!err.is_unauthorized());
        assert!(ApiError::Unauthorized.is_unauthorized());
    }
}
