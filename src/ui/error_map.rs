use serde_json::Value;

use crate::api::error::ApiErrorCode;

use super::commands::CallError;

/// Mapped error description surfaced to the UI layer.
#[derive(Debug, Clone)]
pub struct ErrorDescription {
    pub headline: String,
    pub technical: Option<String>,
}

impl ErrorDescription {
    pub fn new(headline: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            technical: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.technical = Some(detail.into());
        self
    }
}

/// Maps an API error code into a user facing description.
pub fn describe_api_error(code: &ApiErrorCode, details: Option<&Value>) -> ErrorDescription {
    let headline = match code {
        ApiErrorCode::InvalidRequest => "The notas service could not parse the request.",
        ApiErrorCode::InvalidParams => "The notas service rejected the provided parameters.",
        ApiErrorCode::NotaNotFound => "The referenced nota fiscal could not be found.",
        ApiErrorCode::ReprocessInProgress => {
            "A reprocess request for this nota is already running."
        }
        ApiErrorCode::ReprocessLimitReached => {
            "This nota has reached its reprocess attempt limit."
        }
        ApiErrorCode::PipelineUnavailable => "The processing pipeline is currently unavailable.",
        ApiErrorCode::DocumentUnavailable => "No document is available for this nota yet.",
        ApiErrorCode::InternalError => "The notas service encountered an unexpected failure.",
        ApiErrorCode::Custom(code) => {
            return ErrorDescription::new(format!("Notas API error: {code}"));
        }
    };

    let mut description = ErrorDescription::new(headline);
    if let Some(details) = details.and_then(stringify_details) {
        description = description.with_detail(details);
    }
    description
}

/// Maps a command-layer failure into a user facing description.
pub fn describe_call_error(error: &CallError) -> ErrorDescription {
    match error {
        CallError::Timeout(timeout) => {
            ErrorDescription::new("The request to the notas service timed out.").with_detail(
                format!("No response received within {} seconds.", timeout.as_secs()),
            )
        }
        CallError::Api {
            code,
            message,
            details,
        } => {
            let description = describe_api_error(code, details.as_ref());
            let detail =
                technical_details(message, details.as_ref()).or(description.technical.clone());
            ErrorDescription {
                headline: description.headline,
                technical: detail,
            }
        }
        CallError::Transport(message) => {
            ErrorDescription::new("Could not reach the notas service.")
                .with_detail(message.clone())
        }
    }
}

fn stringify_details(details: &Value) -> Option<String> {
    match details {
        Value::String(value) => Some(value.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(boolean) => Some(boolean.to_string()),
        Value::Array(array) => Some(format!("{}", Value::Array(array.clone()))),
        Value::Object(object) => Some(format!("{}", Value::Object(object.clone()))),
        Value::Null => None,
    }
}

/// Formats a technical message combining the API error string and optional
/// details payload.
pub fn technical_details(message: &str, details: Option<&Value>) -> Option<String> {
    let mut parts = vec![message.to_string()];
    if let Some(payload) = details.and_then(stringify_details) {
        parts.push(payload);
    }
    if parts.len() == 1 {
        None
    } else {
        Some(parts.join(" / "))
    }
}
