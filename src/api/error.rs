use std::borrow::Cow;
use std::fmt;

use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Stable error codes returned by the notas processing API.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ApiErrorCode {
    InvalidRequest,
    InvalidParams,
    NotaNotFound,
    ReprocessInProgress,
    ReprocessLimitReached,
    PipelineUnavailable,
    DocumentUnavailable,
    InternalError,
    Custom(String),
}

impl ApiErrorCode {
    pub fn as_str(&self) -> Cow<'_, str> {
        match self {
            ApiErrorCode::InvalidRequest => Cow::Borrowed("INVALID_REQUEST"),
            ApiErrorCode::InvalidParams => Cow::Borrowed("INVALID_PARAMS"),
            ApiErrorCode::NotaNotFound => Cow::Borrowed("NOTA_NOT_FOUND"),
            ApiErrorCode::ReprocessInProgress => Cow::Borrowed("REPROCESS_IN_PROGRESS"),
            ApiErrorCode::ReprocessLimitReached => Cow::Borrowed("REPROCESS_LIMIT_REACHED"),
            ApiErrorCode::PipelineUnavailable => Cow::Borrowed("PIPELINE_UNAVAILABLE"),
            ApiErrorCode::DocumentUnavailable => Cow::Borrowed("DOCUMENT_UNAVAILABLE"),
            ApiErrorCode::InternalError => Cow::Borrowed("INTERNAL_ERROR"),
            ApiErrorCode::Custom(other) => Cow::Borrowed(other.as_str()),
        }
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ApiErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(match value.as_str() {
            "INVALID_REQUEST" => ApiErrorCode::InvalidRequest,
            "INVALID_PARAMS" => ApiErrorCode::InvalidParams,
            "NOTA_NOT_FOUND" => ApiErrorCode::NotaNotFound,
            "REPROCESS_IN_PROGRESS" => ApiErrorCode::ReprocessInProgress,
            "REPROCESS_LIMIT_REACHED" => ApiErrorCode::ReprocessLimitReached,
            "PIPELINE_UNAVAILABLE" => ApiErrorCode::PipelineUnavailable,
            "DOCUMENT_UNAVAILABLE" => ApiErrorCode::DocumentUnavailable,
            "INTERNAL_ERROR" => ApiErrorCode::InternalError,
            other => ApiErrorCode::Custom(other.to_string()),
        })
    }
}

impl From<&str> for ApiErrorCode {
    fn from(value: &str) -> Self {
        ApiErrorCode::deserialize(value.into_deserializer())
            .unwrap_or_else(|_: serde::de::value::Error| ApiErrorCode::Custom(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_round_trip() {
        let codes = [
            ApiErrorCode::InvalidRequest,
            ApiErrorCode::NotaNotFound,
            ApiErrorCode::ReprocessInProgress,
            ApiErrorCode::PipelineUnavailable,
            ApiErrorCode::InternalError,
        ];
        for code in codes {
            let encoded = serde_json::to_string(&code).expect("serialize");
            let decoded: ApiErrorCode = serde_json::from_str(&encoded).expect("deserialize");
            assert_eq!(decoded, code);
        }
    }

    #[test]
    fn unknown_code_falls_back_to_custom() {
        let code = ApiErrorCode::from("SOMETHING_NEW");
        assert_eq!(code, ApiErrorCode::Custom("SOMETHING_NEW".to_string()));
        assert_eq!(code.as_str(), "SOMETHING_NEW");
    }
}
