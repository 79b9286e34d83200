use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use iced::Command;
use serde_json::Value;
use tokio::time;

use crate::api::client::{NotasApiClient, NotasApiError};
use crate::api::error::ApiErrorCode;

use super::telemetry;

/// Default timeout applied to notas API calls triggered from the UI.
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(15);

/// Error surfaced by the API command helpers. Transport failures are
/// reduced to their message so the error can travel inside `Clone`-able
/// UI messages.
#[derive(Debug, Clone)]
pub enum CallError {
    /// The request future timed out.
    Timeout(Duration),
    /// The service answered with a structured error body.
    Api {
        code: ApiErrorCode,
        message: String,
        details: Option<Value>,
    },
    /// The request failed below the API layer.
    Transport(String),
}

impl From<NotasApiError> for CallError {
    fn from(value: NotasApiError) -> Self {
        match value {
            NotasApiError::Api {
                code,
                message,
                details,
            } => CallError::Api {
                code,
                message,
                details,
            },
            other => CallError::Transport(other.to_string()),
        }
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Timeout(timeout) => {
                write!(f, "request timed out after {}s", timeout.as_secs())
            }
            CallError::Api { code, message, .. } => write!(f, "[{code}] {message}"),
            CallError::Transport(message) => write!(f, "{message}"),
        }
    }
}

/// Spawns an API call wrapped into an [`iced::Command`], enforcing a timeout
/// and recording the outcome in the UI telemetry.
pub fn api<Message, F, Fut, T, M>(
    method: &'static str,
    client: NotasApiClient,
    action: F,
    map: M,
) -> Command<Message>
where
    Message: 'static,
    F: FnOnce(NotasApiClient) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, NotasApiError>> + Send + 'static,
    T: Send + 'static,
    M: FnOnce(Result<T, CallError>) -> Message + Send + 'static,
{
    api_with_timeout(method, client, DEFAULT_API_TIMEOUT, action, map)
}

/// Variant of [`api`] allowing the timeout to be customised per call.
pub fn api_with_timeout<Message, F, Fut, T, M>(
    method: &'static str,
    client: NotasApiClient,
    timeout: Duration,
    action: F,
    map: M,
) -> Command<Message>
where
    Message: 'static,
    F: FnOnce(NotasApiClient) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, NotasApiError>> + Send + 'static,
    T: Send + 'static,
    M: FnOnce(Result<T, CallError>) -> Message + Send + 'static,
{
    Command::perform(
        async move {
            let telemetry = telemetry::global();
            let started = Instant::now();
            match time::timeout(timeout, action(client)).await {
                Ok(Ok(value)) => {
                    telemetry.record_api_success(method, started.elapsed());
                    Ok(value)
                }
                Ok(Err(error)) => {
                    let error = CallError::from(error);
                    telemetry.record_api_failure(method, started.elapsed(), &error);
                    Err(error)
                }
                Err(_) => {
                    telemetry.record_api_timeout(method, timeout);
                    Err(CallError::Timeout(timeout))
                }
            }
        },
        map,
    )
}
