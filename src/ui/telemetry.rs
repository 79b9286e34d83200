use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use metrics::{counter, histogram};

use super::commands::CallError;

/// Opt-in recorder for UI interaction metrics. When the operator has not
/// opted in, every recording call is a no-op.
#[derive(Clone, Debug)]
pub struct UiTelemetry {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    opt_in: AtomicBool,
}

static GLOBAL: OnceLock<UiTelemetry> = OnceLock::new();

pub fn global() -> UiTelemetry {
    GLOBAL.get_or_init(UiTelemetry::default).clone()
}

impl Default for UiTelemetry {
    fn default() -> Self {
        Self {
            inner: Arc::new(Inner {
                opt_in: AtomicBool::new(false),
            }),
        }
    }
}

impl UiTelemetry {
    pub fn set_opt_in(&self, enabled: bool) {
        self.inner.opt_in.store(enabled, Ordering::Relaxed);
    }

    pub fn opted_in(&self) -> bool {
        self.inner.opt_in.load(Ordering::Relaxed)
    }

    pub fn record_api_success(&self, method: &'static str, duration: Duration) {
        if !self.opted_in() {
            return;
        }
        let value = duration.as_secs_f64() * 1_000.0;
        histogram!("ui.api.latency_ms", "method" => method, "result" => "ok").record(value);
    }

    pub fn record_api_timeout(&self, method: &'static str, timeout: Duration) {
        if !self.opted_in() {
            return;
        }
        let value = timeout.as_secs_f64() * 1_000.0;
        histogram!("ui.api.latency_ms", "method" => method, "result" => "timeout").record(value);
    }

    pub fn record_api_failure(&self, method: &'static str, duration: Duration, error: &CallError) {
        if !self.opted_in() {
            return;
        }
        let value = duration.as_secs_f64() * 1_000.0;
        match error {
            CallError::Api { code, .. } => {
                let code = code.as_str().into_owned();
                histogram!(
                    "ui.api.latency_ms",
                    "method" => method,
                    "result" => "error",
                    "error_kind" => "api",
                    "code" => code.clone()
                )
                .record(value);
                counter!("ui.errors.by_code", "code" => code).increment(1);
            }
            CallError::Transport(_) => {
                histogram!(
                    "ui.api.latency_ms",
                    "method" => method,
                    "result" => "error",
                    "error_kind" => "transport"
                )
                .record(value);
            }
            CallError::Timeout(_) => {
                histogram!(
                    "ui.api.latency_ms",
                    "method" => method,
                    "result" => "error",
                    "error_kind" => "timeout"
                )
                .record(value);
            }
        }
    }

    pub fn record_reprocess_outcome(&self, outcome: &'static str) {
        if !self.opted_in() {
            return;
        }
        counter!("ui.reprocess.events", "outcome" => outcome).increment(1);
    }
}
