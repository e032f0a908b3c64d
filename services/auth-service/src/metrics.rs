use anyhow::Result;
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

const STATUS_SUCCESS: &str = "success";
const STATUS_FAILURE: &str = "failure";
const REASON_NONE: &str = "none";

/// Counters for the login and register flows, tagged with outcome and a
/// failure reason (`"none"` on success).
#[derive(Clone)]
pub struct AuthMetrics {
    registry: Registry,
    login_attempts: IntCounterVec,
    register_attempts: IntCounterVec,
}

impl AuthMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let login_attempts = IntCounterVec::new(
            Opts::new(
                "auth_login_attempts_total",
                "Count of login attempts grouped by outcome and reason",
            ),
            &["status", "reason"],
        )?;
        registry.register(Box::new(login_attempts.clone()))?;

        let register_attempts = IntCounterVec::new(
            Opts::new(
                "auth_register_attempts_total",
                "Count of registration attempts grouped by outcome and reason",
            ),
            &["status", "reason"],
        )?;
        registry.register(Box::new(register_attempts.clone()))?;

        Ok(Self {
            registry,
            login_attempts,
            register_attempts,
        })
    }

    pub fn login_success(&self) {
        self.login_attempts
            .with_label_values(&[STATUS_SUCCESS, REASON_NONE])
            .inc();
    }

    pub fn login_failure(&self, reason: &str) {
        self.login_attempts
            .with_label_values(&[STATUS_FAILURE, reason])
            .inc();
    }

    pub fn register_success(&self) {
        self.register_attempts
            .with_label_values(&[STATUS_SUCCESS, REASON_NONE])
            .inc();
    }

    pub fn register_failure(&self, reason: &str) {
        self.register_attempts
            .with_label_values(&[STATUS_FAILURE, reason])
            .inc();
    }

    /// Current counter value, mainly useful to assert outcomes in tests.
    pub fn login_total(&self, status: &str, reason: &str) -> u64 {
        self.login_attempts.with_label_values(&[status, reason]).get()
    }

    pub fn register_total(&self, status: &str, reason: &str) -> u64 {
        self.register_attempts
            .with_label_values(&[status, reason])
            .get()
    }

    pub fn render(&self) -> Result<Response> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            )
            .body(Body::from(buffer))?;
        Ok(response)
    }
}
