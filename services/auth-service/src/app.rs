use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::flow::AuthFlow;
use crate::handlers::{health, login_user, register_user, render_metrics};
use crate::metrics::AuthMetrics;

#[derive(Clone)]
pub struct AppState {
    pub flow: Arc<AuthFlow>,
    pub metrics: Arc<AuthMetrics>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(render_metrics))
        .route("/auth/register", post(register_user))
        .route("/auth/login", post(login_user))
        .with_state(state)
}
