pub mod api_error;
pub mod app_state;
pub mod product_handlers;

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;

use product_handlers::{create_observation, delete_observation, get_observation, list_observations};

pub use api_error::ApiError;
pub use app_state::AppState;

async fn health() -> &'static str {
    "ok"
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route(
            "/api/products",
            get(list_observations).post(create_observation),
        )
        .route(
            "/api/products/:id",
            get(get_observation).delete(delete_observation),
        )
        .layer(from_fn_with_state(
            state.jwt_verifier.clone(),
            common_auth::authenticate,
        ))
        .with_state(state)
}
