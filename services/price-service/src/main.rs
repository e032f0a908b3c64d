use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use common_auth::JwtVerifier;
use sqlx::PgPool;
use std::env;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

use price_service::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
    if jwt_secret.trim().is_empty() {
        bail!("JWT_SECRET must not be empty");
    }

    let db = PgPool::connect(&database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let jwt_verifier = Arc::new(JwtVerifier::new(jwt_secret.trim().as_bytes()));
    let state = AppState::new(db, jwt_verifier);

    let origins = env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());
    let origins = origins
        .split(',')
        .filter_map(|origin| HeaderValue::from_str(origin.trim()).ok())
        .collect::<Vec<_>>();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE, AUTHORIZATION]);

    let app = router(state).layer(cors);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8081);
    let ip: std::net::IpAddr = host.parse()?;
    let addr = SocketAddr::from((ip, port));

    println!("starting price-service on {addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
