use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

use auth_service::config::load_config;
use auth_service::flow::{AuthFlow, PasswordAuthenticator};
use auth_service::metrics::AuthMetrics;
use auth_service::store::{PgUserStore, UserStore};
use auth_service::tokens::{TokenConfig, TokenSigner};
use auth_service::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = load_config()?;

    let pool = PgPool::connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let metrics = Arc::new(AuthMetrics::new()?);
    let store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool));
    let authenticator = Arc::new(PasswordAuthenticator::new(store.clone()));
    let signer = Arc::new(TokenSigner::new(
        config.jwt_secret.as_bytes(),
        TokenConfig {
            ttl_seconds: config.token_ttl_seconds,
        },
    ));
    let flow = Arc::new(AuthFlow::new(store, authenticator, signer, metrics.clone()));

    let state = AppState { flow, metrics };

    let origins = config
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE, AUTHORIZATION]);

    let app = router(state).layer(cors);

    let ip: std::net::IpAddr = config.host.parse()?;
    let addr = SocketAddr::from((ip, config.port));

    println!("starting auth-service on {addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
