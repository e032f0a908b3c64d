use anyhow::{bail, Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_seconds: i64,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

/// Reads service configuration from the environment. The signing secret and
/// token TTL are required: missing values abort startup rather than being
/// discovered on the first request.
pub fn load_config() -> Result<AuthServiceConfig> {
    let database_url = require_env("DATABASE_URL")?;
    let jwt_secret = require_env("JWT_SECRET")?;
    let token_ttl_seconds = require_env("JWT_TTL_SECONDS")?
        .parse::<i64>()
        .context("JWT_TTL_SECONDS must be an integer number of seconds")?;
    if token_ttl_seconds <= 0 {
        bail!("JWT_TTL_SECONDS must be positive, got {token_ttl_seconds}");
    }

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(8085);

    let allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
        .map(|value| parse_origins(&value))
        .unwrap_or_else(|_| default_origins());

    Ok(AuthServiceConfig {
        database_url,
        jwt_secret,
        token_ttl_seconds,
        host,
        port,
        allowed_origins,
    })
}

fn require_env(key: &str) -> Result<String> {
    let value = env::var(key).with_context(|| format!("{key} must be set"))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{key} must not be empty");
    }
    Ok(trimmed.to_string())
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter_map(|item| {
            let origin = item.trim();
            if origin.is_empty() {
                None
            } else {
                Some(origin.to_string())
            }
        })
        .collect()
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_origins_splits_and_trims() {
        let origins = parse_origins("http://a.example, http://b.example ,,");
        assert_eq!(origins, vec!["http://a.example", "http://b.example"]);
    }

    #[test]
    fn require_env_rejects_missing_and_blank() {
        std::env::remove_var("TEST_REQUIRED_MISSING");
        assert!(require_env("TEST_REQUIRED_MISSING").is_err());

        std::env::set_var("TEST_REQUIRED_BLANK", "   ");
        assert!(require_env("TEST_REQUIRED_BLANK").is_err());

        std::env::set_var("TEST_REQUIRED_SET", " value ");
        assert_eq!(require_env("TEST_REQUIRED_SET").unwrap(), "value");
    }
}
