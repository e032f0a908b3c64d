use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

pub struct TokenConfig {
    pub ttl_seconds: i64,
}

/// Issues HS256 access tokens under the secret shared with every verifying
/// service. Stateless: nothing is persisted at issuance.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    config: TokenConfig,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: i64,
    pub token_type: &'static str,
}

#[derive(Serialize)]
struct AccessClaims<'a> {
    sub: &'a str,
    roles: &'a [String],
    exp: i64,
    iat: i64,
}

impl TokenSigner {
    pub fn new(secret: &[u8], config: TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            config,
        }
    }

    pub fn issue(&self, subject: &str, roles: &[String]) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.config.ttl_seconds);

        let claims = AccessClaims {
            sub: subject,
            roles,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to sign access token")?;

        Ok(IssuedToken {
            token,
            expires_at,
            expires_in: self.config.ttl_seconds,
            token_type: "Bearer",
        })
    }
}
