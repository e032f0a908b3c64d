use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use tracing::debug;

use crate::claims::Claims;
use crate::error::AuthResult;

/// Stateless verifier for HS256 tokens signed with the shared service secret.
///
/// Verification is a pure function of the raw token, the secret, and the
/// clock: no I/O, no interior mutability, safe to call concurrently.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is enforced exactly; callers opt in to skew tolerance.
        validation.leeway = 0;
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Allow the given clock skew in seconds when validating `exp`.
    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.validation.leeway = seconds;
        self
    }

    /// Checks structure and signature before trusting any claim value, then
    /// converts the payload into [`Claims`].
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let token_data = decode::<Value>(token, &self.decoding_key, &self.validation)?;
        let claims = Claims::try_from(token_data.claims)?;
        debug!(subject = %claims.subject, "verified JWT successfully");
        Ok(claims)
    }

    pub fn extract_subject(&self, token: &str) -> AuthResult<String> {
        self.verify(token).map(|claims| claims.subject)
    }

    /// Empty when the token carries no `roles` claim.
    pub fn extract_roles(&self, token: &str) -> AuthResult<Vec<String>> {
        self.verify(token).map(|claims| claims.roles)
    }

    /// `true` iff [`verify`](Self::verify) would succeed. Never errors.
    pub fn is_usable(&self, token: &str) -> bool {
        self.verify(token).is_ok()
    }
}
