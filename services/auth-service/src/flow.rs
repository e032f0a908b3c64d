use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use common_auth::roles::DEFAULT_ROLE;

use crate::metrics::AuthMetrics;
use crate::password::{hash_password, verify_password};
use crate::store::{UserRecord, UserStore};
use crate::tokens::{IssuedToken, TokenSigner};

/// Fixed caller-facing message for any credential failure. Deliberately does
/// not say whether the email or the password was wrong.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Internal reason a credential check failed. Used only to tag metrics;
/// callers always see the same `InvalidCredentials` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFailure {
    UnknownIdentity,
    BadSecret,
}

impl CredentialFailure {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnknownIdentity => "unknown_identity",
            Self::BadSecret => "bad_secret",
        }
    }
}

/// Collaborator that decides whether an (email, secret) pair is valid.
/// The outer `Result` is collaborator I/O failure; the inner one is the
/// credential verdict.
#[async_trait]
pub trait CredentialAuthenticator: Send + Sync {
    async fn authenticate(
        &self,
        email: &str,
        secret: &str,
    ) -> Result<Result<(), CredentialFailure>>;
}

/// Production authenticator: argon2 verification against the stored hash.
pub struct PasswordAuthenticator {
    store: Arc<dyn UserStore>,
}

impl PasswordAuthenticator {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialAuthenticator for PasswordAuthenticator {
    async fn authenticate(
        &self,
        email: &str,
        secret: &str,
    ) -> Result<Result<(), CredentialFailure>> {
        let record = match self.store.find_by_email(email).await? {
            Some(record) => record,
            None => return Ok(Err(CredentialFailure::UnknownIdentity)),
        };

        if verify_password(secret, &record.password_hash) {
            Ok(Ok(()))
        } else {
            Ok(Err(CredentialFailure::BadSecret))
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthFlowError {
    #[error("user with email '{0}' is already registered")]
    AlreadyRegistered(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Orchestrates the credential-exchange flows: registration (uniqueness
/// check + token issuance) and login (credential check + token issuance).
pub struct AuthFlow {
    store: Arc<dyn UserStore>,
    authenticator: Arc<dyn CredentialAuthenticator>,
    signer: Arc<TokenSigner>,
    metrics: Arc<AuthMetrics>,
}

impl AuthFlow {
    pub fn new(
        store: Arc<dyn UserStore>,
        authenticator: Arc<dyn CredentialAuthenticator>,
        signer: Arc<TokenSigner>,
        metrics: Arc<AuthMetrics>,
    ) -> Self {
        Self {
            store,
            authenticator,
            signer,
            metrics,
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<IssuedToken, AuthFlowError> {
        if self.store.find_by_email(email).await?.is_some() {
            self.metrics.register_failure("already_registered");
            warn!(email, "registration rejected: email already registered");
            return Err(AuthFlowError::AlreadyRegistered(email.to_string()));
        }

        let password_hash = hash_password(password)?;
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash,
            role: DEFAULT_ROLE.to_string(),
            created_at: Utc::now(),
        };
        let record = self.store.insert(record).await?;

        self.metrics.register_success();
        let issued = self.signer.issue(&record.email, &[record.role])?;
        Ok(issued)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AuthFlowError> {
        if let Err(failure) = self.authenticator.authenticate(email, password).await? {
            self.metrics.login_failure(failure.reason());
            warn!(email, reason = failure.reason(), "login rejected");
            return Err(AuthFlowError::InvalidCredentials);
        }

        let record = match self.store.find_by_email(email).await? {
            Some(record) => record,
            None => {
                // The credential check passed but the record is gone. Respond
                // exactly as a bad credential would, not as a distinct error.
                self.metrics.login_failure("missing_record");
                warn!(email, "login rejected: record missing after credential check");
                return Err(AuthFlowError::InvalidCredentials);
            }
        };

        let issued = self.signer.issue(&record.email, &[record.role])?;
        self.metrics.login_success();
        Ok(issued)
    }
}
