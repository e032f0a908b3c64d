use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use auth_service::flow::{AuthFlow, PasswordAuthenticator};
use auth_service::metrics::AuthMetrics;
use auth_service::store::{UserRecord, UserStore};
use auth_service::tokens::{TokenConfig, TokenSigner};
use auth_service::AppState;

pub const TEST_SECRET: &[u8] = b"test-secret-test-secret-test-secret-42";

/// Store collaborator backed by a map, so exchange-flow tests run without
/// Postgres.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<String, UserRecord>>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.lock().unwrap().get(email).cloned())
    }

    async fn insert(&self, record: UserRecord) -> Result<UserRecord> {
        self.users
            .lock()
            .unwrap()
            .insert(record.email.clone(), record.clone());
        Ok(record)
    }
}

// Not every test binary touches every field.
#[allow(dead_code)]
pub struct TestHarness {
    pub state: AppState,
    pub flow: Arc<AuthFlow>,
    pub metrics: Arc<AuthMetrics>,
}

pub fn harness(ttl_seconds: i64) -> TestHarness {
    let store: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::default());
    let authenticator = Arc::new(PasswordAuthenticator::new(store.clone()));
    let signer = Arc::new(TokenSigner::new(TEST_SECRET, TokenConfig { ttl_seconds }));
    let metrics = Arc::new(AuthMetrics::new().expect("metrics"));
    let flow = Arc::new(AuthFlow::new(
        store,
        authenticator,
        signer,
        metrics.clone(),
    ));

    TestHarness {
        state: AppState {
            flow: flow.clone(),
            metrics: metrics.clone(),
        },
        flow,
        metrics,
    }
}
