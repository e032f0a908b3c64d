use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Persistence seam for principal records. The credential-exchange flow only
/// ever reads by email and inserts; everything else about user storage lives
/// behind this trait.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;
    async fn insert(&self, record: UserRecord) -> Result<UserRecord>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn insert(&self, record: UserRecord) -> Result<UserRecord> {
        // Concurrent registrations of the same email are arbitrated by the
        // unique constraint on users.email, not by this read-then-insert flow.
        let inserted = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, email, password_hash, role, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, email, password_hash, role, created_at",
        )
        .bind(record.id)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(&record.role)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(inserted)
    }
}
