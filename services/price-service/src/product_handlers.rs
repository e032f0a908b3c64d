use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use common_auth::{AuthContext, ROLE_ADMIN};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::api_error::ApiError;
use crate::app_state::AppState;

/// One tracked product: the price seen for it when it was last checked.
/// Refreshing `current_price` is the crawler's job, not this service's.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductObservation {
    pub id: Uuid,
    pub product_name: String,
    pub product_url: String,
    pub user_email: String,
    pub current_price: Option<BigDecimal>,
    pub last_checked_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewObservation {
    pub product_name: String,
    pub product_url: String,
    #[serde(default)]
    pub current_price: Option<BigDecimal>,
}

fn validate_observation(request: &NewObservation) -> Result<(), ApiError> {
    if request.product_name.trim().is_empty() {
        return Err(ApiError::validation("product_name: must not be blank"));
    }
    if request.product_url.trim().is_empty() {
        return Err(ApiError::validation("product_url: must not be blank"));
    }
    Ok(())
}

fn can_access(auth: &AuthContext, observation: &ProductObservation) -> bool {
    observation.user_email == auth.subject() || auth.has_role(ROLE_ADMIN)
}

pub async fn list_observations(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<ProductObservation>>, ApiError> {
    let observations = sqlx::query_as::<_, ProductObservation>(
        "SELECT id, product_name, product_url, user_email, current_price, last_checked_at
         FROM product_observations WHERE user_email = $1 ORDER BY last_checked_at DESC",
    )
    .bind(auth.subject())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(observations))
}

pub async fn get_observation(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductObservation>, ApiError> {
    let observation = fetch_observation(&state, id).await?;

    // A foreign observation is indistinguishable from a missing one.
    if !can_access(&auth, &observation) {
        return Err(ApiError::not_found(id));
    }

    Ok(Json(observation))
}

pub async fn create_observation(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<NewObservation>,
) -> Result<Json<ProductObservation>, ApiError> {
    validate_observation(&request)?;

    let observation = sqlx::query_as::<_, ProductObservation>(
        "INSERT INTO product_observations (id, product_name, product_url, user_email, current_price, last_checked_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, product_name, product_url, user_email, current_price, last_checked_at",
    )
    .bind(Uuid::new_v4())
    .bind(request.product_name.trim())
    .bind(request.product_url.trim())
    .bind(auth.subject())
    .bind(request.current_price)
    .bind(Utc::now())
    .fetch_one(&state.db)
    .await?;

    Ok(Json(observation))
}

pub async fn delete_observation(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let observation = fetch_observation(&state, id).await?;
    if !can_access(&auth, &observation) {
        return Err(ApiError::not_found(id));
    }

    sqlx::query("DELETE FROM product_observations WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_observation(state: &AppState, id: Uuid) -> Result<ProductObservation, ApiError> {
    sqlx::query_as::<_, ProductObservation>(
        "SELECT id, product_name, product_url, user_email, current_price, last_checked_at
         FROM product_observations WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_auth::AuthenticatedPrincipal;

    fn auth(subject: &str, roles: &[&str]) -> AuthContext {
        AuthContext {
            principal: AuthenticatedPrincipal {
                subject: subject.to_string(),
                roles: roles.iter().map(|role| role.to_string()).collect(),
            },
        }
    }

    fn observation(owner: &str) -> ProductObservation {
        ProductObservation {
            id: Uuid::new_v4(),
            product_name: "Test Product".to_string(),
            product_url: "http://example.com/product".to_string(),
            user_email: owner.to_string(),
            current_price: None,
            last_checked_at: Utc::now(),
        }
    }

    #[test]
    fn owner_and_admin_can_access() {
        let record = observation("a@x.com");
        assert!(can_access(&auth("a@x.com", &["user"]), &record));
        assert!(can_access(&auth("other@x.com", &["admin"]), &record));
        assert!(!can_access(&auth("other@x.com", &["user"]), &record));
    }

    #[test]
    fn validation_rejects_blank_fields() {
        let blank_name = NewObservation {
            product_name: "  ".to_string(),
            product_url: "http://example.com".to_string(),
            current_price: None,
        };
        assert!(validate_observation(&blank_name).is_err());

        let blank_url = NewObservation {
            product_name: "Test Product".to_string(),
            product_url: String::new(),
            current_price: None,
        };
        assert!(validate_observation(&blank_url).is_err());

        let valid = NewObservation {
            product_name: "Test Product".to_string(),
            product_url: "http://example.com".to_string(),
            current_price: None,
        };
        assert!(validate_observation(&valid).is_ok());
    }
}
