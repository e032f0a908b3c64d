use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::context::{AuthenticatedPrincipal, SecurityContext};
use crate::error::AuthError;

/// Extractor for handlers that require an authenticated caller.
///
/// Reads the [`SecurityContext`] populated by the authentication middleware;
/// an unauthenticated request is rejected here, not in the middleware.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub principal: AuthenticatedPrincipal,
}

impl AuthContext {
    pub fn subject(&self) -> &str {
        &self.principal.subject
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.principal.roles.iter().any(|value| value == role)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<SecurityContext>()
            .and_then(|context| context.principal().cloned());

        match principal {
            Some(principal) => Ok(Self { principal }),
            // A header was presented but did not yield a principal: wrong
            // scheme, or a token that failed verification.
            None if parts.headers.contains_key(AUTHORIZATION) => {
                Err(AuthError::InvalidAuthorization)
            }
            None => Err(AuthError::MissingAuthorization),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    fn parts_with(context: Option<SecurityContext>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(context) = context {
            builder = builder.extension(context);
        }
        builder.body(Body::empty()).unwrap().into_parts().0
    }

    fn parts_with_header(value: &str) -> Parts {
        Request::builder()
            .uri("/")
            .header(AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn extracts_authenticated_principal() {
        let context = SecurityContext::authenticated(AuthenticatedPrincipal {
            subject: "a@x.com".to_string(),
            roles: vec!["user".to_string()],
        });
        let mut parts = parts_with(Some(context));

        let auth = AuthContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(auth.subject(), "a@x.com");
        assert!(auth.has_role("user"));
        assert!(!auth.has_role("admin"));
    }

    #[tokio::test]
    async fn rejects_missing_context() {
        let mut parts = parts_with(None);
        let err = AuthContext::from_request_parts(&mut parts, &())
            .await
            .expect_err("should reject");
        assert!(matches!(err, AuthError::MissingAuthorization));
    }

    #[tokio::test]
    async fn rejects_anonymous_context() {
        let mut parts = parts_with(Some(SecurityContext::anonymous()));
        let err = AuthContext::from_request_parts(&mut parts, &())
            .await
            .expect_err("should reject");
        assert!(matches!(err, AuthError::MissingAuthorization));
    }

    #[tokio::test]
    async fn distinguishes_presented_but_unusable_header() {
        // Wrong scheme or a failed token leaves no principal behind, but the
        // rejection should name the header as malformed rather than missing.
        let mut parts = parts_with_header("Basic xyz");
        let err = AuthContext::from_request_parts(&mut parts, &())
            .await
            .expect_err("should reject");
        assert!(matches!(err, AuthError::InvalidAuthorization));
    }
}
