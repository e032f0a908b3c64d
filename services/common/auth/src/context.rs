use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::verifier::JwtVerifier;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity and role set of a verified caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub subject: String,
    pub roles: Vec<String>,
}

/// Request-scoped holder of the authenticated principal, carried in request
/// extensions. Created empty, set at most once per request, and discarded
/// with the request; it never outlives or leaks across requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    principal: Option<AuthenticatedPrincipal>,
}

impl SecurityContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(principal: AuthenticatedPrincipal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&AuthenticatedPrincipal> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

/// Extracts the raw token from an `Authorization: Bearer <token>` header.
///
/// The scheme comparison is case-sensitive and requires the exact prefix
/// `"Bearer "`; anything else is treated as if no token were presented.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix(BEARER_PREFIX)?;
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Resolves a raw token candidate into a request context.
///
/// Every verification failure collapses into the anonymous context: absence
/// of authentication is an expected outcome here, not an error. Downstream
/// authorization decides whether to reject the request.
pub fn resolve_token(verifier: &JwtVerifier, token: &str) -> SecurityContext {
    let subject = match verifier.extract_subject(token) {
        Ok(subject) if !subject.is_empty() => subject,
        Ok(_) => return SecurityContext::anonymous(),
        Err(err) => {
            debug!(%err, "rejected bearer token");
            return SecurityContext::anonymous();
        }
    };

    let roles = match verifier.extract_roles(token) {
        Ok(roles) => roles,
        Err(err) => {
            debug!(%err, "rejected bearer token roles");
            return SecurityContext::anonymous();
        }
    };

    if verifier.is_usable(token) {
        SecurityContext::authenticated(AuthenticatedPrincipal { subject, roles })
    } else {
        SecurityContext::anonymous()
    }
}

/// Per-request authentication middleware.
///
/// Populates the [`SecurityContext`] extension from a bearer token when one
/// verifies, and otherwise passes the request through untouched. This layer
/// never terminates a request: handlers that require a principal reject via
/// the [`AuthContext`](crate::AuthContext) extractor.
pub async fn authenticate(
    State(verifier): State<Arc<JwtVerifier>>,
    mut request: Request,
    next: Next,
) -> Response {
    // An earlier stage of this request's pipeline may already have
    // authenticated it; never overwrite an existing principal.
    if request
        .extensions()
        .get::<SecurityContext>()
        .is_some_and(SecurityContext::is_authenticated)
    {
        return next.run(request).await;
    }

    let context = match bearer_token(request.headers()) {
        Some(token) => resolve_token(&verifier, token),
        // No token candidate: the verifier is not consulted at all.
        None => return next.run(request).await,
    };

    if context.is_authenticated() {
        request.extensions_mut().insert(context);
    }

    next.run(request).await
}
