pub mod claims;
pub mod context;
pub mod error;
pub mod extractors;
pub mod roles;
pub mod verifier;

pub use claims::Claims;
pub use context::{authenticate, bearer_token, AuthenticatedPrincipal, SecurityContext};
pub use error::{AuthError, AuthResult};
pub use extractors::AuthContext;
pub use roles::{DEFAULT_ROLE, ROLE_ADMIN, ROLE_USER};
pub use verifier::JwtVerifier;
