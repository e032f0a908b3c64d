pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Role granted to newly registered accounts.
pub const DEFAULT_ROLE: &str = ROLE_USER;
