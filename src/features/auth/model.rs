use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Admin role name carried in session tokens
pub const ROLE_ADMIN: &str = "admin";

/// Identity of the signed-in caller, attached to the request by the auth middleware
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// User id the session was issued for
    pub sub: String,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Check if user may mutate or remove existing reports
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// Check if the session belongs to the given user id
    pub fn owns(&self, user_id: &str) -> bool {
        self.sub == user_id
    }
}
