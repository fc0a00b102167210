//! Authorization gates for report mutations.
//!
//! Gates run in this order and stop at the first failure:
//! - signed in: the auth middleware attached an [`AuthenticatedUser`]
//! - owner: the session subject equals the `userId` route parameter
//! - admin: the session carries the admin role

use std::collections::HashMap;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

/// Route parameter naming the user a mutation is performed for
pub const USER_ID_PARAM: &str = "userId";

async fn authorized_owner<S>(parts: &mut Parts, state: &S) -> Result<AuthenticatedUser, AppError>
where
    S: Send + Sync,
{
    let user = AuthenticatedUser::from_request_parts(parts, state).await?;

    let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
        .await
        .map_err(|_| AppError::Forbidden("Access denied".to_string()))?;

    match params.get(USER_ID_PARAM) {
        Some(user_id) if user.owns(user_id) => Ok(user),
        _ => Err(AppError::Forbidden("Access denied".to_string())),
    }
}

/// Guard for signed-in callers acting on their own behalf.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireOwner(user): RequireOwner) { ... }
/// ```
pub struct RequireOwner(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireOwner
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authorized_owner(parts, state).await.map(RequireOwner)
    }
}

/// Guard for signed-in admins acting on their own behalf.
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = authorized_owner(parts, state).await?;

        if !user.is_admin() {
            return Err(AppError::Forbidden(
                "Admin resource! Access denied".to_string(),
            ));
        }

        Ok(RequireAdmin(user))
    }
}
