use uuid::Uuid;

use infra::repos::UserRepo;

use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;

/// Gate for admin-only routes. The token's `is_admin` claim is never
/// trusted on its own: the flag is re-read from the users table so a
/// demotion takes effect immediately, stale tokens included.
///
/// Fails closed: unauthenticated callers never reach this (the JWT layer
/// rejects them with 401); an authenticated non-admin gets 403.
pub async fn require_admin(state: &AppState, claims: &Claims) -> Result<Uuid, AppError> {
    let user_id = claims.user_id()?;

    let repo = UserRepo::new(state.db.clone());
    if !repo.is_admin(user_id).await? {
        return Err(AppError::Forbidden);
    }

    Ok(user_id)
}
