use axum::{extract::State, Extension, Json};
use serde::Serialize;

use infra::models::NotificationRow;
use infra::repos::NotificationRepo;

use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<NotificationRow>>, AppError> {
    let user_id = claims.user_id()?;

    let notifications = NotificationRepo::new(state.db.clone())
        .list_for_user(user_id)
        .await?;

    Ok(Json(notifications))
}

#[derive(Serialize)]
pub struct MarkReadResponse {
    pub message: String,
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MarkReadResponse>, AppError> {
    let user_id = claims.user_id()?;

    NotificationRepo::new(state.db.clone())
        .mark_all_read(user_id)
        .await?;

    Ok(Json(MarkReadResponse {
        message: "All notifications marked as read".into(),
    }))
}
