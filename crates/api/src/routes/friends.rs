use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use infra::models::FriendshipRow;
use infra::repos::{FriendshipRepo, NotificationRepo, UserRepo};

use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendView {
    pub id: Uuid,
    pub friend: FriendSummary,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendSummary {
    pub id: Uuid,
    pub username: String,
    pub avatar: Option<String>,
}

/// Accepted friendships, each shaped as the other user.
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<FriendView>>, AppError> {
    let user_id = claims.user_id()?;

    let entries = FriendshipRepo::new(state.db.clone())
        .list_accepted(user_id)
        .await?;

    Ok(Json(
        entries
            .into_iter()
            .map(|e| FriendView {
                id: e.id,
                friend: FriendSummary {
                    id: e.friend_id,
                    username: e.friend_username,
                    avatar: e.friend_avatar,
                },
                created_at: e.created_at,
            })
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub friend_id: Uuid,
}

pub async fn request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<FriendRequest>,
) -> Result<(StatusCode, Json<FriendshipRow>), AppError> {
    let user_id = claims.user_id()?;

    if body.friend_id == user_id {
        return Err(AppError::Validation("cannot befriend yourself".into()));
    }

    UserRepo::new(state.db.clone())
        .get_by_id(body.friend_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    let repo = FriendshipRepo::new(state.db.clone());
    if repo.exists_between(user_id, body.friend_id).await? {
        return Err(AppError::Conflict("friend request already exists".into()));
    }

    let friendship = repo
        .create_request(user_id, body.friend_id)
        .await
        .map_err(|e| {
            AppError::on_unique_violation(
                e,
                AppError::Conflict("friend request already exists".into()),
            )
        })?;

    // Best-effort; the request stands even if the inbox write fails.
    if let Err(e) = NotificationRepo::new(state.db.clone())
        .create(
            body.friend_id,
            "New Friend Request",
            "You have a new friend request",
            "friend_request",
        )
        .await
    {
        tracing::warn!(error = %e, "failed to write friend request notification");
    }

    Ok((StatusCode::CREATED, Json(friendship)))
}
