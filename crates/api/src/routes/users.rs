use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use infra::models::RegistrationRow;
use infra::repos::{HistoryEntry, RegistrationRepo, UpdateProfile, UserRepo};

use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;
use crate::types::{PublicUser, StatsResponse};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchHistoryEntry {
    #[serde(flatten)]
    pub registration: RegistrationRow,
    pub tournament: TournamentSummary,
    pub team_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSummary {
    pub name: String,
    pub game_type: String,
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub prize: i32,
}

impl From<HistoryEntry> for MatchHistoryEntry {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            tournament: TournamentSummary {
                name: entry.tournament_name,
                game_type: entry.tournament_game_type,
                status: entry.tournament_status,
                start_time: entry.tournament_start_time,
                prize: entry.tournament_prize,
            },
            team_name: entry.team_name,
            registration: entry.registration,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: PublicUser,
    pub registrations: Vec<MatchHistoryEntry>,
    pub stats: StatsResponse,
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MeResponse>, AppError> {
    let user_id = claims.user_id()?;

    let user = UserRepo::new(state.db.clone())
        .get_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    let repo = RegistrationRepo::new(state.db.clone());
    let history = repo.list_by_user(user_id).await?;
    let stats = repo.stats(user_id).await?;

    Ok(Json(MeResponse {
        user: user.into(),
        registrations: history.into_iter().map(Into::into).collect(),
        stats: stats.into(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeRequest {
    pub username: Option<String>,
    pub avatar: Option<String>,
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<UpdateMeRequest>,
) -> Result<Json<PublicUser>, AppError> {
    let user_id = claims.user_id()?;

    if let Some(username) = &body.username {
        if username.chars().count() < 3 {
            return Err(AppError::Validation(
                "username must be at least 3 characters".into(),
            ));
        }
    }

    let repo = UserRepo::new(state.db.clone());
    let user = repo
        .update_profile(
            user_id,
            UpdateProfile {
                username: body.username,
                avatar: body.avatar,
            },
        )
        .await
        .map_err(|e| {
            AppError::on_unique_violation(e, AppError::Conflict("username already taken".into()))
        })?
        .ok_or(AppError::NotFound("user"))?;

    Ok(Json(user.into()))
}

/// Public profile: no email, but full match history and derived stats.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub registrations: Vec<MatchHistoryEntry>,
    pub stats: StatsResponse,
}

pub async fn profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = UserRepo::new(state.db.clone())
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    let repo = RegistrationRepo::new(state.db.clone());
    let history = repo.list_by_user(id).await?;
    let stats = repo.stats(id).await?;

    Ok(Json(ProfileResponse {
        id: user.id,
        username: user.username,
        avatar: user.avatar,
        created_at: user.created_at,
        registrations: history.into_iter().map(Into::into).collect(),
        stats: stats.into(),
    }))
}
