use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use infra::models::{RegistrationRow, TeamRow, Teammate, TournamentRow, TournamentWithCounts};
use infra::repos::{
    NotificationRepo, RegistrationRepo, TeamRepo, TournamentFilter, TournamentRepo, UserRepo,
};

use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;
use crate::types::{GameType, TournamentStatus};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub game_type: Option<GameType>,
    pub status: Option<TournamentStatus>,
}

#[derive(Serialize)]
pub struct ListResponse {
    pub tournaments: Vec<TournamentWithCounts>,
}

/// Public listing, upcoming tournaments first.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, AppError> {
    let repo = TournamentRepo::new(state.db.clone());
    let tournaments = repo
        .list(TournamentFilter {
            game_type: query.game_type.map(|t| t.as_str().to_string()),
            status: query.status.map(|s| s.as_str().to_string()),
        })
        .await?;

    Ok(Json(ListResponse { tournaments }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub avatar: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetail {
    pub id: Uuid,
    pub name: String,
    pub leader: UserSummary,
    pub teammates: Vec<Teammate>,
    pub registrations: Vec<TeamRegistration>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRegistration {
    #[serde(flatten)]
    pub registration: RegistrationRow,
    pub user: UserSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentDetail {
    #[serde(flatten)]
    pub tournament: TournamentRow,
    pub teams: Vec<TeamDetail>,
    pub registration_count: i64,
}

/// Public tournament page: the tournament, its teams with leaders and
/// teammate lists, and each team's registrations. Room codes stay out of
/// this payload.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TournamentDetail>, AppError> {
    let tournament = TournamentRepo::new(state.db.clone())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("tournament"))?;

    let teams = TeamRepo::new(state.db.clone()).list_by_tournament(id).await?;
    let roster = RegistrationRepo::new(state.db.clone())
        .list_by_tournament(id)
        .await?;
    let registration_count = roster.len() as i64;

    let mut by_team: HashMap<Uuid, Vec<TeamRegistration>> = HashMap::new();
    for entry in roster {
        let Some(team_id) = entry.registration.team_id else {
            continue;
        };
        by_team.entry(team_id).or_default().push(TeamRegistration {
            user: UserSummary {
                id: entry.registration.user_id,
                username: entry.username,
                avatar: entry.avatar,
            },
            registration: entry.registration,
        });
    }

    let teams = teams
        .into_iter()
        .map(|team| TeamDetail {
            registrations: by_team.remove(&team.id).unwrap_or_default(),
            id: team.id,
            name: team.name,
            leader: UserSummary {
                id: team.leader_id,
                username: team.leader_username,
                avatar: team.leader_avatar,
            },
            teammates: team.teammates.0,
            created_at: team.created_at,
        })
        .collect();

    Ok(Json(TournamentDetail {
        tournament,
        teams,
        registration_count,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTeamRequest {
    pub tournament_id: Option<Uuid>,
    pub team_name: Option<String>,
    #[serde(default)]
    pub teammates: Vec<Teammate>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTeamResponse {
    pub team: TeamRow,
    pub registration: RegistrationRow,
    /// Shown exactly once; no read path re-exposes it.
    pub room_code: String,
}

/// The registration engine entry point: one transaction creating the team
/// (with its room code) and the leader's registration. Duplicate attempts
/// are rejected by the storage-level UNIQUE constraint, not a pre-check.
pub async fn register_team(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<RegisterTeamRequest>,
) -> Result<Json<RegisterTeamResponse>, AppError> {
    let user_id = claims.user_id()?;
    let tournament_id = body
        .tournament_id
        .ok_or_else(|| AppError::Validation("tournament ID is required".into()))?;

    let user = UserRepo::new(state.db.clone())
        .get_by_id(user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let tournament = TournamentRepo::new(state.db.clone())
        .get(tournament_id)
        .await?
        .ok_or(AppError::NotFound("tournament"))?;

    let team_name = match body.team_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => format!("{}'s Team", user.username),
    };

    let (team, registration) = RegistrationRepo::new(state.db.clone())
        .register_team(user_id, tournament_id, team_name, body.teammates)
        .await
        .map_err(|e| AppError::on_unique_violation(e, AppError::AlreadyRegistered))?;

    notify_registered(&state, user_id, &tournament.name).await;

    let room_code = team.room_code.clone();
    Ok(Json(RegisterTeamResponse {
        team,
        registration,
        room_code,
    }))
}

#[derive(Debug, Deserialize, Default)]
pub struct SoloRegisterRequest {
    pub role: Option<String>,
}

/// Solo entry into a tournament, no team attached.
pub async fn register_solo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(body): Json<SoloRegisterRequest>,
) -> Result<(StatusCode, Json<RegistrationRow>), AppError> {
    let user_id = claims.user_id()?;

    let tournament = TournamentRepo::new(state.db.clone())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("tournament"))?;

    let role = body.role.unwrap_or_else(|| "Solo".into());
    let registration = RegistrationRepo::new(state.db.clone())
        .register_solo(user_id, id, role)
        .await
        .map_err(|e| AppError::on_unique_violation(e, AppError::AlreadyRegistered))?;

    notify_registered(&state, user_id, &tournament.name).await;

    Ok((StatusCode::CREATED, Json(registration)))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn unregister(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let user_id = claims.user_id()?;

    let removed = RegistrationRepo::new(state.db.clone())
        .unregister(user_id, id)
        .await?;
    if !removed {
        return Err(AppError::NotFound("registration"));
    }

    Ok(Json(MessageResponse {
        message: "Unregistered successfully".into(),
    }))
}

/// Best-effort confirmation; a failed notification never unwinds a
/// committed registration.
async fn notify_registered(state: &AppState, user_id: Uuid, tournament_name: &str) {
    let repo = NotificationRepo::new(state.db.clone());
    let content = format!(
        "You have successfully registered for {}",
        tournament_name
    );
    if let Err(e) = repo
        .create(
            user_id,
            "Tournament Registration Successful",
            &content,
            "tournament",
        )
        .await
    {
        tracing::warn!(error = %e, %user_id, "failed to write registration notification");
    }
}
