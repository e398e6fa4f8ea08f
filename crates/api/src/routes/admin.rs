use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::types::Json as SqlJson;
use uuid::Uuid;

use infra::models::{RegistrationRow, Teammate, TournamentRow, TournamentWithCounts};
use infra::repos::{
    CreateTournament, RegistrationRepo, ResultEntry, TournamentRepo, UpdateTournament,
};

use crate::auth::{require_admin, Claims};
use crate::error::AppError;
use crate::routes::tournaments::MessageResponse;
use crate::state::AppState;
use crate::types::{GameType, TournamentStatus};

#[derive(Serialize)]
pub struct AdminListResponse {
    pub tournaments: Vec<TournamentWithCounts>,
}

/// Admin listing, newest-created first.
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<AdminListResponse>, AppError> {
    require_admin(&state, &claims).await?;

    let tournaments = TournamentRepo::new(state.db.clone()).list_admin().await?;
    Ok(Json(AdminListResponse { tournaments }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTournamentRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub game_type: GameType,
    pub prize: i32,
    pub start_time: String,
    pub end_time: Option<String>,
    pub max_teams: i32,
    pub status: Option<TournamentStatus>,
    pub image_url: Option<String>,
}

#[derive(Serialize)]
pub struct TournamentResponse {
    pub tournament: TournamentRow,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateTournamentRequest>,
) -> Result<(StatusCode, Json<TournamentResponse>), AppError> {
    require_admin(&state, &claims).await?;

    if body.name.trim().chars().count() < 3 {
        return Err(AppError::Validation(
            "tournament name must be at least 3 characters".into(),
        ));
    }
    if body.prize < 0 {
        return Err(AppError::Validation("prize must not be negative".into()));
    }
    if body.max_teams < 2 {
        return Err(AppError::Validation("maxTeams must be at least 2".into()));
    }

    let start_time = parse_datetime(&body.start_time)?;
    let end_time = body.end_time.as_deref().map(parse_datetime).transpose()?;

    let tournament = TournamentRepo::new(state.db.clone())
        .create(CreateTournament {
            name: body.name,
            description: body.description,
            game_type: body.game_type.as_str().to_string(),
            prize: body.prize,
            start_time,
            end_time,
            max_teams: body.max_teams,
            status: body.status.unwrap_or_default().as_str().to_string(),
            image_url: body.image_url,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(TournamentResponse { tournament })))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminTournamentDetail {
    #[serde(flatten)]
    pub tournament: TournamentRow,
    pub registrations: Vec<AdminRegistration>,
    pub registration_count: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRegistration {
    #[serde(flatten)]
    pub registration: RegistrationRow,
    pub user: AdminUserSummary,
    pub team: Option<AdminTeamSummary>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminTeamSummary {
    pub name: String,
    pub teammates: Vec<Teammate>,
}

pub async fn get(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminTournamentDetail>, AppError> {
    require_admin(&state, &claims).await?;

    let tournament = TournamentRepo::new(state.db.clone())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("tournament"))?;

    let registrations = roster(&state, id).await?;
    let registration_count = registrations.len() as i64;

    Ok(Json(AdminTournamentDetail {
        tournament,
        registrations,
        registration_count,
    }))
}

#[derive(Serialize)]
pub struct RegistrationsResponse {
    pub registrations: Vec<AdminRegistration>,
}

/// Roster for the settlement screen, newest registrations first.
pub async fn registrations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<RegistrationsResponse>, AppError> {
    require_admin(&state, &claims).await?;

    TournamentRepo::new(state.db.clone())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("tournament"))?;

    let registrations = roster(&state, id).await?;
    Ok(Json(RegistrationsResponse { registrations }))
}

async fn roster(state: &AppState, tournament_id: Uuid) -> Result<Vec<AdminRegistration>, AppError> {
    let entries = RegistrationRepo::new(state.db.clone())
        .list_by_tournament(tournament_id)
        .await?;

    Ok(entries
        .into_iter()
        .map(|e| AdminRegistration {
            user: AdminUserSummary {
                id: e.registration.user_id,
                username: e.username,
                email: e.email,
                avatar: e.avatar,
            },
            team: e.team_name.map(|name| AdminTeamSummary {
                name,
                teammates: e.team_teammates.map(|SqlJson(t)| t).unwrap_or_default(),
            }),
            registration: e.registration,
        })
        .collect())
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTournamentRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub game_type: Option<GameType>,
    pub prize: Option<i32>,
    pub start_time: Option<String>,
    // absent = keep, null = clear
    #[serde(default, deserialize_with = "double_option")]
    pub end_time: Option<Option<String>>,
    pub max_teams: Option<i32>,
    pub status: Option<TournamentStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
}

pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTournamentRequest>,
) -> Result<Json<TournamentResponse>, AppError> {
    require_admin(&state, &claims).await?;

    if let Some(name) = &body.name {
        if name.trim().chars().count() < 3 {
            return Err(AppError::Validation(
                "tournament name must be at least 3 characters".into(),
            ));
        }
    }
    if matches!(body.prize, Some(p) if p < 0) {
        return Err(AppError::Validation("prize must not be negative".into()));
    }
    if matches!(body.max_teams, Some(m) if m < 2) {
        return Err(AppError::Validation("maxTeams must be at least 2".into()));
    }

    let start_time = body.start_time.as_deref().map(parse_datetime).transpose()?;
    let end_time = match body.end_time {
        Some(Some(raw)) => Some(Some(parse_datetime(&raw)?)),
        Some(None) => Some(None),
        None => None,
    };

    let tournament = TournamentRepo::new(state.db.clone())
        .update(
            id,
            UpdateTournament {
                name: body.name,
                description: body.description,
                game_type: body.game_type.map(|t| t.as_str().to_string()),
                prize: body.prize,
                start_time,
                end_time,
                max_teams: body.max_teams,
                status: body.status.map(|s| s.as_str().to_string()),
                image_url: body.image_url,
            },
        )
        .await?
        .ok_or(AppError::NotFound("tournament"))?;

    Ok(Json(TournamentResponse { tournament }))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    require_admin(&state, &claims).await?;

    let deleted = TournamentRepo::new(state.db.clone()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("tournament"));
    }

    Ok(Json(MessageResponse {
        message: "Tournament deleted successfully".into(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsRequest {
    pub results: Vec<ResultItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    pub registration_id: Uuid,
    pub placement: Option<i32>,
    pub earnings: Option<i32>,
}

/// Settlement: the whole batch commits or none of it does. Every entry must
/// target a registration of this tournament.
pub async fn record_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(body): Json<ResultsRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    require_admin(&state, &claims).await?;

    TournamentRepo::new(state.db.clone())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("tournament"))?;

    let entries: Vec<ResultEntry> = body
        .results
        .into_iter()
        .map(|r| ResultEntry {
            registration_id: r.registration_id,
            placement: r.placement,
            earnings: r.earnings,
        })
        .collect();

    RegistrationRepo::new(state.db.clone())
        .record_results(id, entries)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound("registration"),
            other => AppError::Db(other),
        })?;

    Ok(Json(MessageResponse {
        message: "Results updated successfully".into(),
    }))
}

fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::Validation(format!("invalid datetime: {raw}")))
}

/// Distinguishes an absent field from an explicit null in PATCH bodies.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
