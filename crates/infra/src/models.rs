use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    // never leaves the server even if a row is serialized directly
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub avatar: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub game_type: String,
    pub prize: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub max_teams: i32,
    pub status: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Tournament annotated with registration/team counts for listing pages.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentWithCounts {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub tournament: TournamentRow,
    pub registration_count: i64,
    pub team_count: i64,
}

/// A teammate slot on a team. These are free-form entries, not validated
/// against user accounts; squads routinely include players without one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teammate {
    pub name: String,
    pub uid: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRow {
    pub id: Uuid,
    pub name: String,
    pub tournament_id: Uuid,
    pub leader_id: Uuid,
    pub room_code: String,
    pub teammates: Json<Vec<Teammate>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tournament_id: Uuid,
    pub team_id: Option<Uuid>,
    pub role: String,
    pub status: String,
    pub placement: Option<i32>,
    pub earnings: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub friend_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub kind: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
