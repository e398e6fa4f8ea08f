use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use infra::models::UserRow;
use infra::repos::PlayerStats;

/// Tournament format. Stored as its display string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameType {
    Solo,
    Duo,
    Squad,
}

impl GameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Solo => "Solo",
            GameType::Duo => "Duo",
            GameType::Squad => "Squad",
        }
    }
}

/// Admin-settable lifecycle label. Any status may be set to any other via
/// an edit; there is no guarded transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentStatus {
    Open,
    Registering,
    #[serde(rename = "Last Call")]
    LastCall,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Open => "Open",
            TournamentStatus::Registering => "Registering",
            TournamentStatus::LastCall => "Last Call",
            TournamentStatus::InProgress => "In Progress",
            TournamentStatus::Completed => "Completed",
        }
    }
}

impl Default for TournamentStatus {
    fn default() -> Self {
        TournamentStatus::Open
    }
}

/// Account shape safe to hand to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub avatar: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for PublicUser {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            username: row.username,
            avatar: row.avatar,
            is_admin: row.is_admin,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub tournaments_played: i64,
    pub tournaments_won: i64,
    pub win_rate: f64,
    pub total_earnings: i64,
}

impl From<PlayerStats> for StatsResponse {
    fn from(stats: PlayerStats) -> Self {
        Self {
            tournaments_played: stats.tournaments_played,
            tournaments_won: stats.tournaments_won,
            win_rate: stats.win_rate,
            total_earnings: stats.total_earnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TournamentStatus;

    #[test]
    fn spaced_statuses_round_trip_through_their_display_strings() {
        let last_call: TournamentStatus = serde_json::from_str("\"Last Call\"").unwrap();
        assert_eq!(last_call, TournamentStatus::LastCall);
        assert_eq!(last_call.as_str(), "Last Call");

        let in_progress: TournamentStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(in_progress.as_str(), "In Progress");
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(serde_json::from_str::<TournamentStatus>("\"Cancelled\"").is_err());
    }
}
