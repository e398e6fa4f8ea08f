use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, Result};
use uuid::Uuid;

use crate::db::Db;
use crate::models::Teammate;

/// Team as exposed on public tournament pages. The room code column is
/// intentionally not selected anywhere here: it is disclosed once, at
/// registration time, and never again.
#[derive(Debug, Clone, FromRow)]
pub struct TeamWithLeader {
    pub id: Uuid,
    pub name: String,
    pub tournament_id: Uuid,
    pub leader_id: Uuid,
    pub teammates: Json<Vec<Teammate>>,
    pub created_at: DateTime<Utc>,
    pub leader_username: String,
    pub leader_avatar: Option<String>,
}

pub struct TeamRepo {
    db: Db,
}

impl TeamRepo {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn list_by_tournament(&self, tournament_id: Uuid) -> Result<Vec<TeamWithLeader>> {
        sqlx::query_as::<_, TeamWithLeader>(
            r#"
            SELECT tm.id, tm.name, tm.tournament_id, tm.leader_id, tm.teammates,
                   tm.created_at,
                   u.username AS leader_username, u.avatar AS leader_avatar
            FROM teams tm
            JOIN users u ON u.id = tm.leader_id
            WHERE tm.tournament_id = $1
            ORDER BY tm.created_at ASC
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.db)
        .await
    }
}
