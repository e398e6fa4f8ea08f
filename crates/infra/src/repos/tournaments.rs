use chrono::{DateTime, Utc};
use sqlx::Result as SqlxResult;
use uuid::Uuid;

use crate::{
    db::Db,
    models::{TournamentRow, TournamentWithCounts},
};

#[derive(Debug, Clone, Default)]
pub struct TournamentFilter {
    pub game_type: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateTournament {
    pub name: String,
    pub description: Option<String>,
    pub game_type: String,
    pub prize: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub max_teams: i32,
    pub status: String,
    pub image_url: Option<String>,
}

/// Partial update; `None` fields keep their current value. `end_time` and
/// `image_url` are double-wrapped so a patch can also clear them.
#[derive(Debug, Clone, Default)]
pub struct UpdateTournament {
    pub name: Option<String>,
    pub description: Option<String>,
    pub game_type: Option<String>,
    pub prize: Option<i32>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<Option<DateTime<Utc>>>,
    pub max_teams: Option<i32>,
    pub status: Option<String>,
    pub image_url: Option<Option<String>>,
}

#[derive(Clone)]
pub struct TournamentRepo {
    pool: Db,
}

impl TournamentRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    pub async fn create(&self, data: CreateTournament) -> SqlxResult<TournamentRow> {
        sqlx::query_as::<_, TournamentRow>(
            r#"
            INSERT INTO tournaments
                (name, description, game_type, prize, start_time, end_time,
                 max_teams, status, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, description, game_type, prize, start_time, end_time,
                      max_teams, status, image_url, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.game_type)
        .bind(data.prize)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.max_teams)
        .bind(data.status)
        .bind(data.image_url)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get(&self, id: Uuid) -> SqlxResult<Option<TournamentRow>> {
        sqlx::query_as::<_, TournamentRow>(
            r#"
            SELECT id, name, description, game_type, prize, start_time, end_time,
                   max_teams, status, image_url, created_at
            FROM tournaments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Public listing: upcoming-first, annotated with how many registrations
    /// and teams each tournament has.
    pub async fn list(&self, filter: TournamentFilter) -> SqlxResult<Vec<TournamentWithCounts>> {
        // Dynamic WHERE using COALESCE pattern to keep a single prepared statement
        sqlx::query_as::<_, TournamentWithCounts>(
            r#"
            SELECT t.id, t.name, t.description, t.game_type, t.prize, t.start_time,
                   t.end_time, t.max_teams, t.status, t.image_url, t.created_at,
                   (SELECT COUNT(*) FROM registrations r WHERE r.tournament_id = t.id) AS registration_count,
                   (SELECT COUNT(*) FROM teams tm WHERE tm.tournament_id = t.id) AS team_count
            FROM tournaments t
            WHERE ($1::text IS NULL OR t.game_type = $1)
              AND ($2::text IS NULL OR t.status = $2)
            ORDER BY t.start_time ASC
            "#,
        )
        .bind(filter.game_type)
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await
    }

    /// Admin listing: newest-created first, same count annotations.
    pub async fn list_admin(&self) -> SqlxResult<Vec<TournamentWithCounts>> {
        sqlx::query_as::<_, TournamentWithCounts>(
            r#"
            SELECT t.id, t.name, t.description, t.game_type, t.prize, t.start_time,
                   t.end_time, t.max_teams, t.status, t.image_url, t.created_at,
                   (SELECT COUNT(*) FROM registrations r WHERE r.tournament_id = t.id) AS registration_count,
                   (SELECT COUNT(*) FROM teams tm WHERE tm.tournament_id = t.id) AS team_count
            FROM tournaments t
            ORDER BY t.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn update(&self, id: Uuid, data: UpdateTournament) -> SqlxResult<Option<TournamentRow>> {
        sqlx::query_as::<_, TournamentRow>(
            r#"
            UPDATE tournaments
            SET name        = COALESCE($2, name),
                description = COALESCE($3, description),
                game_type   = COALESCE($4, game_type),
                prize       = COALESCE($5, prize),
                start_time  = COALESCE($6, start_time),
                end_time    = CASE WHEN $7 THEN $8 ELSE end_time END,
                max_teams   = COALESCE($9, max_teams),
                status      = COALESCE($10, status),
                image_url   = CASE WHEN $11 THEN $12 ELSE image_url END
            WHERE id = $1
            RETURNING id, name, description, game_type, prize, start_time, end_time,
                      max_teams, status, image_url, created_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.game_type)
        .bind(data.prize)
        .bind(data.start_time)
        .bind(data.end_time.is_some())
        .bind(data.end_time.flatten())
        .bind(data.max_teams)
        .bind(data.status)
        .bind(data.image_url.is_some())
        .bind(data.image_url.flatten())
        .fetch_optional(&self.pool)
        .await
    }

    /// Teams and registrations go with it via ON DELETE CASCADE.
    pub async fn delete(&self, id: Uuid) -> SqlxResult<bool> {
        let result = sqlx::query("DELETE FROM tournaments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
