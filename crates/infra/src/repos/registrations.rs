use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, Result};
use uuid::Uuid;

use crate::db::Db;
use crate::models::{RegistrationRow, TeamRow, Teammate};
use crate::room_code;

/// One line of a results batch: rank and prize money for a registration.
#[derive(Debug, Clone)]
pub struct ResultEntry {
    pub registration_id: Uuid,
    pub placement: Option<i32>,
    pub earnings: Option<i32>,
}

/// Registration joined with its user and team for the admin roster view.
#[derive(Debug, Clone, FromRow)]
pub struct RosterEntry {
    #[sqlx(flatten)]
    pub registration: RegistrationRow,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub team_name: Option<String>,
    pub team_teammates: Option<Json<Vec<Teammate>>>,
}

/// Registration joined with its tournament for profile match history.
#[derive(Debug, Clone, FromRow)]
pub struct HistoryEntry {
    #[sqlx(flatten)]
    pub registration: RegistrationRow,
    pub tournament_name: String,
    pub tournament_game_type: String,
    pub tournament_status: String,
    pub tournament_start_time: DateTime<Utc>,
    pub tournament_prize: i32,
    pub team_name: Option<String>,
}

/// Aggregates over a user's registrations, computed on read.
#[derive(Debug, Clone, Default)]
pub struct PlayerStats {
    pub tournaments_played: i64,
    pub tournaments_won: i64,
    pub win_rate: f64,
    pub total_earnings: i64,
}

pub struct RegistrationRepo {
    db: Db,
}

impl RegistrationRepo {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Register a user as leader of a fresh team, in one transaction.
    ///
    /// Creates the team with a newly generated room code and the teammate
    /// list stored verbatim, then the leader's registration bound to it.
    /// There is deliberately no prior "already registered?" read: the
    /// UNIQUE (user_id, tournament_id) constraint rejects the duplicate and
    /// the caller maps that violation to its conflict error, which closes
    /// the double-submit race a pre-check would leave open.
    pub async fn register_team(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
        team_name: String,
        teammates: Vec<Teammate>,
    ) -> Result<(TeamRow, RegistrationRow)> {
        let code = room_code::generate();
        let mut tx = self.db.begin().await?;

        let team = sqlx::query_as::<_, TeamRow>(
            r#"
            INSERT INTO teams (name, tournament_id, leader_id, room_code, teammates)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, tournament_id, leader_id, room_code, teammates, created_at
            "#,
        )
        .bind(team_name)
        .bind(tournament_id)
        .bind(user_id)
        .bind(code)
        .bind(Json(teammates))
        .fetch_one(&mut *tx)
        .await?;

        let registration = sqlx::query_as::<_, RegistrationRow>(
            r#"
            INSERT INTO registrations (user_id, tournament_id, team_id, role, status)
            VALUES ($1, $2, $3, 'Team Leader', 'Registered')
            RETURNING id, user_id, tournament_id, team_id, role, status,
                      placement, earnings, created_at
            "#,
        )
        .bind(user_id)
        .bind(tournament_id)
        .bind(team.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((team, registration))
    }

    /// Solo entry with no team object. Same uniqueness discipline as
    /// `register_team`.
    pub async fn register_solo(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
        role: String,
    ) -> Result<RegistrationRow> {
        sqlx::query_as::<_, RegistrationRow>(
            r#"
            INSERT INTO registrations (user_id, tournament_id, role, status)
            VALUES ($1, $2, $3, 'Registered')
            RETURNING id, user_id, tournament_id, team_id, role, status,
                      placement, earnings, created_at
            "#,
        )
        .bind(user_id)
        .bind(tournament_id)
        .bind(role)
        .fetch_one(&self.db)
        .await
    }

    /// Remove the caller's registration, along with the team it anchors
    /// (the one they lead in this tournament). Returns false when no
    /// registration existed.
    pub async fn unregister(&self, user_id: Uuid, tournament_id: Uuid) -> Result<bool> {
        let mut tx = self.db.begin().await?;

        let deleted = sqlx::query(
            "DELETE FROM registrations WHERE user_id = $1 AND tournament_id = $2",
        )
        .bind(user_id)
        .bind(tournament_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if deleted == 0 {
            return Ok(false);
        }

        // A leaderless team has no live registration keeping it meaningful.
        sqlx::query("DELETE FROM teams WHERE leader_id = $1 AND tournament_id = $2")
            .bind(user_id)
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    pub async fn get_by_user_and_tournament(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
    ) -> Result<Option<RegistrationRow>> {
        sqlx::query_as::<_, RegistrationRow>(
            r#"
            SELECT id, user_id, tournament_id, team_id, role, status,
                   placement, earnings, created_at
            FROM registrations
            WHERE user_id = $1 AND tournament_id = $2
            "#,
        )
        .bind(user_id)
        .bind(tournament_id)
        .fetch_optional(&self.db)
        .await
    }

    /// Roster for a tournament, newest registrations first.
    pub async fn list_by_tournament(&self, tournament_id: Uuid) -> Result<Vec<RosterEntry>> {
        sqlx::query_as::<_, RosterEntry>(
            r#"
            SELECT r.id, r.user_id, r.tournament_id, r.team_id, r.role, r.status,
                   r.placement, r.earnings, r.created_at,
                   u.username, u.email, u.avatar,
                   tm.name AS team_name, tm.teammates AS team_teammates
            FROM registrations r
            JOIN users u ON u.id = r.user_id
            LEFT JOIN teams tm ON tm.id = r.team_id
            WHERE r.tournament_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.db)
        .await
    }

    /// Match history for a profile page, newest first.
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<HistoryEntry>> {
        sqlx::query_as::<_, HistoryEntry>(
            r#"
            SELECT r.id, r.user_id, r.tournament_id, r.team_id, r.role, r.status,
                   r.placement, r.earnings, r.created_at,
                   t.name AS tournament_name, t.game_type AS tournament_game_type,
                   t.status AS tournament_status, t.start_time AS tournament_start_time,
                   t.prize AS tournament_prize,
                   tm.name AS team_name
            FROM registrations r
            JOIN tournaments t ON t.id = r.tournament_id
            LEFT JOIN teams tm ON tm.id = r.team_id
            WHERE r.user_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
    }

    /// Apply a settlement batch as a unit: every entry must hit a
    /// registration that belongs to the given tournament, otherwise the
    /// whole batch rolls back with `RowNotFound`.
    pub async fn record_results(
        &self,
        tournament_id: Uuid,
        entries: Vec<ResultEntry>,
    ) -> Result<u64> {
        let mut tx = self.db.begin().await?;
        let mut applied = 0u64;

        for entry in entries {
            let earnings = entry.earnings.unwrap_or(0).max(0);
            let updated = sqlx::query(
                r#"
                UPDATE registrations
                SET placement = $3, earnings = $4
                WHERE id = $1 AND tournament_id = $2
                "#,
            )
            .bind(entry.registration_id)
            .bind(tournament_id)
            .bind(entry.placement)
            .bind(earnings)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if updated == 0 {
                // Dropping the open transaction rolls the batch back.
                return Err(sqlx::Error::RowNotFound);
            }
            applied += updated;
        }

        tx.commit().await?;
        Ok(applied)
    }

    /// Win rate and earnings aggregates for one user.
    pub async fn stats(&self, user_id: Uuid) -> Result<PlayerStats> {
        let row = sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE placement = 1),
                   COALESCE(SUM(earnings), 0)::bigint
            FROM registrations
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        let (played, won, earnings) = row;
        Ok(PlayerStats {
            tournaments_played: played,
            tournaments_won: won,
            win_rate: win_rate_percent(played, won),
            total_earnings: earnings,
        })
    }
}

fn win_rate_percent(played: i64, won: i64) -> f64 {
    if played > 0 {
        (won as f64 / played as f64) * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::win_rate_percent;

    #[test]
    fn win_rate_of_two_wins_in_four() {
        // placements [1, 3, 1, null] -> 2 wins out of 4 entries
        assert_eq!(win_rate_percent(4, 2), 50.0);
    }

    #[test]
    fn win_rate_with_no_registrations_is_zero() {
        assert_eq!(win_rate_percent(0, 0), 0.0);
    }
}
