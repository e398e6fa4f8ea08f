use chrono::{DateTime, Utc};
use sqlx::{FromRow, Result};
use uuid::Uuid;

use crate::db::Db;
use crate::models::FriendshipRow;

/// An accepted friendship from one user's point of view: whichever side of
/// the row is not the caller.
#[derive(Debug, Clone, FromRow)]
pub struct FriendEntry {
    pub id: Uuid,
    pub friend_id: Uuid,
    pub friend_username: String,
    pub friend_avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct FriendshipRepo {
    db: Db,
}

impl FriendshipRepo {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Accepted friendships where the caller appears on either side.
    pub async fn list_accepted(&self, user_id: Uuid) -> Result<Vec<FriendEntry>> {
        sqlx::query_as::<_, FriendEntry>(
            r#"
            SELECT f.id,
                   CASE WHEN f.user_id = $1 THEN f.friend_id ELSE f.user_id END AS friend_id,
                   u.username AS friend_username,
                   u.avatar AS friend_avatar,
                   f.created_at
            FROM friendships f
            JOIN users u
              ON u.id = CASE WHEN f.user_id = $1 THEN f.friend_id ELSE f.user_id END
            WHERE (f.user_id = $1 OR f.friend_id = $1)
              AND f.status = 'accepted'
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
    }

    /// Whether any friendship row links the pair, in either direction and
    /// any status.
    pub async fn exists_between(&self, a: Uuid, b: Uuid) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM friendships
            WHERE (user_id = $1 AND friend_id = $2)
               OR (user_id = $2 AND friend_id = $1)
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_one(&self.db)
        .await?;

        Ok(count > 0)
    }

    pub async fn create_request(&self, user_id: Uuid, friend_id: Uuid) -> Result<FriendshipRow> {
        sqlx::query_as::<_, FriendshipRow>(
            r#"
            INSERT INTO friendships (user_id, friend_id, status)
            VALUES ($1, $2, 'pending')
            RETURNING id, user_id, friend_id, status, created_at
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .fetch_one(&self.db)
        .await
    }
}
