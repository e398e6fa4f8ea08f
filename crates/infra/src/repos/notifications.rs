use sqlx::Result;
use uuid::Uuid;

use crate::db::Db;
use crate::models::NotificationRow;

pub struct NotificationRepo {
    db: Db,
}

impl NotificationRepo {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        title: &str,
        content: &str,
        kind: &str,
    ) -> Result<NotificationRow> {
        sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications (user_id, title, content, kind)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, content, kind, read, created_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(content)
        .bind(kind)
        .fetch_one(&self.db)
        .await
    }

    /// Newest first, capped at the inbox page size.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<NotificationRow>> {
        sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, title, content, kind, read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 50
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }
}
