use sqlx::Result;
use uuid::Uuid;

use crate::db::Db;
use crate::models::UserRow;

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub username: Option<String>,
    pub avatar: Option<String>,
}

pub struct UserRepo {
    db: Db,
}

impl UserRepo {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Insert a new account. The unique constraints on email and username are
    /// the duplicate guard; callers translate a unique violation into a
    /// conflict error.
    pub async fn create(&self, data: CreateUser) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, username, password_hash, avatar, is_admin, created_at
            "#,
        )
        .bind(data.email)
        .bind(data.username)
        .bind(data.password_hash)
        .fetch_one(&self.db)
        .await?;

        Ok(row)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<UserRow>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, email, username, password_hash, avatar, is_admin, created_at FROM users WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, email, username, password_hash, avatar, is_admin, created_at FROM users WHERE email = $1"
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
    }

    /// Privilege check for admin-gated routes. Always reads the persisted
    /// row rather than a cached claim, so a demoted admin loses access as
    /// soon as the flag is cleared.
    pub async fn is_admin(&self, id: Uuid) -> Result<bool> {
        let is_admin: Option<bool> =
            sqlx::query_scalar("SELECT is_admin FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        Ok(is_admin.unwrap_or(false))
    }

    pub async fn update_profile(&self, id: Uuid, data: UpdateProfile) -> Result<Option<UserRow>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                avatar   = COALESCE($3, avatar)
            WHERE id = $1
            RETURNING id, email, username, password_hash, avatar, is_admin, created_at
            "#,
        )
        .bind(id)
        .bind(data.username)
        .bind(data.avatar)
        .fetch_optional(&self.db)
        .await
    }
}
