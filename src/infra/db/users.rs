use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CreateUserParams, RepoError, UsersRepo};
use crate::domain::entities::{AuthorRecord, UserRecord};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    created_at: OffsetDateTime,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AuthorRow {
    id: Uuid,
    username: String,
    post_count: i64,
}

impl TryFrom<AuthorRow> for AuthorRecord {
    type Error = RepoError;

    fn try_from(row: AuthorRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            username: row.username,
            post_count: PostgresRepositories::convert_count(row.post_count)?,
        })
    }
}

#[async_trait]
impl UsersRepo for PostgresRepositories {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, username, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(params.username)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRecord::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRecord::from))
    }

    async fn find_usernames(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, RepoError> {
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, username FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().collect())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn list_authors(&self) -> Result<Vec<AuthorRecord>, RepoError> {
        let rows = sqlx::query_as::<_, AuthorRow>(
            r#"
            SELECT u.id, u.username, COUNT(p.id) AS post_count
            FROM users u
            LEFT JOIN posts p ON p.author_id = u.id
            GROUP BY u.id, u.username
            ORDER BY u.username
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(AuthorRecord::try_from).collect()
    }
}
