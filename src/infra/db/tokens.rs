use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{AuthTokensRepo, CreateAuthTokenParams, RepoError};
use crate::domain::entities::AuthTokenRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(Debug, sqlx::FromRow)]
struct AuthTokenRow {
    id: Uuid,
    user_id: Uuid,
    prefix: String,
    hashed_secret: Vec<u8>,
    created_at: OffsetDateTime,
}

impl From<AuthTokenRow> for AuthTokenRecord {
    fn from(row: AuthTokenRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            prefix: row.prefix,
            hashed_secret: row.hashed_secret,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl AuthTokensRepo for PostgresRepositories {
    async fn create_token(
        &self,
        params: CreateAuthTokenParams,
    ) -> Result<AuthTokenRecord, RepoError> {
        let row = sqlx::query_as::<_, AuthTokenRow>(
            r#"
            INSERT INTO auth_tokens (id, user_id, prefix, hashed_secret, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, prefix, hashed_secret, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(params.user_id)
        .bind(params.prefix)
        .bind(params.hashed_secret)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<AuthTokenRecord>, RepoError> {
        let row = sqlx::query_as::<_, AuthTokenRow>(
            r#"
            SELECT id, user_id, prefix, hashed_secret, created_at
            FROM auth_tokens
            WHERE prefix = $1
            "#,
        )
        .bind(prefix)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(AuthTokenRecord::from))
    }
}
