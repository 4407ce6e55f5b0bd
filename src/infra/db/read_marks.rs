use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{ReadMarksRepo, RepoError};

use super::{PostgresRepositories, map_sqlx_error};

#[async_trait]
impl ReadMarksRepo for PostgresRepositories {
    async fn is_read(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM post_reads WHERE post_id = $1 AND user_id = $2)",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn read_post_ids(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT post_id FROM post_reads WHERE user_id = $1 AND post_id = ANY($2)",
        )
        .bind(user_id)
        .bind(post_ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(ids.into_iter().collect())
    }

    async fn mark_read(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO post_reads (post_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, user_id) DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn mark_unread(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM post_reads WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}
