use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{RepoError, SubscriptionsRepo};
use crate::domain::entities::SubscriptionRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct SubscriptionRow {
    author_id: Uuid,
    subscriber_id: Uuid,
    created_at: OffsetDateTime,
}

impl From<SubscriptionRow> for SubscriptionRecord {
    fn from(row: SubscriptionRow) -> Self {
        Self {
            author_id: row.author_id,
            subscriber_id: row.subscriber_id,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl SubscriptionsRepo for PostgresRepositories {
    async fn list_for_subscriber(
        &self,
        subscriber_id: Uuid,
    ) -> Result<Vec<SubscriptionRecord>, RepoError> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT author_id, subscriber_id, created_at
            FROM subscriptions
            WHERE subscriber_id = $1
            ORDER BY created_at, author_id
            "#,
        )
        .bind(subscriber_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(SubscriptionRecord::from).collect())
    }

    async fn exists(&self, author_id: Uuid, subscriber_id: Uuid) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM subscriptions WHERE author_id = $1 AND subscriber_id = $2
            )
            "#,
        )
        .bind(author_id)
        .bind(subscriber_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create(
        &self,
        author_id: Uuid,
        subscriber_id: Uuid,
    ) -> Result<SubscriptionRecord, RepoError> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            INSERT INTO subscriptions (author_id, subscriber_id, created_at)
            VALUES ($1, $2, $3)
            RETURNING author_id, subscriber_id, created_at
            "#,
        )
        .bind(author_id)
        .bind(subscriber_id)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete(&self, author_id: Uuid, subscriber_id: Uuid) -> Result<bool, RepoError> {
        let result =
            sqlx::query("DELETE FROM subscriptions WHERE author_id = $1 AND subscriber_id = $2")
                .bind(author_id)
                .bind(subscriber_id)
                .execute(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
