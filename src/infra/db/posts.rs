use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreatePostParams, FeedQuery, PostsRepo, PostsWriteRepo, RepoError,
};
use crate::domain::entities::PostRecord;
use crate::domain::types::ReadFilter;

use super::{PostgresRepositories, map_sqlx_error};

const POST_COLUMNS: &str = "p.id, p.author_id, p.title, p.content, p.created_at, p.updated_at";
const NEWEST_FIRST: &str = " ORDER BY p.created_at DESC, p.id DESC";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    author_id: Uuid,
    title: String,
    content: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            author_id: row.author_id,
            title: row.title,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PostgresRepositories {
    fn apply_feed_conditions(qb: &mut QueryBuilder<'_, Postgres>, query: FeedQuery<'_>) {
        qb.push(" WHERE p.author_id = ANY(");
        qb.push_bind(query.authors.to_vec());
        qb.push(")");

        let exists = match query.read {
            ReadFilter::Any => return,
            ReadFilter::Read => " AND EXISTS (",
            ReadFilter::Unread => " AND NOT EXISTS (",
        };
        qb.push(exists);
        qb.push("SELECT 1 FROM post_reads r WHERE r.post_id = p.id AND r.user_id = ");
        qb.push_bind(query.reader_id);
        qb.push(")");
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_posts(&self, exclude_author: Option<Uuid>) -> Result<Vec<PostRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(POST_COLUMNS);
        qb.push(" FROM posts p");
        if let Some(author_id) = exclude_author {
            qb.push(" WHERE p.author_id <> ");
            qb.push_bind(author_id);
        }
        qb.push(NEWEST_FIRST);

        let rows = qb
            .build_query_as::<PostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn list_feed(
        &self,
        query: FeedQuery<'_>,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let offset = i64::try_from(offset)
            .map_err(|_| RepoError::InvalidInput {
                message: "offset exceeds supported range".to_string(),
            })?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(POST_COLUMNS);
        qb.push(" FROM posts p");
        Self::apply_feed_conditions(&mut qb, query);
        qb.push(NEWEST_FIRST);
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(limit));
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows = qb
            .build_query_as::<PostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn count_feed(&self, query: FeedQuery<'_>) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts p");
        Self::apply_feed_conditions(&mut qb, query);

        let count: i64 = qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(POST_COLUMNS);
        qb.push(" FROM posts p WHERE p.id = ");
        qb.push_bind(id);

        let row = qb
            .build_query_as::<PostRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }
}

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (id, author_id, title, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id, author_id, title, content, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(params.author_id)
        .bind(params.title)
        .bind(params.content)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }
}
