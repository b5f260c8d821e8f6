use crate::error::{ServiceError, ServiceResult};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

/// Social graph bookkeeping for follow edges.
///
/// Writes go through a single upsert-or-noop statement backed by the
/// unique (follower_id, followee_id) constraint; no verification reads.
#[derive(Clone)]
pub struct FollowService {
    pub pool: PgPool,
}

impl FollowService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Idempotent create follow; returns true if a new edge was inserted.
    /// Self-follows are rejected.
    pub async fn create_follow(
        &self,
        follower_id: Uuid,
        followee_id: Uuid,
    ) -> ServiceResult<bool> {
        if follower_id == followee_id {
            return Err(ServiceError::InvalidInput(
                "users cannot follow themselves".to_string(),
            ));
        }

        let inserted = sqlx::query_as::<_, (Uuid,)>(
            r#"
            INSERT INTO follows (id, follower_id, followee_id, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (follower_id, followee_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(follower_id)
        .bind(followee_id)
        .fetch_optional(&self.pool)
        .await?;

        if inserted.is_some() {
            info!(%follower_id, %followee_id, "follow edge created");
        } else {
            debug!(%follower_id, %followee_id, "follow edge already exists");
        }

        Ok(inserted.is_some())
    }

    /// Idempotent delete; returns true if an edge was removed.
    pub async fn delete_follow(
        &self,
        follower_id: Uuid,
        followee_id: Uuid,
    ) -> ServiceResult<bool> {
        let affected = sqlx::query(
            r#"
            DELETE FROM follows
            WHERE follower_id = $1 AND followee_id = $2
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected > 0 {
            info!(%follower_id, %followee_id, "follow edge removed");
        }

        Ok(affected > 0)
    }
}
