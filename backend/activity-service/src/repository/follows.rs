use crate::domain::activity::FollowEvent;
use crate::error::ServiceResult;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for Follow edge queries
#[derive(Clone)]
pub struct FollowRepository {
    pool: PgPool,
}

impl FollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check if `follower_id` follows `followee_id`
    pub async fn is_following(&self, follower_id: Uuid, followee_id: Uuid) -> ServiceResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM follows
                WHERE follower_id = $1 AND followee_id = $2
            )
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Most recent follow edges targeting `followee_id`, joined with the
    /// follower's profile.
    pub async fn recent_followers(
        &self,
        followee_id: Uuid,
        limit: i64,
    ) -> ServiceResult<Vec<FollowEvent>> {
        let events = sqlx::query_as::<_, FollowEvent>(
            r#"
            SELECT f.id AS follow_id,
                   f.follower_id AS actor_id,
                   u.username AS actor_username,
                   u.avatar_url AS actor_avatar_url,
                   f.created_at
            FROM follows f
            JOIN users u ON u.id = f.follower_id
            WHERE f.followee_id = $1
            ORDER BY f.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(followee_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}
