use crate::domain::activity::LikeEvent;
use crate::domain::models::Like;
use crate::error::ServiceResult;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for Like operations
#[derive(Clone)]
pub struct LikeRepository {
    pool: PgPool,
}

impl LikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a like (idempotent upsert-or-noop).
    /// Returns true if a new row was inserted.
    pub async fn create_like(&self, user_id: Uuid, post_id: Uuid) -> ServiceResult<bool> {
        let inserted = sqlx::query_as::<_, (Uuid,)>(
            r#"
            INSERT INTO likes (id, user_id, post_id, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id, post_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inserted.is_some())
    }

    /// Delete a like (idempotent). Returns true if a row was removed.
    pub async fn delete_like(&self, user_id: Uuid, post_id: Uuid) -> ServiceResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM likes
            WHERE user_id = $1 AND post_id = $2
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check if user has liked a post
    pub async fn check_user_liked(&self, user_id: Uuid, post_id: Uuid) -> ServiceResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM likes
                WHERE user_id = $1 AND post_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Get like count for a post
    pub async fn get_like_count(&self, post_id: Uuid) -> ServiceResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM likes
            WHERE post_id = $1
            "#,
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Get paginated likes for a post
    pub async fn get_post_likes(
        &self,
        post_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Like>> {
        let likes = sqlx::query_as::<_, Like>(
            r#"
            SELECT id, user_id, post_id, created_at
            FROM likes
            WHERE post_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(post_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(likes)
    }

    /// Most recent likes on posts owned by `owner_id`, excluding the
    /// owner's own likes, joined with actor profile and post image fields.
    pub async fn recent_likes_on_user_posts(
        &self,
        owner_id: Uuid,
        limit: i64,
    ) -> ServiceResult<Vec<LikeEvent>> {
        let events = sqlx::query_as::<_, LikeEvent>(
            r#"
            SELECT l.id AS like_id,
                   l.user_id AS actor_id,
                   u.username AS actor_username,
                   u.avatar_url AS actor_avatar_url,
                   l.post_id,
                   p.image_key AS post_image_key,
                   p.image_url AS post_image_url,
                   l.created_at
            FROM likes l
            JOIN posts p ON p.id = l.post_id
            JOIN users u ON u.id = l.user_id
            WHERE p.user_id = $1 AND l.user_id <> $1
            ORDER BY l.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}
