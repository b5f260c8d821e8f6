use crate::domain::activity::CommentEvent;
use crate::domain::models::Comment;
use crate::error::{ServiceError, ServiceResult};
use sqlx::PgPool;
use uuid::Uuid;

/// Maximum comment length, matching the posts layer's validation
const MAX_COMMENT_LENGTH: usize = 1000;

/// Repository for Comment operations
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new comment
    pub async fn create_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> ServiceResult<Comment> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::InvalidInput(
                "comment content cannot be empty".to_string(),
            ));
        }
        if trimmed.chars().count() > MAX_COMMENT_LENGTH {
            return Err(ServiceError::InvalidInput(format!(
                "comment content exceeds {} characters",
                MAX_COMMENT_LENGTH
            )));
        }

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, post_id, user_id, content, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, post_id, user_id, content, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(user_id)
        .bind(trimmed)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Delete a comment owned by `user_id`. Returns true if a row was removed.
    pub async fn delete_comment(&self, comment_id: Uuid, user_id: Uuid) -> ServiceResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(comment_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get comments for a post, oldest first
    pub async fn get_post_comments(
        &self,
        post_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, content, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(post_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    /// Get comment count for a post
    pub async fn get_comment_count(&self, post_id: Uuid) -> ServiceResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM comments
            WHERE post_id = $1
            "#,
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Most recent comments on posts owned by `owner_id`, excluding the
    /// owner's own comments, joined with actor profile and post image fields.
    pub async fn recent_comments_on_user_posts(
        &self,
        owner_id: Uuid,
        limit: i64,
    ) -> ServiceResult<Vec<CommentEvent>> {
        let events = sqlx::query_as::<_, CommentEvent>(
            r#"
            SELECT c.id AS comment_id,
                   c.user_id AS actor_id,
                   u.username AS actor_username,
                   u.avatar_url AS actor_avatar_url,
                   c.post_id,
                   c.content,
                   p.image_key AS post_image_key,
                   p.image_url AS post_image_url,
                   c.created_at
            FROM comments c
            JOIN posts p ON p.id = c.post_id
            JOIN users u ON u.id = c.user_id
            WHERE p.user_id = $1 AND c.user_id <> $1
            ORDER BY c.created_at DESC
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
