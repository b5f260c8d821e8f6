use crate::domain::models::{User, UserCounts};
use crate::error::ServiceResult;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for User lookups and derived counts
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_user(&self, user_id: Uuid) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, bio, avatar_url, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Check that a user id resolves to an existing user
    pub async fn user_exists(&self, user_id: Uuid) -> ServiceResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE id = $1
            )
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Derived post/follower/following counts, computed on demand
    pub async fn get_user_counts(&self, user_id: Uuid) -> ServiceResult<UserCounts> {
        let (posts, followers, following): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM posts WHERE user_id = $1),
                (SELECT COUNT(*) FROM follows WHERE followee_id = $1),
                (SELECT COUNT(*) FROM follows WHERE follower_id = $1)
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(UserCounts {
            posts,
            followers,
            following,
        })
    }
}
