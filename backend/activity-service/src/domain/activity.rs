/// Activity feed types
///
/// An `Activity` is a derived, unpersisted view of one like, comment, or
/// follow event relevant to a viewing user. It is constructed per request
/// and discarded after serialization.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminant tag on an activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Like,
    Comment,
    Follow,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Like => "like",
            ActivityKind::Comment => "comment",
            ActivityKind::Follow => "follow",
        }
    }
}

/// One entry in a user's activity feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Synthesized as `"<kind>_<source record id>"` so identifiers stay
    /// unique across kinds
    pub id: String,
    pub kind: ActivityKind,
    pub actor_id: Uuid,
    pub actor_username: String,
    pub actor_avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_text: Option<String>,
}

impl Activity {
    pub fn synthesize_id(kind: ActivityKind, source_id: Uuid) -> String {
        format!("{}_{}", kind.as_str(), source_id)
    }
}

/// A like on one of the viewer's posts, joined with actor and post context
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LikeEvent {
    pub like_id: Uuid,
    pub actor_id: Uuid,
    pub actor_username: String,
    pub actor_avatar_url: Option<String>,
    pub post_id: Uuid,
    pub post_image_key: Option<String>,
    pub post_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A comment on one of the viewer's posts, joined with actor and post context
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentEvent {
    pub comment_id: Uuid,
    pub actor_id: Uuid,
    pub actor_username: String,
    pub actor_avatar_url: Option<String>,
    pub post_id: Uuid,
    pub content: String,
    pub post_image_key: Option<String>,
    pub post_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A follow edge targeting the viewer, joined with the follower's profile
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FollowEvent {
    pub follow_id: Uuid,
    pub actor_id: Uuid,
    pub actor_username: String,
    pub actor_avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
