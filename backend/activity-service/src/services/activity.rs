/// Activity aggregation - merges likes, comments, and follows targeting a
/// viewer into one reverse-chronological feed.
use crate::config::ActivityConfig;
use crate::domain::activity::{Activity, ActivityKind, CommentEvent, FollowEvent, LikeEvent};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::{CommentRepository, FollowRepository, LikeRepository, UserRepository};
use crate::services::image_resolver::ImageResolver;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Seam over the data store so the aggregator is testable without Postgres.
///
/// Implementations return each source's records ordered by recency and
/// capped to `limit`, with the viewer's own actions already excluded.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivitySource: Send + Sync {
    async fn viewer_exists(&self, viewer_id: Uuid) -> ServiceResult<bool>;

    /// Likes on the viewer's posts
    async fn recent_likes(&self, viewer_id: Uuid, limit: i64) -> ServiceResult<Vec<LikeEvent>>;

    /// Comments on the viewer's posts
    async fn recent_comments(
        &self,
        viewer_id: Uuid,
        limit: i64,
    ) -> ServiceResult<Vec<CommentEvent>>;

    /// Follow edges targeting the viewer
    async fn recent_followers(
        &self,
        viewer_id: Uuid,
        limit: i64,
    ) -> ServiceResult<Vec<FollowEvent>>;
}

/// Postgres-backed activity source delegating to the repositories
#[derive(Clone)]
pub struct PgActivitySource {
    users: UserRepository,
    likes: LikeRepository,
    comments: CommentRepository,
    follows: FollowRepository,
}

impl PgActivitySource {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            likes: LikeRepository::new(pool.clone()),
            comments: CommentRepository::new(pool.clone()),
            follows: FollowRepository::new(pool),
        }
    }
}

#[async_trait]
impl ActivitySource for PgActivitySource {
    async fn viewer_exists(&self, viewer_id: Uuid) -> ServiceResult<bool> {
        self.users.user_exists(viewer_id).await
    }

    async fn recent_likes(&self, viewer_id: Uuid, limit: i64) -> ServiceResult<Vec<LikeEvent>> {
        self.likes
            .recent_likes_on_user_posts(viewer_id, limit)
            .await
    }

    async fn recent_comments(
        &self,
        viewer_id: Uuid,
        limit: i64,
    ) -> ServiceResult<Vec<CommentEvent>> {
        self.comments
            .recent_comments_on_user_posts(viewer_id, limit)
            .await
    }

    async fn recent_followers(
        &self,
        viewer_id: Uuid,
        limit: i64,
    ) -> ServiceResult<Vec<FollowEvent>> {
        self.follows.recent_followers(viewer_id, limit).await
    }
}

/// Produces the activity feed for a viewing user.
///
/// Pure read over the data store: no side effects, no cursor, each call
/// re-fetches the full top-N window.
#[derive(Clone)]
pub struct ActivityService {
    source: Arc<dyn ActivitySource>,
    images: ImageResolver,
    limits: ActivityConfig,
}

impl ActivityService {
    pub fn new(source: Arc<dyn ActivitySource>, images: ImageResolver) -> Self {
        Self::with_limits(source, images, ActivityConfig::default())
    }

    pub fn with_limits(
        source: Arc<dyn ActivitySource>,
        images: ImageResolver,
        limits: ActivityConfig,
    ) -> Self {
        Self {
            source,
            images,
            limits,
        }
    }

    /// List activities that happened to the viewer's content or identity.
    ///
    /// With a kind filter, only that source is queried and its order is
    /// preserved. Without one, the three sources are fetched concurrently
    /// (all-or-nothing) and merged newest first; ties keep insertion order.
    pub async fn list_activities(
        &self,
        viewer_id: Uuid,
        kind: Option<ActivityKind>,
    ) -> ServiceResult<Vec<Activity>> {
        if !self.source.viewer_exists(viewer_id).await? {
            return Err(ServiceError::Unauthorized(format!(
                "viewer {} does not resolve to a known user",
                viewer_id
            )));
        }

        match kind {
            None => {
                let limit = self.limits.combined_source_limit;
                let (likes, comments, follows) = tokio::try_join!(
                    self.source.recent_likes(viewer_id, limit),
                    self.source.recent_comments(viewer_id, limit),
                    self.source.recent_followers(viewer_id, limit),
                )?;

                let mut activities =
                    Vec::with_capacity(likes.len() + comments.len() + follows.len());
                for event in &likes {
                    if event.actor_id == viewer_id {
                        continue;
                    }
                    activities.push(self.like_activity(event).await);
                }
                for event in &comments {
                    if event.actor_id == viewer_id {
                        continue;
                    }
                    activities.push(self.comment_activity(event).await);
                }
                for event in &follows {
                    if event.actor_id == viewer_id {
                        continue;
                    }
                    activities.push(self.follow_activity(event));
                }

                // Vec::sort_by is stable, so same-timestamp entries keep
                // their like/comment/follow concatenation order.
                activities.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Ok(activities)
            }
            Some(ActivityKind::Like) => {
                let events = self
                    .source
                    .recent_likes(viewer_id, self.limits.single_kind_limit)
                    .await?;
                let mut activities = Vec::with_capacity(events.len());
                for event in &events {
                    if event.actor_id == viewer_id {
                        continue;
                    }
                    activities.push(self.like_activity(event).await);
                }
                Ok(activities)
            }
            Some(ActivityKind::Comment) => {
                let events = self
                    .source
                    .recent_comments(viewer_id, self.limits.single_kind_limit)
                    .await?;
                let mut activities = Vec::with_capacity(events.len());
                for event in &events {
                    if event.actor_id == viewer_id {
                        continue;
                    }
                    activities.push(self.comment_activity(event).await);
                }
                Ok(activities)
            }
            Some(ActivityKind::Follow) => {
                let events = self
                    .source
                    .recent_followers(viewer_id, self.limits.single_kind_limit)
                    .await?;
                let activities = events
                    .iter()
                    .filter(|event| event.actor_id != viewer_id)
                    .map(|event| self.follow_activity(event))
                    .collect();
                Ok(activities)
            }
        }
    }

    async fn like_activity(&self, event: &LikeEvent) -> Activity {
        Activity {
            id: Activity::synthesize_id(ActivityKind::Like, event.like_id),
            kind: ActivityKind::Like,
            actor_id: event.actor_id,
            actor_username: event.actor_username.clone(),
            actor_avatar_url: event.actor_avatar_url.clone(),
            created_at: event.created_at,
            post_id: Some(event.post_id),
            post_image_url: self
                .images
                .resolve(
                    event.post_image_key.as_deref(),
                    event.post_image_url.as_deref(),
                )
                .await,
            comment_text: None,
        }
    }

    async fn comment_activity(&self, event: &CommentEvent) -> Activity {
        Activity {
            id: Activity::synthesize_id(ActivityKind::Comment, event.comment_id),
            kind: ActivityKind::Comment,
            actor_id: event.actor_id,
            actor_username: event.actor_username.clone(),
            actor_avatar_url: event.actor_avatar_url.clone(),
            created_at: event.created_at,
            post_id: Some(event.post_id),
            post_image_url: self
                .images
                .resolve(
                    event.post_image_key.as_deref(),
                    event.post_image_url.as_deref(),
                )
                .await,
            comment_text: Some(event.content.clone()),
        }
    }

    fn follow_activity(&self, event: &FollowEvent) -> Activity {
        Activity {
            id: Activity::synthesize_id(ActivityKind::Follow, event.follow_id),
            kind: ActivityKind::Follow,
            actor_id: event.actor_id,
            actor_username: event.actor_username.clone(),
            actor_avatar_url: event.actor_avatar_url.clone(),
            created_at: event.created_at,
            post_id: None,
            post_image_url: None,
            comment_text: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::image_resolver::MockObjectStore;
    use chrono::{DateTime, Utc};
    use mockall::predicate::eq;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn like_event(actor: Uuid, secs: i64) -> LikeEvent {
        LikeEvent {
            like_id: Uuid::new_v4(),
            actor_id: actor,
            actor_username: "actor".to_string(),
            actor_avatar_url: None,
            post_id: Uuid::new_v4(),
            post_image_key: None,
            post_image_url: Some("https://example.com/p.jpg".to_string()),
            created_at: ts(secs),
        }
    }

    fn comment_event(actor: Uuid, secs: i64) -> CommentEvent {
        CommentEvent {
            comment_id: Uuid::new_v4(),
            actor_id: actor,
            actor_username: "actor".to_string(),
            actor_avatar_url: None,
            post_id: Uuid::new_v4(),
            content: "nice shot".to_string(),
            post_image_key: None,
            post_image_url: None,
            created_at: ts(secs),
        }
    }

    fn follow_event(actor: Uuid, secs: i64) -> FollowEvent {
        FollowEvent {
            follow_id: Uuid::new_v4(),
            actor_id: actor,
            actor_username: "actor".to_string(),
            actor_avatar_url: None,
            created_at: ts(secs),
        }
    }

    fn service(source: MockActivitySource) -> ActivityService {
        ActivityService::new(
            Arc::new(source),
            ImageResolver::new(Arc::new(MockObjectStore::new())),
        )
    }

    #[tokio::test]
    async fn test_combined_feed_sorted_newest_first() {
        let viewer = Uuid::new_v4();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let mut source = MockActivitySource::new();
        source
            .expect_viewer_exists()
            .with(eq(viewer))
            .returning(|_| Ok(true));
        let like = like_event(a, 10);
        source
            .expect_recent_likes()
            .returning(move |_, _| Ok(vec![like.clone()]));
        let comment = comment_event(b, 20);
        source
            .expect_recent_comments()
            .returning(move |_, _| Ok(vec![comment.clone()]));
        let follow = follow_event(c, 15);
        source
            .expect_recent_followers()
            .returning(move |_, _| Ok(vec![follow.clone()]));

        let feed = service(source)
            .list_activities(viewer, None)
            .await
            .unwrap();

        let kinds: Vec<ActivityKind> = feed.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActivityKind::Comment,
                ActivityKind::Follow,
                ActivityKind::Like
            ]
        );
        for pair in feed.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[tokio::test]
    async fn test_unknown_viewer_is_unauthorized() {
        let mut source = MockActivitySource::new();
        source.expect_viewer_exists().returning(|_| Ok(false));

        let err = service(source)
            .list_activities(Uuid::new_v4(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_viewer_own_actions_are_excluded() {
        let viewer = Uuid::new_v4();
        let other = Uuid::new_v4();

        let mut source = MockActivitySource::new();
        source.expect_viewer_exists().returning(|_| Ok(true));
        let self_like = like_event(viewer, 30);
        source
            .expect_recent_likes()
            .returning(move |_, _| Ok(vec![self_like.clone()]));
        let comment = comment_event(other, 20);
        source
            .expect_recent_comments()
            .returning(move |_, _| Ok(vec![comment.clone()]));
        source.expect_recent_followers().returning(|_, _| Ok(vec![]));

        let feed = service(source)
            .list_activities(viewer, None)
            .await
            .unwrap();

        assert_eq!(feed.len(), 1);
        assert!(feed.iter().all(|a| a.actor_id != viewer));
    }

    #[tokio::test]
    async fn test_kind_filter_returns_single_kind_without_merge() {
        let viewer = Uuid::new_v4();
        let actor = Uuid::new_v4();

        let mut source = MockActivitySource::new();
        source.expect_viewer_exists().returning(|_| Ok(true));
        let events = vec![like_event(actor, 50), like_event(actor, 40)];
        source
            .expect_recent_likes()
            .with(eq(viewer), eq(50))
            .returning(move |_, _| Ok(events.clone()));

        let feed = service(source)
            .list_activities(viewer, Some(ActivityKind::Like))
            .await
            .unwrap();

        assert_eq!(feed.len(), 2);
        assert!(feed.iter().all(|a| a.kind == ActivityKind::Like));
        // Source order preserved
        assert!(feed[0].created_at > feed[1].created_at);
    }

    #[tokio::test]
    async fn test_single_kind_is_subset_of_combined_under_equal_limits() {
        let viewer = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let likes = vec![like_event(actor, 30), like_event(actor, 10)];

        let make_source = |likes: Vec<LikeEvent>| {
            let mut source = MockActivitySource::new();
            source.expect_viewer_exists().returning(|_| Ok(true));
            source
                .expect_recent_likes()
                .returning(move |_, _| Ok(likes.clone()));
            source.expect_recent_comments().returning(|_, _| Ok(vec![]));
            source.expect_recent_followers().returning(|_, _| Ok(vec![]));
            source
        };

        let limits = ActivityConfig {
            combined_source_limit: 20,
            single_kind_limit: 20,
        };
        let images = ImageResolver::new(Arc::new(MockObjectStore::new()));

        let combined = ActivityService::with_limits(
            Arc::new(make_source(likes.clone())),
            images.clone(),
            limits.clone(),
        )
        .list_activities(viewer, None)
        .await
        .unwrap();

        let filtered = ActivityService::with_limits(
            Arc::new(make_source(likes)),
            images,
            limits,
        )
        .list_activities(viewer, Some(ActivityKind::Like))
        .await
        .unwrap();

        let combined_like_ids: Vec<&str> = combined
            .iter()
            .filter(|a| a.kind == ActivityKind::Like)
            .map(|a| a.id.as_str())
            .collect();
        for activity in &filtered {
            assert!(combined_like_ids.contains(&activity.id.as_str()));
        }
    }

    #[tokio::test]
    async fn test_ids_unique_when_kinds_share_source_id() {
        let viewer = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let shared = Uuid::new_v4();

        let mut source = MockActivitySource::new();
        source.expect_viewer_exists().returning(|_| Ok(true));
        let mut like = like_event(actor, 10);
        like.like_id = shared;
        source
            .expect_recent_likes()
            .returning(move |_, _| Ok(vec![like.clone()]));
        let mut comment = comment_event(actor, 20);
        comment.comment_id = shared;
        source
            .expect_recent_comments()
            .returning(move |_, _| Ok(vec![comment.clone()]));
        source.expect_recent_followers().returning(|_, _| Ok(vec![]));

        let feed = service(source)
            .list_activities(viewer, None)
            .await
            .unwrap();

        assert_eq!(feed.len(), 2);
        assert_ne!(feed[0].id, feed[1].id);
    }

    #[tokio::test]
    async fn test_failing_source_fails_whole_combined_call() {
        let mut source = MockActivitySource::new();
        source.expect_viewer_exists().returning(|_| Ok(true));
        source.expect_recent_likes().returning(|_, _| Ok(vec![]));
        source
            .expect_recent_comments()
            .returning(|_, _| Err(ServiceError::Internal("comments query failed".to_string())));
        source.expect_recent_followers().returning(|_, _| Ok(vec![]));

        let result = service(source).list_activities(Uuid::new_v4(), None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unresolvable_attachment_keeps_activity_without_image() {
        let viewer = Uuid::new_v4();
        let actor = Uuid::new_v4();

        let mut source = MockActivitySource::new();
        source.expect_viewer_exists().returning(|_| Ok(true));
        let mut like = like_event(actor, 10);
        like.post_image_key = Some("posts/broken.jpg".to_string());
        like.post_image_url = None;
        source
            .expect_recent_likes()
            .returning(move |_, _| Ok(vec![like.clone()]));
        source.expect_recent_comments().returning(|_, _| Ok(vec![]));
        source.expect_recent_followers().returning(|_, _| Ok(vec![]));

        let mut store = MockObjectStore::new();
        store.expect_public_url().returning(|_| {
            Err(object_storage::StorageError::S3(
                "object missing".to_string(),
            ))
        });

        let service =
            ActivityService::new(Arc::new(source), ImageResolver::new(Arc::new(store)));
        let feed = service.list_activities(viewer, None).await.unwrap();

        assert_eq!(feed.len(), 1);
        assert!(feed[0].post_image_url.is_none());
        assert!(feed[0].post_id.is_some());
    }

    #[tokio::test]
    async fn test_tied_timestamps_keep_stable_order() {
        let viewer = Uuid::new_v4();
        let actor = Uuid::new_v4();

        let mut source = MockActivitySource::new();
        source.expect_viewer_exists().returning(|_| Ok(true));
        let like = like_event(actor, 10);
        source
            .expect_recent_likes()
            .returning(move |_, _| Ok(vec![like.clone()]));
        let comment = comment_event(actor, 10);
        source
            .expect_recent_comments()
            .returning(move |_, _| Ok(vec![comment.clone()]));
        source.expect_recent_followers().returning(|_, _| Ok(vec![]));

        let feed = service(source)
            .list_activities(viewer, None)
            .await
            .unwrap();

        // Likes are concatenated before comments, and the sort is stable
        assert_eq!(feed[0].kind, ActivityKind::Like);
        assert_eq!(feed[1].kind, ActivityKind::Comment);
    }
}
