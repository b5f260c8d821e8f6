pub mod activity;
pub mod models;

pub use activity::{Activity, ActivityKind, CommentEvent, FollowEvent, LikeEvent};
