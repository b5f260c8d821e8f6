pub mod activity;
pub mod follow;
pub mod image_resolver;

pub use activity::{ActivityService, ActivitySource, PgActivitySource};
pub use follow::FollowService;
pub use image_resolver::{ImageResolver, ObjectStore};
