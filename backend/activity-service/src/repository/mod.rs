pub mod comments;
pub mod follows;
pub mod likes;
pub mod users;

pub use comments::CommentRepository;
pub use follows::FollowRepository;
pub use likes::LikeRepository;
pub use users::UserRepository;
