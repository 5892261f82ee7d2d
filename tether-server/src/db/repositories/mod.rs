mod comment_repository;
mod connection_repository;
mod like_repository;
mod post_repository;
mod profile_repository;
mod user_repository;

pub use comment_repository::CommentRepository;
pub use connection_repository::ConnectionRepository;
pub use like_repository::LikeRepository;
pub use post_repository::PostRepository;
pub use profile_repository::ProfileRepository;
pub use user_repository::UserRepository;
