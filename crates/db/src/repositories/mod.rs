//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod account_repo;
pub mod media_repo;
pub mod message_repo;
pub mod notification_repo;
pub mod oauth_state_repo;
pub mod pending_registration_repo;
pub mod session_repo;

pub use account_repo::AccountRepo;
pub use media_repo::MediaRepo;
pub use message_repo::MessageRepo;
pub use notification_repo::NotificationRepo;
pub use oauth_state_repo::OAuthStateRepo;
pub use pending_registration_repo::PendingRegistrationRepo;
pub use session_repo::SessionRepo;
