pub mod types;
pub mod service;

// Re-export main items for other domains to use
pub use types::{UpdateProfile, UserProfile, UserType, MAX_BIO_LENGTH};
pub use service::{UserService, UserServiceImpl};
