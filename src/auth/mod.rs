pub mod context;
pub mod jwt;
pub mod service;
pub mod types;

// Re-export public items
pub use context::{Session, SessionContext, SessionUser};
pub use service::AuthService;
pub use types::{AuthResponse, CreateUserRequest, LoginRequest};
