pub mod claims;
pub mod dto;
pub mod guard;
pub mod hook;
pub mod services;
pub mod session;

pub use guard::{GuardDecision, RouteGuard};
pub use hook::SessionExpiryHook;
pub use services::AuthService;
pub use session::{Session, SessionStatus, SessionStore};
