//! Authentication module

mod context;
mod extractors;
pub mod jwt;
mod manager;
pub mod middleware;

pub use context::AuthContext;
pub use extractors::CurrentUser;
pub use jwt::IdentityClaims;
pub use manager::AuthManager;
pub use middleware::{AuthError, AuthState, resolve_identity};
