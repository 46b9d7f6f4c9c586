//! WorkOS-backed session authentication for sessionguard.
//!
//! This crate provides:
//! - A WorkOS provider with sealed session cookies
//! - The axum binding of the session guard (middleware and extractor)
//! - Login, callback and logout routes
//! - A mock provider and Mock IdP server (with `mock` feature)

mod config;
mod cookies;
mod error;
mod extractors;
mod guard;
mod handlers;
mod providers;
mod seal;
mod state;

pub use config::{
    AuthConfig, GuardMode, RefreshBehavior, WorkosConfig, LOGIN_PATH, SESSION_COOKIE_NAME,
};
pub use error::AuthError;
pub use extractors::Authenticated;
pub use guard::{reauthenticate, require_session};
pub use handlers::{auth_routes, LogoutResponse};
#[cfg(feature = "mock")]
pub use providers::MockProvider;
pub use providers::WorkosProvider;
pub use seal::Sealer;
pub use state::AuthState;

#[cfg(feature = "mock")]
pub mod mock_idp;
