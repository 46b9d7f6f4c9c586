//! Identity provider implementations.
//!
//! This module contains implementations of `SessionProvider` for:
//! - WorkOS User Management
//! - A mock provider backed by the Mock IdP server (with `mock` feature)

#[cfg(feature = "mock")]
mod mock;
mod workos;

#[cfg(feature = "mock")]
pub use mock::MockProvider;
pub use workos::WorkosProvider;
