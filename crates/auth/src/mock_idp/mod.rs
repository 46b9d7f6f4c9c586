//! Mock Identity Provider for local development.
//!
//! Provides a fake hosted sign-in page so the login flow works without a
//! WorkOS account.

mod server;
mod templates;

pub use server::MockIdpServer;
