//! Functional core for sessionguard.
//!
//! Holds the session data model, the identity provider abstraction and the
//! guard decision procedure. Nothing here knows about HTTP frameworks.

pub mod auth;
