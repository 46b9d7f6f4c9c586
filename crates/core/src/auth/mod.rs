mod error;
mod functions;
mod guard;
mod traits;
mod types;

pub use error::AuthError;
pub use functions::{generate_state, with_error_param};
pub use guard::{guard, GuardDecision, ReauthCause};
pub use traits::{Result, SessionProvider};
pub use types::{
    AuthenticatedSession, AuthenticationResult, CodeExchange, RefreshOutcome, SealedSession,
    UnauthenticatedReason, User,
};
