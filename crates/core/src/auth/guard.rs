//! Session guard decision procedure.
//!
//! Framework-agnostic: takes the cookie value and a provider, returns a
//! [`GuardDecision`]. HTTP bindings turn the decision into a response and
//! perform the cookie side effects it asks for.

use super::{
    AuthenticatedSession, AuthenticationResult, RefreshOutcome, SealedSession, SessionProvider,
    UnauthenticatedReason,
};

/// What a protected endpoint should do with the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session is valid. Run the handler.
    Proceed(AuthenticatedSession),
    /// Session was stale and has been refreshed. Store `sealed_session` in
    /// the cookie, then run the handler or acknowledge the refresh.
    Refreshed {
        session: AuthenticatedSession,
        sealed_session: SealedSession,
    },
    /// No usable session. Do not run the handler.
    Reauthenticate(ReauthCause),
}

/// Why the caller has to log in again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReauthCause {
    /// No session cookie was sent.
    MissingSession,
    /// The provider answered the refresh with a rejection.
    RefreshRejected(UnauthenticatedReason),
    /// The session was unusable and no refresh was attempted.
    InvalidSession(UnauthenticatedReason),
    /// The provider failed while validating or refreshing.
    ProviderFailure,
}

impl ReauthCause {
    /// Whether the stale cookie must be deleted from the client.
    pub fn clears_cookie(&self) -> bool {
        !matches!(self, Self::MissingSession)
    }

    /// Short, stable label for logs and response bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingSession => "missing_session",
            Self::RefreshRejected(_) => "refresh_rejected",
            Self::InvalidSession(_) => "invalid_session",
            Self::ProviderFailure => "provider_failure",
        }
    }
}

/// Decide what to do with a request carrying `token`.
///
/// At most one refresh is attempted. Provider errors never escape: they
/// become [`ReauthCause::ProviderFailure`].
pub async fn guard(provider: &dyn SessionProvider, token: Option<&SealedSession>) -> GuardDecision {
    let reason = match provider.authenticate(token).await {
        Ok(AuthenticationResult::Authenticated(session)) => {
            tracing::debug!(user_id = %session.user.id, "session validated");
            return GuardDecision::Proceed(session);
        }
        Ok(AuthenticationResult::Unauthenticated { reason }) => reason,
        Err(e) => {
            tracing::warn!(error = %e, "session validation failed");
            return GuardDecision::Reauthenticate(ReauthCause::ProviderFailure);
        }
    };

    tracing::debug!(reason = %reason, "session not authenticated");

    if reason == UnauthenticatedReason::NoSessionCookieProvided {
        return GuardDecision::Reauthenticate(ReauthCause::MissingSession);
    }

    let Some(token) = token else {
        return GuardDecision::Reauthenticate(ReauthCause::MissingSession);
    };

    tracing::info!(reason = %reason, "attempting session refresh");

    match provider.refresh(token).await {
        Ok(RefreshOutcome::Refreshed {
            session,
            sealed_session,
        }) => {
            tracing::info!(user_id = %session.user.id, "session refreshed");
            GuardDecision::Refreshed {
                session,
                sealed_session,
            }
        }
        Ok(RefreshOutcome::Rejected { reason }) => {
            tracing::info!(reason = %reason, "session refresh rejected");
            GuardDecision::Reauthenticate(ReauthCause::RefreshRejected(reason))
        }
        Err(e) => {
            tracing::warn!(error = %e, "session refresh failed");
            GuardDecision::Reauthenticate(ReauthCause::ProviderFailure)
        }
    }
}
