use async_trait::async_trait;
use url::Url;

use super::{AuthError, AuthenticationResult, CodeExchange, RefreshOutcome, SealedSession};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Abstraction over the hosted identity provider.
///
/// Implementations own everything about the sealed session format; callers
/// only move [`SealedSession`] values between the cookie and the provider.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Authorization URL the browser is sent to when logging in.
    async fn authorization_url(&self, state: &str) -> Result<Url>;

    /// Exchange the authorization code from the callback for a sealed session.
    async fn authenticate_with_code(&self, code: &str) -> Result<CodeExchange>;

    /// Validate a sealed session. `None` means no cookie was sent.
    async fn authenticate(&self, sealed: Option<&SealedSession>) -> Result<AuthenticationResult>;

    /// Trade the session's refresh token for a new sealed session.
    async fn refresh(&self, sealed: &SealedSession) -> Result<RefreshOutcome>;

    /// Provider URL that ends the session on the provider side.
    async fn logout_url(&self, sealed: &SealedSession) -> Result<Url>;
}
