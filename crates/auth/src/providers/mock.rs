//! Mock identity provider for development and testing.
//!
//! This module provides a mock implementation of `SessionProvider` that works
//! with the Mock IdP server for local development. Sealed sessions are plain
//! base64 JSON envelopes: nothing here is secret.

use async_trait::async_trait;
use base64::Engine;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sessionguard_core::auth::{
    AuthError, AuthenticatedSession, AuthenticationResult, CodeExchange, RefreshOutcome, Result,
    SealedSession, SessionProvider, UnauthenticatedReason, User,
};
use url::Url;

/// Contents of a mock sealed session.
#[derive(Debug, Serialize, Deserialize)]
struct MockSession {
    session_id: String,
    user: User,
    expires_at: i64,
}

/// Mock provider that works with MockIdpServer.
///
/// Authorization URLs point at the Mock IdP server, and authorization codes
/// carry the user entered on its sign-in form.
pub struct MockProvider {
    mock_idp_url: Url,
    redirect_uri: Url,
    session_ttl: Duration,
}

impl MockProvider {
    /// Create a new MockProvider.
    ///
    /// # Arguments
    /// * `mock_idp_url` - The URL of the Mock IdP server (e.g., http://localhost:3001)
    /// * `redirect_uri` - The callback URL for the main app
    pub fn new(mock_idp_url: Url, redirect_uri: Url) -> Self {
        Self {
            mock_idp_url,
            redirect_uri,
            session_ttl: Duration::minutes(5),
        }
    }

    /// Override how long a mock session stays valid before it needs a refresh.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    fn seal(&self, session: &MockSession) -> Result<SealedSession> {
        let json = serde_json::to_vec(session).map_err(|e| AuthError::Seal(e.to_string()))?;
        Ok(SealedSession::new(
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json),
        ))
    }

    fn unseal(&self, sealed: &SealedSession) -> Option<MockSession> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(sealed.as_str())
            .ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    fn issue(&self, session_id: String, user: User) -> Result<(SealedSession, AuthenticatedSession)> {
        let session = MockSession {
            session_id,
            user,
            expires_at: (Utc::now() + self.session_ttl).timestamp(),
        };
        let sealed = self.seal(&session)?;
        Ok((sealed, authenticated(session)))
    }
}

fn authenticated(session: MockSession) -> AuthenticatedSession {
    AuthenticatedSession {
        session_id: session.session_id,
        user: session.user,
        organization_id: None,
        role: Some("member".to_string()),
        permissions: Vec::new(),
    }
}

#[async_trait]
impl SessionProvider for MockProvider {
    async fn authorization_url(&self, state: &str) -> Result<Url> {
        let mut url = self
            .mock_idp_url
            .join("/user_management/authorize")
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        url.query_pairs_mut()
            .append_pair("provider", "authkit")
            .append_pair("state", state)
            .append_pair("redirect_uri", self.redirect_uri.as_str());

        Ok(url)
    }

    async fn authenticate_with_code(&self, code: &str) -> Result<CodeExchange> {
        // Decode the mock code (it contains the user info)
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(code)
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?;

        let json: serde_json::Value =
            serde_json::from_slice(&decoded).map_err(|e| AuthError::CodeExchange(e.to_string()))?;

        let email = json["email"]
            .as_str()
            .ok_or_else(|| AuthError::CodeExchange("mock code has no email".to_string()))?;

        let user = User {
            id: format!("user_mock_{email}"),
            email: email.to_string(),
            first_name: json["first_name"].as_str().map(String::from),
            last_name: json["last_name"].as_str().map(String::from),
            email_verified: true,
            profile_picture_url: None,
        };

        let session_id = format!("session_mock_{}", sessionguard_core::auth::generate_state());
        let (sealed_session, session) = self.issue(session_id, user)?;

        Ok(CodeExchange {
            sealed_session,
            session,
        })
    }

    async fn authenticate(&self, sealed: Option<&SealedSession>) -> Result<AuthenticationResult> {
        let Some(sealed) = sealed else {
            return Ok(AuthenticationResult::Unauthenticated {
                reason: UnauthenticatedReason::NoSessionCookieProvided,
            });
        };

        let Some(session) = self.unseal(sealed) else {
            return Ok(AuthenticationResult::Unauthenticated {
                reason: UnauthenticatedReason::InvalidSessionCookie,
            });
        };

        if session.expires_at <= Utc::now().timestamp() {
            return Ok(AuthenticationResult::Unauthenticated {
                reason: UnauthenticatedReason::InvalidJwt,
            });
        }

        Ok(AuthenticationResult::Authenticated(authenticated(session)))
    }

    async fn refresh(&self, sealed: &SealedSession) -> Result<RefreshOutcome> {
        let Some(session) = self.unseal(sealed) else {
            return Ok(RefreshOutcome::Rejected {
                reason: UnauthenticatedReason::InvalidSessionCookie,
            });
        };

        let (sealed_session, session) = self.issue(session.session_id, session.user)?;
        Ok(RefreshOutcome::Refreshed {
            sealed_session,
            session,
        })
    }

    async fn logout_url(&self, sealed: &SealedSession) -> Result<Url> {
        let session = self
            .unseal(sealed)
            .ok_or_else(|| AuthError::InvalidToken("not a mock session".to_string()))?;

        let mut url = self
            .mock_idp_url
            .join("/user_management/sessions/logout")
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("session_id", &session.session_id);

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MockProvider {
        MockProvider::new(
            Url::parse("http://localhost:3001").unwrap(),
            Url::parse("http://localhost:5000/api/callback").unwrap(),
        )
    }

    fn mock_code(email: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(
            serde_json::json!({
                "email": email,
                "first_name": "Test",
                "last_name": "User",
            })
            .to_string(),
        )
    }

    #[tokio::test]
    async fn test_authorization_url() {
        let url = provider().authorization_url("test-state").await.unwrap();

        assert!(url.path().contains("/user_management/authorize"));
        assert!(url.query().unwrap().contains("state=test-state"));
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let provider = provider();

        let exchange = provider
            .authenticate_with_code(&mock_code("test@example.com"))
            .await
            .unwrap();

        assert_eq!(exchange.session.user.email, "test@example.com");
        assert_eq!(exchange.session.user.first_name.as_deref(), Some("Test"));

        let result = provider
            .authenticate(Some(&exchange.sealed_session))
            .await
            .unwrap();
        assert!(result.is_authenticated());
    }

    #[tokio::test]
    async fn test_exchange_code_invalid() {
        let result = provider().authenticate_with_code("invalid-code").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_expired_session_refreshes() {
        let provider = provider().with_session_ttl(Duration::seconds(-1));
        let exchange = provider
            .authenticate_with_code(&mock_code("test@example.com"))
            .await
            .unwrap();

        let result = provider
            .authenticate(Some(&exchange.sealed_session))
            .await
            .unwrap();
        assert_eq!(
            result,
            AuthenticationResult::Unauthenticated {
                reason: UnauthenticatedReason::InvalidJwt
            }
        );

        let outcome = provider.refresh(&exchange.sealed_session).await.unwrap();
        assert!(matches!(outcome, RefreshOutcome::Refreshed { .. }));
    }

    #[tokio::test]
    async fn test_logout_url() {
        let provider = provider();
        let exchange = provider
            .authenticate_with_code(&mock_code("test@example.com"))
            .await
            .unwrap();

        let url = provider.logout_url(&exchange.sealed_session).await.unwrap();

        assert_eq!(url.path(), "/user_management/sessions/logout");
        assert!(url.query().unwrap().starts_with("session_id=session_mock_"));
    }
}
