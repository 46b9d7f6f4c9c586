use serde::{Deserialize, Serialize};

/// Opaque sealed session token carried in the session cookie.
///
/// The guard never looks inside; only a [`SessionProvider`](super::SessionProvider)
/// can validate or refresh it. `Debug` is redacted so tokens never reach logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SealedSession(String);

impl SealedSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Builds a token from a raw cookie value, treating an empty value as absent.
    pub fn from_cookie_value(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for SealedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SealedSession(<redacted, {} bytes>)", self.0.len())
    }
}

/// User as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

/// A session that passed validation.
///
/// Role and permissions are claims of the session's access token, not of the
/// user record, so they live here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedSession {
    pub session_id: String,
    pub user: User,
    pub organization_id: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Why a sealed session was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnauthenticatedReason {
    /// No cookie, or an empty one.
    NoSessionCookieProvided,
    /// The cookie could not be unsealed.
    InvalidSessionCookie,
    /// The access token inside the session is expired or unreadable.
    InvalidJwt,
    /// The provider refused the refresh token.
    InvalidGrant,
}

impl UnauthenticatedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSessionCookieProvided => "no_session_cookie_provided",
            Self::InvalidSessionCookie => "invalid_session_cookie",
            Self::InvalidJwt => "invalid_jwt",
            Self::InvalidGrant => "invalid_grant",
        }
    }
}

impl std::fmt::Display for UnauthenticatedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating a sealed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationResult {
    Authenticated(AuthenticatedSession),
    Unauthenticated { reason: UnauthenticatedReason },
}

impl AuthenticationResult {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Outcome of a refresh attempt that reached the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed {
        sealed_session: SealedSession,
        session: AuthenticatedSession,
    },
    Rejected {
        reason: UnauthenticatedReason,
    },
}

/// Result of exchanging an authorization code at the end of the login flow.
#[derive(Debug, Clone)]
pub struct CodeExchange {
    pub sealed_session: SealedSession,
    pub session: AuthenticatedSession,
}
