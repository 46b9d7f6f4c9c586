//! WorkOS User Management provider implementation.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use sessionguard_core::auth::{
    AuthError, AuthenticatedSession, AuthenticationResult, CodeExchange, RefreshOutcome, Result,
    SealedSession, SessionProvider, UnauthenticatedReason, User,
};
use url::Url;

use crate::config::WorkosConfig;
use crate::seal::Sealer;

/// Everything kept inside the sealed cookie.
#[derive(Debug, Serialize, Deserialize)]
struct SessionData {
    access_token: String,
    refresh_token: String,
    user: User,
    organization_id: Option<String>,
}

/// Claims read from the WorkOS access token.
#[derive(Debug, Deserialize)]
struct AccessTokenClaims {
    sid: String,
    exp: i64,
    org_id: Option<String>,
    role: Option<String>,
    permissions: Option<Vec<String>>,
}

#[derive(Serialize)]
struct AuthenticateRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct AuthenticateResponse {
    user: User,
    organization_id: Option<String>,
    access_token: String,
    refresh_token: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiError {
    error: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = self.error.as_deref().unwrap_or("unknown_error");
        match self.error_description.as_deref().or(self.message.as_deref()) {
            Some(detail) => write!(f, "{code}: {detail}"),
            None => f.write_str(code),
        }
    }
}

/// What `/user_management/authenticate` answered.
enum Grant {
    Issued(AuthenticateResponse),
    Rejected(ApiError),
}

/// WorkOS provider.
///
/// Talks to the User Management API over HTTPS and keeps the returned tokens
/// in a sealed cookie.
pub struct WorkosProvider {
    http_client: reqwest::Client,
    config: WorkosConfig,
    sealer: Sealer,
}

impl WorkosProvider {
    /// Create a new WorkOS provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &WorkosConfig) -> Result<Self> {
        // No redirect following, and an explicit deadline for every call
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::Provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            sealer: Sealer::new(&config.cookie_password),
            config: config.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.config
            .api_base_url
            .join(path)
            .map_err(|e| AuthError::Provider(e.to_string()))
    }

    async fn authenticate_grant(&self, request: &AuthenticateRequest<'_>) -> Result<Grant> {
        let url = self.endpoint("/user_management/authenticate")?;

        let response = self
            .http_client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .json::<AuthenticateResponse>()
                .await
                .map_err(|e| AuthError::Provider(format!("unexpected response body: {e}")))?;
            return Ok(Grant::Issued(body));
        }

        let error = response.json::<ApiError>().await.unwrap_or_default();
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Ok(Grant::Rejected(error))
            }
            _ => Err(AuthError::Provider(format!("HTTP {status}: {error}"))),
        }
    }

    /// Seal the tokens of a fresh grant and describe the resulting session.
    fn establish(&self, grant: AuthenticateResponse) -> Result<(SealedSession, AuthenticatedSession)> {
        let claims = decode_claims(&grant.access_token)?;
        let data = SessionData {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            user: grant.user,
            organization_id: grant.organization_id,
        };

        let sealed = self.sealer.seal(&data)?;
        Ok((sealed, session_from(data, claims)))
    }
}

#[async_trait]
impl SessionProvider for WorkosProvider {
    async fn authorization_url(&self, state: &str) -> Result<Url> {
        let mut url = self.endpoint("/user_management/authorize")?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", self.config.redirect_uri.as_str())
            .append_pair("response_type", "code")
            .append_pair("provider", "authkit")
            .append_pair("state", state);

        Ok(url)
    }

    async fn authenticate_with_code(&self, code: &str) -> Result<CodeExchange> {
        let request = AuthenticateRequest {
            client_id: &self.config.client_id,
            client_secret: &self.config.api_key,
            grant_type: "authorization_code",
            code: Some(code),
            refresh_token: None,
            organization_id: None,
        };

        match self.authenticate_grant(&request).await? {
            Grant::Issued(grant) => {
                let (sealed_session, session) = self.establish(grant)?;
                Ok(CodeExchange {
                    sealed_session,
                    session,
                })
            }
            Grant::Rejected(error) => Err(AuthError::CodeExchange(error.to_string())),
        }
    }

    async fn authenticate(&self, sealed: Option<&SealedSession>) -> Result<AuthenticationResult> {
        let Some(sealed) = sealed else {
            return Ok(unauthenticated(UnauthenticatedReason::NoSessionCookieProvided));
        };

        let Some(data) = self.sealer.unseal::<SessionData>(sealed) else {
            return Ok(unauthenticated(UnauthenticatedReason::InvalidSessionCookie));
        };

        let claims = match decode_claims(&data.access_token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "access token unreadable");
                return Ok(unauthenticated(UnauthenticatedReason::InvalidJwt));
            }
        };

        if claims.exp <= Utc::now().timestamp() {
            return Ok(unauthenticated(UnauthenticatedReason::InvalidJwt));
        }

        Ok(AuthenticationResult::Authenticated(session_from(data, claims)))
    }

    async fn refresh(&self, sealed: &SealedSession) -> Result<RefreshOutcome> {
        let Some(data) = self.sealer.unseal::<SessionData>(sealed) else {
            return Ok(RefreshOutcome::Rejected {
                reason: UnauthenticatedReason::InvalidSessionCookie,
            });
        };

        let request = AuthenticateRequest {
            client_id: &self.config.client_id,
            client_secret: &self.config.api_key,
            grant_type: "refresh_token",
            code: None,
            refresh_token: Some(&data.refresh_token),
            organization_id: data.organization_id.as_deref(),
        };

        match self.authenticate_grant(&request).await? {
            Grant::Issued(grant) => {
                let (sealed_session, session) = self.establish(grant)?;
                Ok(RefreshOutcome::Refreshed {
                    sealed_session,
                    session,
                })
            }
            Grant::Rejected(error) => {
                tracing::debug!(error = %error, "refresh token rejected");
                Ok(RefreshOutcome::Rejected {
                    reason: UnauthenticatedReason::InvalidGrant,
                })
            }
        }
    }

    async fn logout_url(&self, sealed: &SealedSession) -> Result<Url> {
        let data = self
            .sealer
            .unseal::<SessionData>(sealed)
            .ok_or_else(|| AuthError::InvalidToken("session cookie cannot be unsealed".to_string()))?;
        let claims = decode_claims(&data.access_token)?;

        let mut url = self.endpoint("/user_management/sessions/logout")?;
        url.query_pairs_mut().append_pair("session_id", &claims.sid);

        Ok(url)
    }
}

fn unauthenticated(reason: UnauthenticatedReason) -> AuthenticationResult {
    AuthenticationResult::Unauthenticated { reason }
}

fn transport_error(e: reqwest::Error) -> AuthError {
    if e.is_timeout() || e.is_connect() {
        AuthError::Transport(e.to_string())
    } else {
        AuthError::Provider(e.to_string())
    }
}

/// Read the access token claims.
///
/// The token only ever reaches us inside a cookie we sealed ourselves, straight
/// from the WorkOS API over TLS, so its signature is not checked again here.
/// Expiry is checked by the caller.
fn decode_claims(access_token: &str) -> Result<AccessTokenClaims> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.algorithms = vec![Algorithm::RS256, Algorithm::HS256];
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    jsonwebtoken::decode::<AccessTokenClaims>(
        access_token,
        &DecodingKey::from_secret(&[]),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

fn session_from(data: SessionData, claims: AccessTokenClaims) -> AuthenticatedSession {
    AuthenticatedSession {
        session_id: claims.sid,
        user: data.user,
        organization_id: data.organization_id.or(claims.org_id),
        role: claims.role,
        permissions: claims.permissions.unwrap_or_default(),
    }
}
