//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::Response,
};
use axum_extra::extract::CookieJar;
use sessionguard_core::auth::{
    AuthenticatedSession, AuthenticationResult, ReauthCause, UnauthenticatedReason,
};

use crate::cookies;
use crate::guard::reauthenticate;
use crate::AuthState;

/// Extractor for the authenticated session.
///
/// Reads the session stored by [`require_session`](crate::require_session).
/// On routes without the middleware it validates the cookie itself, without
/// refreshing (an extractor cannot set cookies on the response).
pub struct Authenticated(pub AuthenticatedSession);

impl<S> FromRequestParts<S> for Authenticated
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<AuthenticatedSession>() {
            return Ok(Authenticated(session.clone()));
        }

        let auth_state = AuthState::from_ref(state);
        let mode = auth_state.config.guard_mode;

        let jar = CookieJar::from_headers(&parts.headers);
        let token = cookies::session_from_jar(&jar);

        match auth_state.provider.authenticate(token.as_ref()).await {
            Ok(AuthenticationResult::Authenticated(session)) => {
                parts.extensions.insert(session.clone());
                Ok(Authenticated(session))
            }
            Ok(AuthenticationResult::Unauthenticated { reason }) => {
                let cause = match reason {
                    UnauthenticatedReason::NoSessionCookieProvided => ReauthCause::MissingSession,
                    other => ReauthCause::InvalidSession(other),
                };
                Err(reauthenticate(mode, cause))
            }
            Err(e) => {
                tracing::warn!(error = %e, "session validation failed");
                Err(reauthenticate(mode, ReauthCause::ProviderFailure))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use std::time::Duration;

    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::get,
        Router,
    };
    use http_body_util::BodyExt;
    use sessionguard_core::auth::{
        AuthError, CodeExchange, RefreshOutcome, Result, SealedSession, SessionProvider, User,
    };
    use tower::ServiceExt;
    use url::Url;

    use crate::config::{AuthConfig, GuardMode, RefreshBehavior, WorkosConfig};

    /// Accepts the cookie value `valid`, anything else is unreadable.
    #[derive(Default)]
    struct CountingProvider {
        refresh_calls: AtomicUsize,
    }

    #[async_trait]
    impl SessionProvider for CountingProvider {
        async fn authorization_url(&self, _state: &str) -> Result<Url> {
            unreachable!("not used by the extractor")
        }

        async fn authenticate_with_code(&self, _code: &str) -> Result<CodeExchange> {
            unreachable!("not used by the extractor")
        }

        async fn authenticate(&self, sealed: Option<&SealedSession>) -> Result<AuthenticationResult> {
            let reason = match sealed.map(SealedSession::as_str) {
                None => UnauthenticatedReason::NoSessionCookieProvided,
                Some("valid") => {
                    return Ok(AuthenticationResult::Authenticated(AuthenticatedSession {
                        session_id: "session_1".to_string(),
                        user: User {
                            id: "u1".to_string(),
                            email: "a@b.com".to_string(),
                            first_name: None,
                            last_name: None,
                            email_verified: true,
                            profile_picture_url: None,
                        },
                        organization_id: None,
                        role: None,
                        permissions: Vec::new(),
                    }))
                }
                Some(_) => UnauthenticatedReason::InvalidSessionCookie,
            };
            Ok(AuthenticationResult::Unauthenticated { reason })
        }

        async fn refresh(&self, _sealed: &SealedSession) -> Result<RefreshOutcome> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            Err(AuthError::Provider("refresh must not be called".to_string()))
        }

        async fn logout_url(&self, _sealed: &SealedSession) -> Result<Url> {
            unreachable!("not used by the extractor")
        }
    }

    fn config(guard_mode: GuardMode) -> AuthConfig {
        AuthConfig {
            workos: WorkosConfig {
                api_key: "sk_test".to_string(),
                client_id: "client_test".to_string(),
                api_base_url: Url::parse("https://api.workos.com").unwrap(),
                redirect_uri: Url::parse("http://localhost:5000/api/callback").unwrap(),
                cookie_password: "test-cookie-password-that-is-long-enough".to_string(),
                timeout: Duration::from_secs(1),
            },
            frontend_url: Url::parse("http://localhost:5173").unwrap(),
            guard_mode,
            refresh_behavior: RefreshBehavior::Replay,
        }
    }

    /// Router using the extractor without `require_session` mounted.
    fn app(provider: Arc<CountingProvider>, guard_mode: GuardMode) -> Router {
        Router::new()
            .route(
                "/me",
                get(|Authenticated(session): Authenticated| async move { session.user.id }),
            )
            .with_state(AuthState::new(provider, config(guard_mode)))
    }

    fn request(cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/me");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, format!("wos_session={cookie}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_missing_cookie_is_not_authenticated() {
        let provider = Arc::new(CountingProvider::default());

        let response = app(provider.clone(), GuardMode::Api)
            .oneshot(request(None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = json_body(response).await;
        assert_eq!(json["error"], "Not authenticated");
        assert_eq!(json["redirect"], "/api/login");
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unreadable_cookie_is_rejected_without_refresh() {
        let provider = Arc::new(CountingProvider::default());

        let response = app(provider.clone(), GuardMode::Api)
            .oneshot(request(Some("garbage")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let json = json_body(response).await;
        assert_eq!(json["error"], "Invalid session");
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unreadable_cookie_redirects_in_redirect_mode() {
        let provider = Arc::new(CountingProvider::default());

        let response = app(provider.clone(), GuardMode::Redirect)
            .oneshot(request(Some("garbage")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/api/login");
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_cookie_runs_handler() {
        let provider = Arc::new(CountingProvider::default());

        let response = app(provider, GuardMode::Api)
            .oneshot(request(Some("valid")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"u1");
    }
}
