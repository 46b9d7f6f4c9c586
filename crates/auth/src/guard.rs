//! Axum binding of the session guard.
//!
//! Mount [`require_session`] on protected routes with
//! `axum::middleware::from_fn_with_state`. Handlers then receive the session
//! through the [`Authenticated`](crate::Authenticated) extractor.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde_json::json;
use sessionguard_core::auth::{guard, GuardDecision, ReauthCause};

use crate::config::{GuardMode, RefreshBehavior, LOGIN_PATH};
use crate::cookies;
use crate::AuthState;

/// Middleware enforcing an authenticated session.
///
/// - valid session: the handler runs with the session in request extensions
/// - stale session refreshed: new cookie, then replay or acknowledge
/// - otherwise: login redirect or 401, stale cookie deleted
pub async fn require_session(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = cookies::session_from_jar(&jar);

    match guard(state.provider.as_ref(), token.as_ref()).await {
        GuardDecision::Proceed(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        GuardDecision::Refreshed {
            session,
            sealed_session,
        } => {
            let jar = cookies::set_session(jar, &sealed_session);
            match state.config.refresh_behavior {
                RefreshBehavior::Replay => {
                    request.extensions_mut().insert(session);
                    let response = next.run(request).await;
                    (jar, response).into_response()
                }
                RefreshBehavior::Acknowledge => {
                    (jar, Json(json!({ "message": "Session refreshed" }))).into_response()
                }
            }
        }
        GuardDecision::Reauthenticate(cause) => {
            tracing::info!(
                path = %request.uri().path(),
                cause = cause.as_str(),
                "re-authentication required"
            );
            let jar = if cause.clears_cookie() {
                cookies::delete_session(jar)
            } else {
                jar
            };
            (jar, reauthenticate(state.config.guard_mode, cause)).into_response()
        }
    }
}

/// Response telling the caller to log in again.
pub fn reauthenticate(mode: GuardMode, cause: ReauthCause) -> Response {
    match mode {
        GuardMode::Redirect => Redirect::to(LOGIN_PATH).into_response(),
        GuardMode::Api => {
            let error = match cause {
                ReauthCause::MissingSession => "Not authenticated",
                ReauthCause::RefreshRejected(_) => "Session expired",
                ReauthCause::InvalidSession(_) => "Invalid session",
                ReauthCause::ProviderFailure => "Session refresh failed",
            };
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": error, "redirect": LOGIN_PATH })),
            )
                .into_response()
        }
    }
}
