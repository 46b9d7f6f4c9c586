//! HTTP handlers for auth routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Json, Router,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use sessionguard_core::auth::{generate_state, with_error_param};

use crate::cookies;
use crate::AuthState;

/// Query parameters for the provider callback.
#[derive(Deserialize, Default)]
pub struct CallbackQuery {
    pub code: Option<String>,
    /// Set by the provider when the user cancelled or the flow failed.
    pub error: Option<String>,
}

/// Body returned by logout.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Where the browser should go to end the provider session.
    pub url: String,
    pub message: String,
}

/// Creates the auth router with all authentication routes.
///
/// Routes:
/// - `GET /api/login` - Redirect to the provider's hosted sign-in page
/// - `GET /api/callback` - Exchange the authorization code and set the session cookie
/// - `GET /api/logout` - Delete the session cookie and return the provider logout URL
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/api/login", get(login))
        .route("/api/callback", get(callback))
        .route("/api/logout", get(logout))
}

async fn login(State(state): State<AuthState>) -> Redirect {
    let csrf_state = generate_state();

    match state.provider.authorization_url(&csrf_state).await {
        Ok(auth_url) => {
            tracing::info!("redirecting to identity provider");
            Redirect::to(auth_url.as_str())
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to build authorization URL");
            Redirect::to(with_error_param(&state.config.frontend_url, "login_failed").as_str())
        }
    }
}

async fn callback(
    State(state): State<AuthState>,
    Query(params): Query<CallbackQuery>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let frontend = &state.config.frontend_url;
    let failed = || Redirect::to(with_error_param(frontend, "auth_failed").as_str());

    if let Some(error) = params.error.as_deref() {
        tracing::warn!(error, "provider reported a failed sign-in");
        return (jar, failed());
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        tracing::warn!("callback without authorization code");
        return (jar, failed());
    };

    match state.provider.authenticate_with_code(&code).await {
        Ok(exchange) => {
            tracing::info!(user_id = %exchange.session.user.id, "user signed in");
            let jar = cookies::set_session(jar, &exchange.sealed_session);
            (jar, Redirect::to(frontend.as_str()))
        }
        Err(e) => {
            tracing::warn!(error = %e, "authorization code exchange failed");
            (jar, failed())
        }
    }
}

async fn logout(State(state): State<AuthState>, jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    let fallback = state.config.frontend_url.to_string();

    let url = match cookies::session_from_jar(&jar) {
        Some(sealed) => match state.provider.logout_url(&sealed).await {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "could not get provider logout URL, using fallback");
                fallback
            }
        },
        None => {
            tracing::debug!("logout without session cookie");
            fallback
        }
    };

    // The local session ends regardless of what the provider said
    let jar = cookies::delete_session(jar);

    (
        jar,
        Json(LogoutResponse {
            url,
            message: "Logging out".to_string(),
        }),
    )
}
