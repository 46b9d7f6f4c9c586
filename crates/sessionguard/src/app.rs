use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    routing::get,
    Router,
};
use sessionguard_auth::{auth_routes, require_session, AuthState};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::handlers::{
    health::livez,
    user::{dashboard, get_user},
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AuthState) -> Router {
    // Protected routes run behind the session guard
    let protected_routes = Router::new()
        .route("/api/user", get(get_user))
        .route("/api/dashboard", get(dashboard))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/livez", get(livez))
        .merge(auth_routes())
        .merge(protected_routes)
        .layer(cors_layer(&state))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(15),
        ))
        .with_state(state)
}

/// CORS for the frontend origin. Credentials are allowed so the browser sends
/// the session cookie.
fn cors_layer(state: &AuthState) -> CorsLayer {
    let origin = state.config.frontend_url.origin().ascii_serialization();

    let cors = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    match HeaderValue::from_str(&origin) {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!(error = %e, %origin, "frontend origin is not a valid header value");
            cors
        }
    }
}
