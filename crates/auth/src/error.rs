use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Auth errors for the sessionguard_auth crate.
///
/// Wraps the core `AuthError` and adds the variants that only exist in the
/// I/O shell.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (provider calls, sealing, tokens)
    #[error(transparent)]
    Core(#[from] sessionguard_core::auth::AuthError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        use sessionguard_core::auth::AuthError as CoreError;

        let (status, message) = match &self {
            AuthError::Core(core_err) => match core_err {
                CoreError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "Not authenticated"),
                CoreError::Provider(_) | CoreError::Transport(_) | CoreError::CodeExchange(_) => {
                    tracing::error!(error = %self, "identity provider error");
                    (StatusCode::BAD_GATEWAY, "Authentication provider error")
                }
                CoreError::Seal(_) => {
                    tracing::error!(error = %self, "session sealing error");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                }
            },
            AuthError::Config(_) => {
                tracing::error!(error = %self, "auth configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error",
                )
            }
        };

        (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
    }
}
