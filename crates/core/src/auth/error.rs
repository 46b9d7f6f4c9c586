use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("identity provider error: {0}")]
    Provider(String),

    #[error("identity provider unreachable: {0}")]
    Transport(String),

    #[error("failed to exchange authorization code: {0}")]
    CodeExchange(String),

    #[error("failed to seal session: {0}")]
    Seal(String),

    #[error("invalid access token: {0}")]
    InvalidToken(String),
}
