//! Application state for auth.

use std::sync::Arc;

use sessionguard_core::auth::SessionProvider;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::providers::WorkosProvider;

/// Shared state for auth handlers and the session guard.
///
/// Built once at startup and handed to routers; there is no process-wide
/// provider client.
#[derive(Clone)]
pub struct AuthState {
    pub provider: Arc<dyn SessionProvider>,
    pub config: Arc<AuthConfig>,
}

impl AuthState {
    /// Creates an AuthState around an already constructed provider.
    pub fn new(provider: Arc<dyn SessionProvider>, config: AuthConfig) -> Self {
        Self {
            provider,
            config: Arc::new(config),
        }
    }

    /// Creates an AuthState backed by the WorkOS API.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider's HTTP client cannot be built.
    pub fn workos(config: AuthConfig) -> Result<Self, AuthError> {
        let provider = WorkosProvider::new(&config.workos)?;
        Ok(Self::new(Arc::new(provider), config))
    }

    /// Creates an AuthState backed by the Mock IdP server for development.
    #[cfg(feature = "mock")]
    pub fn mock(config: AuthConfig, mock_idp_url: url::Url) -> Self {
        let provider = crate::providers::MockProvider::new(
            mock_idp_url,
            config.workos.redirect_uri.clone(),
        );
        Self::new(Arc::new(provider), config)
    }
}
