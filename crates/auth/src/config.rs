use std::time::Duration;

use url::Url;

use crate::error::AuthError;

/// Name of the cookie carrying the sealed session.
pub const SESSION_COOKIE_NAME: &str = "wos_session";

/// Login entry point that re-authentication signals point to.
pub const LOGIN_PATH: &str = "/api/login";

const MIN_COOKIE_PASSWORD_LEN: usize = 32;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";

/// How the guard answers requests that must log in again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardMode {
    /// `303 See Other` to the login entry point. For browser navigation.
    Redirect,
    /// `401` with a JSON body carrying a `redirect` hint. For API clients.
    #[default]
    Api,
}

impl std::str::FromStr for GuardMode {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redirect" => Ok(Self::Redirect),
            "api" => Ok(Self::Api),
            other => Err(AuthError::Config(format!(
                "GUARD_MODE must be 'redirect' or 'api', got '{other}'"
            ))),
        }
    }
}

/// What the guard does after a successful refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshBehavior {
    /// Run the handler with the refreshed session and attach the new cookie.
    #[default]
    Replay,
    /// Answer `{"message": "Session refreshed"}` with the new cookie; the
    /// client repeats the request.
    Acknowledge,
}

impl std::str::FromStr for RefreshBehavior {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "replay" => Ok(Self::Replay),
            "acknowledge" | "ack" => Ok(Self::Acknowledge),
            other => Err(AuthError::Config(format!(
                "REFRESH_BEHAVIOR must be 'replay' or 'acknowledge', got '{other}'"
            ))),
        }
    }
}

/// WorkOS credentials and endpoints.
#[derive(Clone)]
pub struct WorkosConfig {
    pub api_key: String,
    pub client_id: String,
    pub api_base_url: Url,
    pub redirect_uri: Url,
    pub cookie_password: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for WorkosConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkosConfig")
            .field("client_id", &self.client_id)
            .field("api_base_url", &self.api_base_url.as_str())
            .field("redirect_uri", &self.redirect_uri.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Complete auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub workos: WorkosConfig,
    /// Where the browser lands after login, logout or a failed callback.
    pub frontend_url: Url,
    pub guard_mode: GuardMode,
    pub refresh_behavior: RefreshBehavior,
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `WORKOS_API_KEY`: WorkOS API key (required)
    /// - `WORKOS_CLIENT_ID`: WorkOS client ID (required)
    /// - `WORKOS_REDIRECT_URI`: Callback URL registered with WorkOS (required)
    /// - `WORKOS_COOKIE_PASSWORD`: Secret used to seal session cookies, at least 32 characters (required)
    /// - `WORKOS_API_URL`: WorkOS API base URL (default: `https://api.workos.com`)
    /// - `WORKOS_TIMEOUT_SECS`: Timeout for calls to WorkOS in seconds (default: 10)
    /// - `FRONTEND_URL`: Frontend origin (default: `http://localhost:5173`)
    /// - `GUARD_MODE`: `api` or `redirect` (default: `api`)
    /// - `REFRESH_BEHAVIOR`: `replay` or `acknowledge` (default: `replay`)
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if a required variable is missing or a value is malformed.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AuthError> {
        let vars = Vars(lookup);

        let api_base_url = vars.url_or("WORKOS_API_URL", "https://api.workos.com")?;
        let redirect_uri = parse_url("WORKOS_REDIRECT_URI", &vars.required("WORKOS_REDIRECT_URI")?)?;

        let cookie_password = vars.required("WORKOS_COOKIE_PASSWORD")?;
        if cookie_password.chars().count() < MIN_COOKIE_PASSWORD_LEN {
            return Err(AuthError::Config(format!(
                "WORKOS_COOKIE_PASSWORD must be at least {MIN_COOKIE_PASSWORD_LEN} characters"
            )));
        }

        let timeout = vars
            .optional("WORKOS_TIMEOUT_SECS")
            .map(|v| {
                v.trim().parse::<u64>().map_err(|_| {
                    AuthError::Config(format!("WORKOS_TIMEOUT_SECS must be a number, got '{v}'"))
                })
            })
            .transpose()?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(Self {
            workos: WorkosConfig {
                api_key: vars.required("WORKOS_API_KEY")?,
                client_id: vars.required("WORKOS_CLIENT_ID")?,
                api_base_url,
                redirect_uri,
                cookie_password,
                timeout,
            },
            frontend_url: vars.url_or("FRONTEND_URL", DEFAULT_FRONTEND_URL)?,
            guard_mode: vars.guard_mode()?,
            refresh_behavior: vars.refresh_behavior()?,
        })
    }

    /// Configuration for running against the Mock IdP.
    ///
    /// WorkOS credentials are placeholders. `FRONTEND_URL`, `GUARD_MODE` and
    /// `REFRESH_BEHAVIOR` are still read from the environment.
    #[cfg(feature = "mock")]
    pub fn development(port: u16) -> Result<Self, AuthError> {
        let vars = Vars(|name: &str| std::env::var(name).ok());

        Ok(Self {
            workos: WorkosConfig {
                api_key: "sk_mock".to_string(),
                client_id: "client_mock".to_string(),
                api_base_url: parse_url("WORKOS_API_URL", "https://api.workos.com")?,
                redirect_uri: parse_url(
                    "WORKOS_REDIRECT_URI",
                    &format!("http://localhost:{port}/api/callback"),
                )?,
                cookie_password: "mock-cookie-password-for-development".to_string(),
                timeout: DEFAULT_TIMEOUT,
            },
            frontend_url: vars.url_or("FRONTEND_URL", DEFAULT_FRONTEND_URL)?,
            guard_mode: vars.guard_mode()?,
            refresh_behavior: vars.refresh_behavior()?,
        })
    }
}

/// Variable source. Blank values count as unset.
struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, name: &str) -> Result<String, AuthError> {
        self.optional(name)
            .ok_or_else(|| AuthError::Config(format!("{name} is not set")))
    }

    fn url_or(&self, name: &str, default: &str) -> Result<Url, AuthError> {
        parse_url(name, &self.optional(name).unwrap_or_else(|| default.to_string()))
    }

    fn guard_mode(&self) -> Result<GuardMode, AuthError> {
        Ok(self
            .optional("GUARD_MODE")
            .map(|v| v.parse::<GuardMode>())
            .transpose()?
            .unwrap_or_default())
    }

    fn refresh_behavior(&self) -> Result<RefreshBehavior, AuthError> {
        Ok(self
            .optional("REFRESH_BEHAVIOR")
            .map(|v| v.parse::<RefreshBehavior>())
            .transpose()?
            .unwrap_or_default())
    }
}

fn parse_url(name: &str, value: &str) -> Result<Url, AuthError> {
    value
        .parse()
        .map_err(|e| AuthError::Config(format!("{name} is not a valid URL: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_mode_parses_case_insensitively() {
        assert_eq!("Redirect".parse::<GuardMode>().unwrap(), GuardMode::Redirect);
        assert_eq!("api".parse::<GuardMode>().unwrap(), GuardMode::Api);
        assert!("json".parse::<GuardMode>().is_err());
    }

    #[test]
    fn refresh_behavior_accepts_short_form() {
        assert_eq!(
            "ack".parse::<RefreshBehavior>().unwrap(),
            RefreshBehavior::Acknowledge
        );
        assert_eq!(
            "replay".parse::<RefreshBehavior>().unwrap(),
            RefreshBehavior::Replay
        );
    }

    #[test]
    fn defaults_favor_api_and_replay() {
        assert_eq!(GuardMode::default(), GuardMode::Api);
        assert_eq!(RefreshBehavior::default(), RefreshBehavior::Replay);
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("WORKOS_API_KEY", "sk_test"),
        ("WORKOS_CLIENT_ID", "client_123"),
        ("WORKOS_REDIRECT_URI", "http://localhost:5000/api/callback"),
        ("WORKOS_COOKIE_PASSWORD", "0123456789abcdef0123456789abcdef"),
    ];

    fn with(overrides: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        let mut vars: Vec<_> = REQUIRED
            .iter()
            .filter(|(k, _)| !overrides.iter().any(|(o, _)| o == k))
            .copied()
            .collect();
        vars.extend_from_slice(overrides);
        vars
    }

    #[test]
    fn from_lookup_applies_defaults() {
        let vars = with(&[]);
        let config = AuthConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.workos.client_id, "client_123");
        assert_eq!(config.workos.api_base_url.as_str(), "https://api.workos.com/");
        assert_eq!(config.workos.timeout, Duration::from_secs(10));
        assert_eq!(config.frontend_url.as_str(), "http://localhost:5173/");
        assert_eq!(config.guard_mode, GuardMode::Api);
        assert_eq!(config.refresh_behavior, RefreshBehavior::Replay);
    }

    #[test]
    fn from_lookup_reads_overrides() {
        let vars = with(&[
            ("WORKOS_TIMEOUT_SECS", "3"),
            ("FRONTEND_URL", "https://app.example.com"),
            ("GUARD_MODE", "redirect"),
            ("REFRESH_BEHAVIOR", "acknowledge"),
        ]);
        let config = AuthConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.workos.timeout, Duration::from_secs(3));
        assert_eq!(config.frontend_url.as_str(), "https://app.example.com/");
        assert_eq!(config.guard_mode, GuardMode::Redirect);
        assert_eq!(config.refresh_behavior, RefreshBehavior::Acknowledge);
    }

    #[test]
    fn short_cookie_password_is_rejected() {
        let vars = with(&[("WORKOS_COOKIE_PASSWORD", "too-short")]);
        let err = AuthConfig::from_lookup(lookup(&vars)).unwrap_err();

        assert!(matches!(err, AuthError::Config(ref msg) if msg.contains("at least 32")));
    }

    #[test]
    fn missing_client_id_is_rejected() {
        let vars: Vec<_> = with(&[])
            .into_iter()
            .filter(|(k, _)| *k != "WORKOS_CLIENT_ID")
            .collect();
        let err = AuthConfig::from_lookup(lookup(&vars)).unwrap_err();

        assert!(matches!(err, AuthError::Config(ref msg) if msg.contains("WORKOS_CLIENT_ID")));
    }

    #[test]
    fn blank_required_value_counts_as_missing() {
        let vars = with(&[("WORKOS_API_KEY", "  ")]);
        let err = AuthConfig::from_lookup(lookup(&vars)).unwrap_err();

        assert!(matches!(err, AuthError::Config(ref msg) if msg.contains("WORKOS_API_KEY")));
    }

    #[test]
    fn non_numeric_timeout_is_rejected() {
        let vars = with(&[("WORKOS_TIMEOUT_SECS", "ten")]);
        let err = AuthConfig::from_lookup(lookup(&vars)).unwrap_err();

        assert!(matches!(err, AuthError::Config(ref msg) if msg.contains("WORKOS_TIMEOUT_SECS")));
    }

    #[test]
    fn malformed_guard_mode_is_rejected() {
        let vars = with(&[("GUARD_MODE", "json")]);
        assert!(matches!(
            AuthConfig::from_lookup(lookup(&vars)),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn debug_hides_secrets() {
        let config = WorkosConfig {
            api_key: "sk_test_secret".to_string(),
            client_id: "client_123".to_string(),
            api_base_url: Url::parse("https://api.workos.com").unwrap(),
            redirect_uri: Url::parse("http://localhost:5000/api/callback").unwrap(),
            cookie_password: "x".repeat(32),
            timeout: Duration::from_secs(10),
        };

        let debug = format!("{config:?}");
        assert!(debug.contains("client_123"));
        assert!(!debug.contains("sk_test_secret"));
        assert!(!debug.contains(&"x".repeat(32)));
    }
}
