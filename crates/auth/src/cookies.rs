//! Session cookie construction.
//!
//! Every cookie written or removed here is `Secure`, `HttpOnly`,
//! `SameSite=Lax` and scoped to `/`. None of it is configurable.

use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use sessionguard_core::auth::SealedSession;

use crate::config::SESSION_COOKIE_NAME;

/// Cookie carrying a sealed session.
pub fn session_cookie(sealed: &SealedSession) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, sealed.as_str().to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Removal cookie for the session, carrying the same attributes.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .build()
}

/// Sealed session from the request cookies. Empty values count as absent.
pub fn session_from_jar(jar: &CookieJar) -> Option<SealedSession> {
    jar.get(SESSION_COOKIE_NAME)
        .and_then(|c| SealedSession::from_cookie_value(c.value()))
}

/// Add the session cookie to `jar`.
pub fn set_session(jar: CookieJar, sealed: &SealedSession) -> CookieJar {
    tracing::debug!(cookie = SESSION_COOKIE_NAME, "setting session cookie");
    jar.add(session_cookie(sealed))
}

/// Replace the session cookie in `jar` with a removal cookie.
pub fn delete_session(jar: CookieJar) -> CookieJar {
    tracing::debug!(cookie = SESSION_COOKIE_NAME, "deleting session cookie");
    jar.add(clear_session_cookie())
}
