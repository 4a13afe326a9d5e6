//! Session cookie handling.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::application::sessions::SessionId;

pub const SESSION_COOKIE: &str = "md2slides_session";

/// The session named by the request's cookie, if it carries a valid one.
pub fn current_session(jar: &CookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| SessionId::parse(cookie.value()))
}

/// Reuse the request's session or start a new one, returning the jar to send back.
pub fn ensure_session(jar: CookieJar, secure: bool) -> (SessionId, CookieJar) {
    if let Some(session) = current_session(&jar) {
        return (session, jar);
    }

    let session = SessionId::generate();
    let cookie = Cookie::build((SESSION_COOKIE, session.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure);
    (session, jar.add(cookie))
}
