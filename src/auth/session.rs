//! Session Transport
//! Mission: Carry the session token in a locked-down cookie

use crate::auth::jwt::TOKEN_TTL_DAYS;
use axum_extra::extract::cookie::{Cookie, SameSite};

/// Cookie that carries the session token.
pub const SESSION_COOKIE: &str = "token";

/// Build the session cookie for a freshly issued token.
///
/// The cookie lifetime matches the token TTL so both expire together.
/// `Secure` is set only in production, where TLS is guaranteed.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::days(TOKEN_TTL_DAYS))
        .build()
}

/// Build the matching-attribute cookie used to clear a session.
///
/// Attributes must match the ones the session was set with, or browsers
/// will treat it as a different cookie and leave the original in place.
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .build()
}
