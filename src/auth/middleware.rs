//! Authentication Guards
//! Mission: Admit only requests carrying a valid session for the right principal kind

use crate::auth::{
    api::AuthState,
    jwt::TokenError,
    models::{PrincipalKind, PrincipalProfile},
    session::SESSION_COOKIE,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

/// Resolved consumer attached to the request by `require_user`.
#[derive(Debug, Clone)]
pub struct AuthedUser(pub PrincipalProfile);

/// Resolved food partner attached to the request by `require_food_partner`.
#[derive(Debug, Clone)]
pub struct AuthedFoodPartner(pub PrincipalProfile);

/// Guard failures. Each request is independently classified; the guard
/// holds no state across requests.
#[derive(Debug)]
pub enum AuthError {
    NoToken,
    InvalidToken,
    SessionExpired,
    PrincipalGone(PrincipalKind),
    MissingPrincipal(PrincipalKind),
    Internal,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::NoToken => (
                StatusCode::UNAUTHORIZED,
                "No token provided. Authorization denied.".to_string(),
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Invalid token. Access denied.".to_string(),
            ),
            AuthError::SessionExpired => (
                StatusCode::UNAUTHORIZED,
                "Session expired. Please log in again.".to_string(),
            ),
            AuthError::PrincipalGone(kind) => (
                StatusCode::NOT_FOUND,
                format!("{} not found.", kind.label()),
            ),
            AuthError::MissingPrincipal(kind) => (
                StatusCode::UNAUTHORIZED,
                format!("Unauthorized: {} authentication required.", kind.label()),
            ),
            AuthError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error. Please try again later.".to_string(),
            ),
        };

        (
            status,
            Json(json!({ "success": false, "message": message })),
        )
            .into_response()
    }
}

/// Guard middleware for consumer routes.
pub async fn require_user(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let profile = authenticate(&state, &jar, PrincipalKind::User)?;
    request.extensions_mut().insert(AuthedUser(profile));
    Ok(next.run(request).await)
}

/// Guard middleware for food partner routes.
pub async fn require_food_partner(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let profile = authenticate(&state, &jar, PrincipalKind::FoodPartner)?;
    request.extensions_mut().insert(AuthedFoodPartner(profile));
    Ok(next.run(request).await)
}

/// The guard pipeline both middlewares share: read the cookie, verify
/// the token, resolve the principal. Each step short-circuits with its
/// own failure; a valid token for a since-deleted principal is reported
/// separately from a bad token.
fn authenticate(
    state: &AuthState,
    jar: &CookieJar,
    kind: PrincipalKind,
) -> Result<PrincipalProfile, AuthError> {
    let token = jar.get(SESSION_COOKIE).ok_or(AuthError::NoToken)?.value();

    let claims = state.jwt.verify(token).map_err(|e| {
        warn!("❌ Token rejected: {}", e);
        match e {
            TokenError::Expired => AuthError::SessionExpired,
            TokenError::Malformed => AuthError::InvalidToken,
        }
    })?;

    let id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

    let profile = state
        .store
        .find_by_id(kind, &id)
        .map_err(|e| {
            warn!("Principal lookup failed: {:?}", e);
            AuthError::Internal
        })?
        .ok_or(AuthError::PrincipalGone(kind))?;

    Ok(profile)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthedUser>()
            .cloned()
            .ok_or(AuthError::MissingPrincipal(PrincipalKind::User))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthedFoodPartner
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthedFoodPartner>()
            .cloned()
            .ok_or(AuthError::MissingPrincipal(PrincipalKind::FoodPartner))
    }
}
