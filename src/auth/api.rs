//! Authentication Flows
//! Mission: Drive registration, login, and logout for both principal kinds

use crate::auth::{
    jwt::JwtHandler,
    models::{
        LoginRequest, LoginResponse, MessageResponse, NewPrincipal, PrincipalKind,
        PrincipalRecord, PublicFoodPartner, PublicUser, RegisterFoodPartnerRequest,
        RegisterResponse, RegisterUserRequest,
    },
    password,
    session::{clear_session_cookie, session_cookie},
    store::{CredentialStore, StoreError},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared auth state: the store, the token handler, and the environment
/// flag. All immutable after startup.
#[derive(Clone)]
pub struct AuthState {
    pub store: Arc<CredentialStore>,
    pub jwt: Arc<JwtHandler>,
    pub production: bool,
}

impl AuthState {
    pub fn new(store: Arc<CredentialStore>, jwt: Arc<JwtHandler>, production: bool) -> Self {
        Self {
            store,
            jwt,
            production,
        }
    }

    /// Log an unexpected failure and wrap it for the caller. The
    /// diagnostic detail rides along only outside production.
    fn internal(&self, context: &str, err: impl std::fmt::Display) -> ApiError {
        error!("{}: {}", context, err);
        ApiError::Internal((!self.production).then(|| err.to_string()))
    }
}

/// Flow-level failures, rendered as the standard response envelope.
#[derive(Debug)]
pub enum ApiError {
    Validation,
    Duplicate(PrincipalKind),
    InvalidCredential,
    Internal(Option<String>),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match self {
            ApiError::Validation => (
                StatusCode::BAD_REQUEST,
                "All fields are required.".to_string(),
                None,
            ),
            ApiError::Duplicate(kind) => (
                StatusCode::BAD_REQUEST,
                format!("{} already exists!", kind.label()),
                None,
            ),
            ApiError::InvalidCredential => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password.".to_string(),
                None,
            ),
            ApiError::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error. Please try again later.".to_string(),
                detail,
            ),
        };

        let mut body = json!({ "success": false, "message": message });
        if let Some(detail) = detail {
            body["error"] = json!(detail);
        }

        (status, Json(body)).into_response()
    }
}

/// Register a principal: validate, hash, create, issue.
///
/// Uniqueness is left to the store's constraint; there is no lookup
/// beforehand, so two concurrent registrations cannot both slip through.
fn register_principal(
    state: &AuthState,
    kind: PrincipalKind,
    display_name: &str,
    email: &str,
    password: &str,
) -> Result<(PrincipalRecord, String), ApiError> {
    let display_name = display_name.trim();
    if display_name.is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(ApiError::Validation);
    }

    let password_hash = password::hash_password(password)
        .map_err(|e| state.internal("Password hashing failed", e))?;

    let record = state
        .store
        .create(
            kind,
            NewPrincipal {
                email: email.to_string(),
                display_name: display_name.to_string(),
                password_hash,
            },
        )
        .map_err(|e| match e {
            StoreError::DuplicateEmail => {
                warn!("❌ Duplicate registration: {}", email);
                ApiError::Duplicate(kind)
            }
            StoreError::Database(err) => state.internal("Registration failed", err),
        })?;

    let token = state
        .jwt
        .issue(&record.id)
        .map_err(|e| state.internal("Token issuance failed", e))?;

    info!("✅ {} registered: {}", kind.label(), record.email);

    Ok((record, token))
}

/// Log a principal in: look up, verify, issue.
///
/// Unknown email and wrong password fail identically so the response
/// never reveals which one it was.
fn login_principal(
    state: &AuthState,
    kind: PrincipalKind,
    email: &str,
    password: &str,
) -> Result<(PrincipalRecord, String), ApiError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ApiError::Validation);
    }

    let record = state
        .store
        .find_by_email(kind, email)
        .map_err(|e| state.internal("Login lookup failed", e))?
        .ok_or_else(|| {
            warn!("❌ Failed login attempt: {}", email);
            ApiError::InvalidCredential
        })?;

    if !password::verify_password(password, &record.password_hash) {
        warn!("❌ Failed login attempt: {}", email);
        return Err(ApiError::InvalidCredential);
    }

    let token = state
        .jwt
        .issue(&record.id)
        .map_err(|e| state.internal("Token issuance failed", e))?;

    info!("🔓 {} logged in: {}", kind.label(), record.email);

    Ok((record, token))
}

/// Register consumer - POST /api/auth/user/register
pub async fn register_user(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, CookieJar, Json<RegisterResponse<PublicUser>>), ApiError> {
    let (record, token) = register_principal(
        &state,
        PrincipalKind::User,
        &payload.fullname,
        &payload.email,
        &payload.password,
    )?;

    let jar = jar.add(session_cookie(token, state.production));
    Ok((
        StatusCode::CREATED,
        jar,
        Json(RegisterResponse {
            success: true,
            message: "User registered successfully.".to_string(),
            user: PublicUser::from_record(&record),
        }),
    ))
}

/// Login consumer - POST /api/auth/user/login
pub async fn login_user(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse<PublicUser>>), ApiError> {
    let (record, token) =
        login_principal(&state, PrincipalKind::User, &payload.email, &payload.password)?;

    let jar = jar.add(session_cookie(token.clone(), state.production));
    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            message: "Login successful.".to_string(),
            user: PublicUser::from_record(&record),
            token,
        }),
    ))
}

/// Register food partner - POST /api/auth/foodpartner/register
pub async fn register_food_partner(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(payload): Json<RegisterFoodPartnerRequest>,
) -> Result<(StatusCode, CookieJar, Json<RegisterResponse<PublicFoodPartner>>), ApiError> {
    let (record, token) = register_principal(
        &state,
        PrincipalKind::FoodPartner,
        &payload.name,
        &payload.email,
        &payload.password,
    )?;

    let jar = jar.add(session_cookie(token, state.production));
    Ok((
        StatusCode::CREATED,
        jar,
        Json(RegisterResponse {
            success: true,
            message: "Food partner registered successfully.".to_string(),
            user: PublicFoodPartner::from_record(&record),
        }),
    ))
}

/// Login food partner - POST /api/auth/foodpartner/login
pub async fn login_food_partner(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse<PublicFoodPartner>>), ApiError> {
    let (record, token) = login_principal(
        &state,
        PrincipalKind::FoodPartner,
        &payload.email,
        &payload.password,
    )?;

    let jar = jar.add(session_cookie(token.clone(), state.production));
    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            message: "Login successful.".to_string(),
            user: PublicFoodPartner::from_record(&record),
            token,
        }),
    ))
}

/// Logout - GET /api/auth/user/logout and /api/auth/foodpartner/logout
///
/// Clears the session cookie with matching attributes. Idempotent: a
/// request without a cookie gets the same success response.
pub async fn logout(
    State(state): State<AuthState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(clear_session_cookie(state.production));
    (
        jar,
        Json(MessageResponse {
            success: true,
            message: "Logged out successfully.".to_string(),
        }),
    )
}
