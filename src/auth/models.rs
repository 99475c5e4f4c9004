//! Authentication Models
//! Mission: Define the principal records and auth request/response shapes

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two independent account namespaces.
///
/// A consumer and a food partner may register with the same email; each
/// kind has its own table and its own uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    User,
    FoodPartner,
}

impl PrincipalKind {
    /// Table backing this namespace.
    pub fn table(&self) -> &'static str {
        match self {
            PrincipalKind::User => "users",
            PrincipalKind::FoodPartner => "food_partners",
        }
    }

    /// Human-readable label used in response messages.
    pub fn label(&self) -> &'static str {
        match self {
            PrincipalKind::User => "User",
            PrincipalKind::FoodPartner => "Food partner",
        }
    }
}

/// A stored account record, password hash included.
///
/// Only the login path sees this in full; the hash is skipped during
/// serialization so it can never leak through a response body.
#[derive(Debug, Clone, Serialize)]
pub struct PrincipalRecord {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub created_at: String,
    pub updated_at: String,
}

/// Hash-free projection returned by id lookups.
///
/// The guard path resolves principals through this type, so downstream
/// handlers cannot observe the credential even by accident.
#[derive(Debug, Clone, Serialize)]
pub struct PrincipalProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Input to `CredentialStore::create`.
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
}

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (principal id)
    pub iat: usize,  // issued-at timestamp
    pub exp: usize,  // expiration timestamp
}

/// Register request for consumers - POST /api/auth/user/register
///
/// Fields default to empty so a missing field surfaces as a validation
/// failure rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Register request for food partners - POST /api/auth/foodpartner/register
#[derive(Debug, Deserialize)]
pub struct RegisterFoodPartnerRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login request body, shared by both namespaces
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public consumer fields (sanitized)
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub fullname: String,
    pub email: String,
}

impl PublicUser {
    pub fn from_record(record: &PrincipalRecord) -> Self {
        Self {
            id: record.id.to_string(),
            fullname: record.display_name.clone(),
            email: record.email.clone(),
        }
    }
}

/// Public food partner fields (sanitized)
#[derive(Debug, Serialize)]
pub struct PublicFoodPartner {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl PublicFoodPartner {
    pub fn from_record(record: &PrincipalRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.display_name.clone(),
            email: record.email.clone(),
        }
    }
}

/// Registration response envelope
#[derive(Debug, Serialize)]
pub struct RegisterResponse<P: Serialize> {
    pub success: bool,
    pub message: String,
    pub user: P,
}

/// Login response envelope; carries the raw token alongside the cookie
/// for clients that keep it themselves.
#[derive(Debug, Serialize)]
pub struct LoginResponse<P: Serialize> {
    pub success: bool,
    pub message: String,
    pub user: P,
    pub token: String,
}

/// Plain success/message envelope (logout)
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}
