//! Food API Endpoints
//! Mission: Let authenticated partners publish listings and consumers browse them

use crate::auth::middleware::{AuthedFoodPartner, AuthedUser};
use crate::food::{
    models::{CreateFoodRequest, CreateFoodResponse, FoodItem, ListFoodResponse, NewFoodItem},
    store::{FoodStore, FoodStoreError},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared food API state.
#[derive(Clone)]
pub struct FoodState {
    pub store: Arc<FoodStore>,
    pub production: bool,
}

impl FoodState {
    pub fn new(store: Arc<FoodStore>, production: bool) -> Self {
        Self { store, production }
    }

    fn internal(&self, message: &'static str, err: impl std::fmt::Display) -> FoodApiError {
        error!("{}: {}", message, err);
        FoodApiError::Internal {
            message,
            detail: (!self.production).then(|| err.to_string()),
        }
    }
}

/// Food endpoint failures, rendered as the standard envelope.
#[derive(Debug)]
pub enum FoodApiError {
    Validation(&'static str),
    Duplicate,
    NoItems,
    Internal {
        message: &'static str,
        detail: Option<String>,
    },
}

impl IntoResponse for FoodApiError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match self {
            FoodApiError::Validation(message) => (StatusCode::BAD_REQUEST, message, None),
            // Listings use 409 for duplicates, unlike the credential
            // endpoints, which report 400.
            FoodApiError::Duplicate => (StatusCode::CONFLICT, "Food item already exists", None),
            FoodApiError::NoItems => (StatusCode::NOT_FOUND, "No food items found.", None),
            FoodApiError::Internal { message, detail } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, detail)
            }
        };

        let mut body = json!({ "success": false, "message": message });
        if let Some(detail) = detail {
            body["error"] = json!(detail);
        }

        (status, Json(body)).into_response()
    }
}

/// Create food item - POST /api/food (food partner only)
pub async fn create_food(
    State(state): State<FoodState>,
    AuthedFoodPartner(partner): AuthedFoodPartner,
    Json(payload): Json<CreateFoodRequest>,
) -> Result<(StatusCode, Json<CreateFoodResponse>), FoodApiError> {
    let name = payload.name.trim();
    let description = payload.description.trim();
    if name.is_empty() || description.is_empty() {
        return Err(FoodApiError::Validation("Name and description are required"));
    }
    if payload.video.trim().is_empty() {
        return Err(FoodApiError::Validation("Video is required"));
    }

    let item = state
        .store
        .create(NewFoodItem {
            name: name.to_string(),
            description: description.to_string(),
            video: payload.video.trim().to_string(),
            food_partner: partner.id,
        })
        .map_err(|e| match e {
            FoodStoreError::Duplicate => {
                warn!("❌ Duplicate food item from {}: {}", partner.id, name);
                FoodApiError::Duplicate
            }
            FoodStoreError::Database(err) => state.internal("Failed to create food item", err),
        })?;

    info!("✅ {} published {}", partner.display_name, item.name);

    Ok((
        StatusCode::CREATED,
        Json(CreateFoodResponse {
            success: true,
            message: "Food item created successfully".to_string(),
            data: item,
        }),
    ))
}

/// List food items - GET /api/food (consumer only), newest first.
pub async fn list_food(
    State(state): State<FoodState>,
    AuthedUser(_user): AuthedUser,
) -> Result<Json<ListFoodResponse>, FoodApiError> {
    let items: Vec<FoodItem> = state
        .store
        .list()
        .map_err(|e| state.internal("Server error while fetching food items.", e))?;

    if items.is_empty() {
        return Err(FoodApiError::NoItems);
    }

    Ok(Json(ListFoodResponse {
        success: true,
        message: "Food items fetched successfully.".to_string(),
        total: items.len(),
        food_items: items,
    }))
}
