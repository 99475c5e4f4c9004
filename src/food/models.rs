//! Food Item Models
//! Mission: Define the food listing record and its API shapes

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A published food listing. `video` is the URL of an already-hosted
/// clip; media storage lives outside this service.
#[derive(Debug, Clone, Serialize)]
pub struct FoodItem {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub video: String,
    #[serde(rename = "foodPartner")]
    pub food_partner: Uuid,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Input to `FoodStore::create`. The partner id comes from the resolved
/// principal, never from the request body.
#[derive(Debug, Clone)]
pub struct NewFoodItem {
    pub name: String,
    pub description: String,
    pub video: String,
    pub food_partner: Uuid,
}

/// Create request - POST /api/food
#[derive(Debug, Deserialize)]
pub struct CreateFoodRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub video: String,
}

/// Create response envelope
#[derive(Debug, Serialize)]
pub struct CreateFoodResponse {
    pub success: bool,
    pub message: String,
    pub data: FoodItem,
}

/// List response envelope
#[derive(Debug, Serialize)]
pub struct ListFoodResponse {
    pub success: bool,
    pub message: String,
    pub total: usize,
    #[serde(rename = "foodItems")]
    pub food_items: Vec<FoodItem>,
}
