//! Application Router
//! Mission: Wire the auth flows, guards, and food endpoints into one app

use crate::auth::{
    api as auth_api,
    middleware::{require_food_partner, require_user},
    AuthState,
};
use crate::food::{api as food_api, FoodState};
use crate::middleware::logging::request_logging;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

/// Build the full application router.
///
/// Auth routes are public; the food routes sit behind the guard matching
/// their principal kind (partners publish, consumers browse).
pub fn build_router(auth_state: AuthState, food_state: FoodState) -> Router {
    let auth_routes = Router::new()
        .route("/api/auth/user/register", post(auth_api::register_user))
        .route("/api/auth/user/login", post(auth_api::login_user))
        .route("/api/auth/user/logout", get(auth_api::logout))
        .route(
            "/api/auth/foodpartner/register",
            post(auth_api::register_food_partner),
        )
        .route(
            "/api/auth/foodpartner/login",
            post(auth_api::login_food_partner),
        )
        .route("/api/auth/foodpartner/logout", get(auth_api::logout))
        .with_state(auth_state.clone());

    let create_food = post(food_api::create_food).route_layer(middleware::from_fn_with_state(
        auth_state.clone(),
        require_food_partner,
    ));
    let list_food = get(food_api::list_food)
        .route_layer(middleware::from_fn_with_state(auth_state, require_user));

    let food_routes = Router::new()
        .route("/api/food", create_food.merge(list_food))
        .with_state(food_state);

    Router::new()
        .merge(auth_routes)
        .merge(food_routes)
        .route("/health", get(health_check))
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

async fn health_check() -> &'static str {
    "🍽️ Platefeed API Operational"
}
