//! Platefeed - Food Reels Platform API
//! Mission: Serve consumer and food partner accounts behind cookie sessions

use anyhow::{Context, Result};
use dotenv::dotenv;
use platefeed_backend::{
    app::build_router,
    auth::{AuthState, CredentialStore, JwtHandler},
    food::{FoodState, FoodStore},
};
use std::{env, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    info!("🍽️ Platefeed API starting");

    // The signing secret is configuration, never source; refuse to boot
    // without it.
    let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
    let db_path = env::var("AUTH_DB_PATH").unwrap_or_else(|_| "platefeed.db".to_string());
    let production = env::var("APP_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);
    let port = env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .context("Invalid PORT")?;

    let store = Arc::new(CredentialStore::new(&db_path)?);
    let food_store = Arc::new(FoodStore::new(&db_path)?);
    let jwt = Arc::new(JwtHandler::new(jwt_secret));

    let auth_state = AuthState::new(store, jwt, production);
    let food_state = FoodState::new(food_store, production);

    info!("🔐 Stores initialized at: {}", db_path);

    let app = build_router(auth_state, food_state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing with env-filter control.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "platefeed=debug,platefeed_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
