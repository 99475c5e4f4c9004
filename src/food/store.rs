//! Food Store
//! Mission: Persist food listings with per-partner name uniqueness

use crate::food::models::{FoodItem, NewFoodItem};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::info;
use uuid::Uuid;

/// Food listing storage with SQLite backend.
pub struct FoodStore {
    db_path: String,
}

/// Failures surfaced by `create`.
#[derive(Debug)]
pub enum FoodStoreError {
    Duplicate,
    Database(anyhow::Error),
}

impl std::fmt::Display for FoodStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FoodStoreError::Duplicate => write!(f, "Food item already exists"),
            FoodStoreError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for FoodStoreError {}

impl From<rusqlite::Error> for FoodStoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                FoodStoreError::Duplicate
            }
            _ => FoodStoreError::Database(e.into()),
        }
    }
}

impl FoodStore {
    /// Create a new food store and initialize the schema.
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn connection(&self) -> Result<Connection, rusqlite::Error> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(conn)
    }

    /// Initialize the foods table. A partner cannot list the same dish
    /// name twice; the constraint rejects the duplicate at insert time.
    fn init_db(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS foods (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                video TEXT NOT NULL,
                food_partner_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (food_partner_id, name),
                FOREIGN KEY (food_partner_id) REFERENCES food_partners(id)
            )",
            [],
        )
        .context("Failed to create foods table")?;

        Ok(())
    }

    /// Create a new food listing.
    pub fn create(&self, new: NewFoodItem) -> Result<FoodItem, FoodStoreError> {
        let item = FoodItem {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            video: new.video,
            food_partner: new.food_partner,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO foods (id, name, description, video, food_partner_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                item.id.to_string(),
                item.name,
                item.description,
                item.video,
                item.food_partner.to_string(),
                item.created_at,
            ],
        )?;

        info!("🍽️ Food item created: {} ({})", item.name, item.food_partner);

        Ok(item)
    }

    /// List all food items, newest first.
    pub fn list(&self) -> Result<Vec<FoodItem>> {
        let conn = self.connection()?;

        let mut stmt = conn.prepare(
            "SELECT id, name, description, video, food_partner_id, created_at
             FROM foods ORDER BY created_at DESC, rowid DESC",
        )?;

        let items = stmt
            .query_map([], |row| {
                Ok(FoodItem {
                    id: parse_row_uuid(row.get::<_, String>(0)?)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    video: row.get(3)?,
                    food_partner: parse_row_uuid(row.get::<_, String>(4)?)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }
}

fn parse_row_uuid(raw: String) -> Result<Uuid, rusqlite::Error> {
    Uuid::parse_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}
