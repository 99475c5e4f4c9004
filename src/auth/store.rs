//! Credential Store
//! Mission: Persist principal records with per-namespace email uniqueness

use crate::auth::models::{NewPrincipal, PrincipalKind, PrincipalProfile, PrincipalRecord};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::info;
use uuid::Uuid;

/// Credential storage with SQLite backend.
///
/// Each principal kind gets its own table with a UNIQUE email column, so
/// duplicate registration is rejected atomically at insert time rather
/// than by a racy lookup-then-insert.
pub struct CredentialStore {
    db_path: String,
}

/// Failures surfaced by `create`.
#[derive(Debug)]
pub enum StoreError {
    DuplicateEmail,
    Database(anyhow::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::DuplicateEmail => write!(f, "Email already registered"),
            StoreError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                StoreError::DuplicateEmail
            }
            _ => StoreError::Database(e.into()),
        }
    }
}

impl CredentialStore {
    /// Create a new credential store and initialize the schema.
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    /// Open a connection. The busy timeout lets concurrent registrations
    /// queue on SQLite's write lock instead of failing outright.
    fn connection(&self) -> Result<Connection, rusqlite::Error> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(conn)
    }

    /// Initialize both namespace tables.
    fn init_db(&self) -> Result<()> {
        let conn = self.connection()?;

        for kind in [PrincipalKind::User, PrincipalKind::FoodPartner] {
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {} (
                        id TEXT PRIMARY KEY,
                        email TEXT UNIQUE NOT NULL,
                        display_name TEXT NOT NULL,
                        password_hash TEXT NOT NULL,
                        created_at TEXT NOT NULL,
                        updated_at TEXT NOT NULL
                    )",
                    kind.table()
                ),
                [],
            )
            .with_context(|| format!("Failed to create {} table", kind.table()))?;
        }

        Ok(())
    }

    /// Create a new principal in the given namespace.
    ///
    /// Emails are lowercased before storage; a UNIQUE violation on the
    /// email column maps to `StoreError::DuplicateEmail`.
    pub fn create(
        &self,
        kind: PrincipalKind,
        new: NewPrincipal,
    ) -> Result<PrincipalRecord, StoreError> {
        let record = PrincipalRecord {
            id: Uuid::new_v4(),
            email: normalize_email(&new.email),
            display_name: new.display_name,
            password_hash: new.password_hash,
            created_at: Utc::now().to_rfc3339(),
            updated_at: Utc::now().to_rfc3339(),
        };

        let conn = self.connection()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (id, email, display_name, password_hash, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                kind.table()
            ),
            params![
                record.id.to_string(),
                record.email,
                record.display_name,
                record.password_hash,
                record.created_at,
                record.updated_at,
            ],
        )?;

        info!("✅ Created {}: {}", kind.label(), record.email);

        Ok(record)
    }

    /// Look up a principal by email, hash included (login path).
    pub fn find_by_email(
        &self,
        kind: PrincipalKind,
        email: &str,
    ) -> Result<Option<PrincipalRecord>> {
        let conn = self.connection()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT id, email, display_name, password_hash, created_at, updated_at
             FROM {} WHERE email = ?1",
            kind.table()
        ))?;

        let result = stmt.query_row(params![normalize_email(email)], |row| {
            Ok(PrincipalRecord {
                id: parse_row_uuid(row.get::<_, String>(0)?)?,
                email: row.get(1)?,
                display_name: row.get(2)?,
                password_hash: row.get(3)?,
                created_at: row.get(4)?,
                updated_at: row.get(5)?,
            })
        });

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Look up a principal by id, excluding the password hash (guard path).
    pub fn find_by_id(&self, kind: PrincipalKind, id: &Uuid) -> Result<Option<PrincipalProfile>> {
        let conn = self.connection()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT id, email, display_name, created_at, updated_at
             FROM {} WHERE id = ?1",
            kind.table()
        ))?;

        let result = stmt.query_row(params![id.to_string()], |row| {
            Ok(PrincipalProfile {
                id: parse_row_uuid(row.get::<_, String>(0)?)?,
                email: row.get(1)?,
                display_name: row.get(2)?,
                created_at: row.get(3)?,
                updated_at: row.get(4)?,
            })
        });

        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Lowercase + trim, applied on every write and lookup.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn parse_row_uuid(raw: String) -> Result<Uuid, rusqlite::Error> {
    Uuid::parse_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}
