//! libSQL backend — async `PreferenceStore` implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::onboarding::model::{PreferenceFields, StoredPreferenceRecord, Theme, Units};
use crate::store::migrations;
use crate::store::traits::PreferenceStore;

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        migrations::run_migrations(backend.conn()).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        migrations::run_migrations(backend.conn()).await?;
        Ok(backend)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Number of records stored for `user_id`. Never more than one while the
    /// unique index is in place.
    pub async fn count_for_user(&self, user_id: &str) -> Result<i64, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT COUNT(*) FROM onboarding_preferences WHERE user_id = ?1",
                params![user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("count_for_user: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(row.get::<i64>(0).unwrap_or(0)),
            Ok(None) => Ok(0),
            Err(e) => Err(DatabaseError::Query(format!("count_for_user: {e}"))),
        }
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

/// Encode a tag list as a JSON array column.
fn tags_to_value(tags: Option<&Vec<String>>) -> Result<libsql::Value, DatabaseError> {
    match tags {
        Some(tags) => serde_json::to_string(tags)
            .map(libsql::Value::Text)
            .map_err(|e| DatabaseError::Serialization(e.to_string())),
        None => Ok(libsql::Value::Null),
    }
}

fn parse_tags(column: &str, raw: Option<String>) -> Result<Option<Vec<String>>, DatabaseError> {
    raw.map(|s| {
        serde_json::from_str(&s)
            .map_err(|e| DatabaseError::Serialization(format!("{column}: {e}")))
    })
    .transpose()
}

fn parse_enum<T: std::str::FromStr<Err = String>>(
    raw: Option<String>,
) -> Result<Option<T>, DatabaseError> {
    raw.map(|s| s.parse::<T>().map_err(DatabaseError::Serialization))
        .transpose()
}

/// Column values for the five mapped fields, in table column order.
fn field_values(fields: &PreferenceFields) -> Result<[libsql::Value; 5], DatabaseError> {
    Ok([
        opt_text(fields.display_name.as_deref()),
        opt_text(fields.units.map(Units::as_str)),
        opt_text(fields.theme.map(Theme::as_str)),
        tags_to_value(fields.content_types.as_ref())?,
        tags_to_value(fields.ai_features.as_ref())?,
    ])
}

/// Read a nullable TEXT column. NULL is `None`; any other non-text value is an error.
fn nullable_text(
    row: &libsql::Row,
    idx: i32,
    column: &str,
) -> Result<Option<String>, DatabaseError> {
    match row.get_value(idx) {
        Ok(libsql::Value::Null) => Ok(None),
        Ok(libsql::Value::Text(s)) => Ok(Some(s)),
        Ok(other) => Err(DatabaseError::Query(format!(
            "row decode: {column} is not text: {other:?}"
        ))),
        Err(e) => Err(DatabaseError::Query(format!("row decode: {column}: {e}"))),
    }
}

/// Map a libsql Row to a StoredPreferenceRecord.
///
/// Column order matches RECORD_COLUMNS:
/// 0:id, 1:user_id, 2:display_name, 3:units, 4:theme, 5:content_types,
/// 6:ai_features, 7:created_at, 8:updated_at
fn row_to_record(row: &libsql::Row) -> Result<StoredPreferenceRecord, DatabaseError> {
    let get_err = |e: libsql::Error| DatabaseError::Query(format!("row decode: {e}"));

    let id: String = row.get(0).map_err(get_err)?;
    let user_id: String = row.get(1).map_err(get_err)?;
    let created_str: String = row.get(7).map_err(get_err)?;
    let updated_str: String = row.get(8).map_err(get_err)?;

    let fields = PreferenceFields {
        display_name: nullable_text(row, 2, "display_name")?,
        units: parse_enum(nullable_text(row, 3, "units")?)?,
        theme: parse_enum(nullable_text(row, 4, "theme")?)?,
        content_types: parse_tags("content_types", nullable_text(row, 5, "content_types")?)?,
        ai_features: parse_tags("ai_features", nullable_text(row, 6, "ai_features")?)?,
    };

    Ok(StoredPreferenceRecord {
        id,
        user_id,
        fields,
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

fn is_unique_violation(e: &libsql::Error) -> bool {
    e.to_string().contains("UNIQUE constraint failed")
}

// ── Trait implementation ────────────────────────────────────────────

const RECORD_COLUMNS: &str = "id, user_id, display_name, units, theme, content_types, ai_features, created_at, updated_at";

#[async_trait]
impl PreferenceStore for LibSqlBackend {
    async fn find_by_user(
        &self,
        user_id: &str,
    ) -> Result<Option<StoredPreferenceRecord>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {RECORD_COLUMNS} FROM onboarding_preferences WHERE user_id = ?1 LIMIT 1"
                ),
                params![user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("find_by_user: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row_to_record(&row).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("find_by_user: {e}"))),
        }
    }

    async fn update(&self, id: &str, fields: &PreferenceFields) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let [display_name, units, theme, content_types, ai_features] = field_values(fields)?;

        let count = self
            .conn()
            .execute(
                "UPDATE onboarding_preferences
                 SET display_name = ?2, units = ?3, theme = ?4, content_types = ?5,
                     ai_features = ?6, updated_at = ?7
                 WHERE id = ?1",
                params![id, display_name, units, theme, content_types, ai_features, now],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("update: {e}")))?;

        if count == 0 {
            return Err(DatabaseError::Query(format!("update: no record with id {id}")));
        }
        debug!(id, "Preference record updated");
        Ok(())
    }

    async fn create(
        &self,
        user_id: &str,
        fields: &PreferenceFields,
    ) -> Result<String, DatabaseError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let [display_name, units, theme, content_types, ai_features] = field_values(fields)?;

        self.conn()
            .execute(
                "INSERT INTO onboarding_preferences
                 (id, user_id, display_name, units, theme, content_types, ai_features, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                params![
                    id.clone(),
                    user_id,
                    display_name,
                    units,
                    theme,
                    content_types,
                    ai_features,
                    now
                ],
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DatabaseError::Constraint(format!("create: user {user_id} already has preferences"))
                } else {
                    DatabaseError::Query(format!("create: {e}"))
                }
            })?;

        debug!(id = %id, user_id, "Preference record created");
        Ok(id)
    }

    /// Single-statement upsert on the unique `user_id` index.
    async fn upsert(&self, user_id: &str, fields: &PreferenceFields) -> Result<(), DatabaseError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let [display_name, units, theme, content_types, ai_features] = field_values(fields)?;

        self.conn()
            .execute(
                "INSERT INTO onboarding_preferences
                 (id, user_id, display_name, units, theme, content_types, ai_features, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
                 ON CONFLICT (user_id) DO UPDATE SET
                     display_name = excluded.display_name,
                     units = excluded.units,
                     theme = excluded.theme,
                     content_types = excluded.content_types,
                     ai_features = excluded.ai_features,
                     updated_at = excluded.updated_at",
                params![
                    id,
                    user_id,
                    display_name,
                    units,
                    theme,
                    content_types,
                    ai_features,
                    now
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("upsert: {e}")))?;

        debug!(user_id, "Preference record upserted");
        Ok(())
    }
}
