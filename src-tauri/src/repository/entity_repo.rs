//! Entity Repository
//!
//! SQLite-backed generic entity storage. Each row holds one entity's fields
//! as a JSON object; id and timestamps live in their own columns and are
//! merged into the record on the way out.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use milestone_sync::store::matches_predicate;
use milestone_sync::EntityRecord;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::{Map, Value};

use super::db::SharedConnection;
use super::traits::EntityRepository;
use crate::domain::{DomainError, DomainResult, EntityType, ListQuery, COLUMN_FIELDS};

/// SQLite implementation of the entity repository
#[derive(Clone)]
pub struct SqliteEntityRepository {
    conn: SharedConnection,
}

fn not_initialized() -> DomainError {
    DomainError::Internal("Database not initialized".to_string())
}

fn now_stamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Drop keys the store owns from caller-supplied fields
fn strip_reserved(mut fields: Map<String, Value>) -> Map<String, Value> {
    for key in COLUMN_FIELDS {
        fields.remove(key);
    }
    fields
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<(String, String, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn into_record(id: String, data: String, created: String, updated: String) -> DomainResult<EntityRecord> {
    let mut fields = match serde_json::from_str::<Value>(&data)? {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    fields.insert("created_date".to_string(), Value::String(created));
    fields.insert("updated_date".to_string(), Value::String(updated));
    Ok(EntityRecord::new(id, fields))
}

fn fetch_one(conn: &Connection, entity_type: &EntityType, id: &str) -> DomainResult<Option<EntityRecord>> {
    let row = conn
        .query_row(
            "SELECT id, data, created_date, updated_date FROM entities WHERE entity_type = ?1 AND id = ?2",
            params![entity_type.as_str(), id],
            row_to_record,
        )
        .optional()?;
    row.map(|(id, data, created, updated)| into_record(id, data, created, updated))
        .transpose()
}

fn fetch_all(conn: &Connection, entity_type: &EntityType, query: &ListQuery) -> DomainResult<Vec<EntityRecord>> {
    let sql = format!(
        "SELECT id, data, created_date, updated_date FROM entities WHERE entity_type = ?1 ORDER BY {}",
        query.order_by()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![entity_type.as_str()], row_to_record)?;

    let mut records = Vec::new();
    for row in rows {
        let (id, data, created, updated) = row?;
        records.push(into_record(id, data, created, updated)?);
    }
    Ok(records)
}

fn apply_limit(mut records: Vec<EntityRecord>, limit: Option<u32>) -> Vec<EntityRecord> {
    if let Some(limit) = limit {
        records.truncate(limit as usize);
    }
    records
}

impl SqliteEntityRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl EntityRepository for SqliteEntityRepository {
    async fn get(&self, entity_type: &EntityType, id: &str) -> DomainResult<Option<EntityRecord>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        fetch_one(conn, entity_type, id)
    }

    async fn list(&self, entity_type: &EntityType, query: &ListQuery) -> DomainResult<Vec<EntityRecord>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        Ok(apply_limit(fetch_all(conn, entity_type, query)?, query.limit))
    }

    async fn filter(
        &self,
        entity_type: &EntityType,
        predicate: &Map<String, Value>,
        query: &ListQuery,
    ) -> DomainResult<Vec<EntityRecord>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        let matching = fetch_all(conn, entity_type, query)?
            .into_iter()
            .filter(|record| matches_predicate(record, predicate))
            .collect();
        Ok(apply_limit(matching, query.limit))
    }

    async fn create(&self, entity_type: &EntityType, fields: Map<String, Value>) -> DomainResult<EntityRecord> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let id = uuid::Uuid::new_v4().simple().to_string();
        let data = serde_json::to_string(&Value::Object(strip_reserved(fields)))?;
        let now = now_stamp();
        conn.execute(
            "INSERT INTO entities (entity_type, id, data, created_date, updated_date) VALUES (?1, ?2, ?3, ?4, ?4)",
            params![entity_type.as_str(), id, data, now],
        )?;
        log::debug!("created {} {}", entity_type, id);

        fetch_one(conn, entity_type, &id)?
            .ok_or_else(|| DomainError::Internal(format!("{} {} vanished after insert", entity_type, id)))
    }

    async fn update(
        &self,
        entity_type: &EntityType,
        id: &str,
        patch: Map<String, Value>,
    ) -> DomainResult<EntityRecord> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let existing: Option<String> = conn
            .query_row(
                "SELECT data FROM entities WHERE entity_type = ?1 AND id = ?2",
                params![entity_type.as_str(), id],
                |row| row.get(0),
            )
            .optional()?;
        let existing = existing.ok_or_else(|| DomainError::NotFound(format!("{} {}", entity_type, id)))?;

        let mut fields = match serde_json::from_str::<Value>(&existing)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        for (key, value) in strip_reserved(patch) {
            if value.is_null() {
                fields.remove(&key);
            } else {
                fields.insert(key, value);
            }
        }

        let data = serde_json::to_string(&Value::Object(fields))?;
        conn.execute(
            "UPDATE entities SET data = ?1, updated_date = ?2 WHERE entity_type = ?3 AND id = ?4",
            params![data, now_stamp(), entity_type.as_str(), id],
        )?;
        log::debug!("updated {} {}", entity_type, id);

        fetch_one(conn, entity_type, id)?
            .ok_or_else(|| DomainError::NotFound(format!("{} {}", entity_type, id)))
    }

    async fn delete(&self, entity_type: &EntityType, id: &str) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        let removed = conn.execute(
            "DELETE FROM entities WHERE entity_type = ?1 AND id = ?2",
            params![entity_type.as_str(), id],
        )?;
        if removed == 0 {
            return Err(DomainError::NotFound(format!("{} {}", entity_type, id)));
        }
        log::debug!("deleted {} {}", entity_type, id);
        Ok(())
    }
}
