//! Tauri Commands for Entity CRUD
//!
//! Exposes the generic entity store to the frontend via Tauri IPC.

use milestone_sync::EntityRecord;
use serde_json::{Map, Value};
use tauri::State;

use crate::domain::{DomainError, EntityType, ListQuery};
use crate::repository::EntityRepository;
use crate::AppState;

fn parse_type(entity_type: &str) -> Result<EntityType, String> {
    EntityType::parse(entity_type).map_err(|e| e.to_string())
}

/// Get entity by ID
#[tauri::command]
pub async fn entity_get(
    state: State<'_, AppState>,
    entity_type: String,
    id: String,
) -> Result<EntityRecord, String> {
    let entity_type = parse_type(&entity_type)?;
    state
        .entity_repo
        .get(&entity_type, &id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| DomainError::NotFound(format!("{} {}", entity_type, id)).to_string())
}

/// List entities of a type, optionally sorted (`-field` = descending)
#[tauri::command]
pub async fn entity_list(
    state: State<'_, AppState>,
    entity_type: String,
    sort: Option<String>,
    limit: Option<u32>,
) -> Result<Vec<EntityRecord>, String> {
    let entity_type = parse_type(&entity_type)?;
    let query = ListQuery::new(sort.as_deref(), limit).map_err(|e| e.to_string())?;
    state.entity_repo.list(&entity_type, &query).await.map_err(|e| e.to_string())
}

/// Entities whose fields equal every entry of `query`
#[tauri::command]
pub async fn entity_filter(
    state: State<'_, AppState>,
    entity_type: String,
    query: Map<String, Value>,
    sort: Option<String>,
    limit: Option<u32>,
) -> Result<Vec<EntityRecord>, String> {
    let entity_type = parse_type(&entity_type)?;
    let list_query = ListQuery::new(sort.as_deref(), limit).map_err(|e| e.to_string())?;
    state
        .entity_repo
        .filter(&entity_type, &query, &list_query)
        .await
        .map_err(|e| e.to_string())
}

/// Create a new entity
#[tauri::command]
pub async fn entity_create(
    state: State<'_, AppState>,
    entity_type: String,
    data: Map<String, Value>,
) -> Result<EntityRecord, String> {
    let entity_type = parse_type(&entity_type)?;
    state.entity_repo.create(&entity_type, data).await.map_err(|e| e.to_string())
}

/// Merge `data` into an existing entity
#[tauri::command]
pub async fn entity_update(
    state: State<'_, AppState>,
    entity_type: String,
    id: String,
    data: Map<String, Value>,
) -> Result<EntityRecord, String> {
    let entity_type = parse_type(&entity_type)?;
    state
        .entity_repo
        .update(&entity_type, &id, data)
        .await
        .map_err(|e| e.to_string())
}

/// Delete entity
#[tauri::command]
pub async fn entity_delete(
    state: State<'_, AppState>,
    entity_type: String,
    id: String,
) -> Result<(), String> {
    let entity_type = parse_type(&entity_type)?;
    state.entity_repo.delete(&entity_type, &id).await.map_err(|e| e.to_string())
}
