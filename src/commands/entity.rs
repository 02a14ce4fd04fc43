//! Entity Commands
//!
//! Frontend bindings for the generic entity store, plus an
//! [`EntityStore`] adapter so the reconciler can persist through IPC.

use async_trait::async_trait;
use milestone_sync::{EntityId, EntityRecord, EntityStore, StoreError};
use serde::Serialize;
use serde_json::{Map, Value};

use super::{call, CommandError};

// ========================
// Argument Structs
// ========================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntityIdArgs<'a> {
    entity_type: &'a str,
    id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListArgs<'a> {
    entity_type: &'a str,
    sort: Option<&'a str>,
    limit: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterArgs<'a> {
    entity_type: &'a str,
    query: &'a Map<String, Value>,
    sort: Option<&'a str>,
    limit: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateArgs<'a> {
    entity_type: &'a str,
    data: &'a Map<String, Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateArgs<'a> {
    entity_type: &'a str,
    id: &'a str,
    data: &'a Map<String, Value>,
}

// ========================
// Commands
// ========================

pub async fn get_entity(entity_type: &str, id: &EntityId) -> Result<EntityRecord, CommandError> {
    call("entity_get", &EntityIdArgs { entity_type, id: id.as_str() }).await
}

pub async fn list_entities(
    entity_type: &str,
    sort: Option<&str>,
    limit: Option<u32>,
) -> Result<Vec<EntityRecord>, CommandError> {
    call("entity_list", &ListArgs { entity_type, sort, limit }).await
}

pub async fn filter_entities(
    entity_type: &str,
    query: &Map<String, Value>,
    sort: Option<&str>,
    limit: Option<u32>,
) -> Result<Vec<EntityRecord>, CommandError> {
    call("entity_filter", &FilterArgs { entity_type, query, sort, limit }).await
}

pub async fn create_entity(
    entity_type: &str,
    data: &Map<String, Value>,
) -> Result<EntityRecord, CommandError> {
    call("entity_create", &CreateArgs { entity_type, data }).await
}

pub async fn update_entity(
    entity_type: &str,
    id: &EntityId,
    data: &Map<String, Value>,
) -> Result<EntityRecord, CommandError> {
    call("entity_update", &UpdateArgs { entity_type, id: id.as_str(), data }).await
}

pub async fn delete_entity(entity_type: &str, id: &EntityId) -> Result<(), CommandError> {
    call("entity_delete", &EntityIdArgs { entity_type, id: id.as_str() }).await
}

// ========================
// EntityStore adapter
// ========================

/// Entity store backed by the Tauri commands above
#[derive(Debug, Clone, Copy, Default)]
pub struct TauriEntityStore;

fn store_error(entity_type: &str, id: Option<&EntityId>, err: CommandError) -> StoreError {
    match err {
        CommandError::Rejected(msg) if msg.starts_with("Not found") => StoreError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.map(|id| id.to_string()).unwrap_or_default(),
        },
        CommandError::Rejected(msg) => StoreError::Rejected(msg),
        CommandError::Ipc(msg) => StoreError::Network(msg),
    }
}

#[async_trait(?Send)]
impl EntityStore for TauriEntityStore {
    async fn get(&self, entity_type: &str, id: &EntityId) -> Result<EntityRecord, StoreError> {
        get_entity(entity_type, id).await.map_err(|e| store_error(entity_type, Some(id), e))
    }

    async fn list(&self, entity_type: &str, sort: Option<&str>) -> Result<Vec<EntityRecord>, StoreError> {
        list_entities(entity_type, sort, None)
            .await
            .map_err(|e| store_error(entity_type, None, e))
    }

    async fn filter(
        &self,
        entity_type: &str,
        predicate: &Map<String, Value>,
        sort: Option<&str>,
    ) -> Result<Vec<EntityRecord>, StoreError> {
        filter_entities(entity_type, predicate, sort, None)
            .await
            .map_err(|e| store_error(entity_type, None, e))
    }

    async fn create(&self, entity_type: &str, fields: Map<String, Value>) -> Result<EntityRecord, StoreError> {
        create_entity(entity_type, &fields)
            .await
            .map_err(|e| store_error(entity_type, None, e))
    }

    async fn update(
        &self,
        entity_type: &str,
        id: &EntityId,
        patch: Map<String, Value>,
    ) -> Result<EntityRecord, StoreError> {
        update_entity(entity_type, id, &patch)
            .await
            .map_err(|e| store_error(entity_type, Some(id), e))
    }

    async fn delete(&self, entity_type: &str, id: &EntityId) -> Result<(), StoreError> {
        delete_entity(entity_type, id).await.map_err(|e| store_error(entity_type, Some(id), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        let id = EntityId::from("g1");
        assert_eq!(
            store_error("Goal", Some(&id), CommandError::Rejected("Not found: Goal g1".into())),
            StoreError::NotFound { entity_type: "Goal".into(), id: "g1".into() }
        );
        assert_eq!(
            store_error("Goal", None, CommandError::Rejected("Internal error: Database not initialized".into())),
            StoreError::Rejected("Internal error: Database not initialized".into())
        );
        assert!(matches!(
            store_error("Goal", None, CommandError::Ipc("TypeError".into())),
            StoreError::Network(_)
        ));
    }
}
