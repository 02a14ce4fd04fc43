//! Repository Layer - Core Traits
//!
//! Defines the abstract interface for entity storage.
//! Implementations can use SQLite, in-memory, etc.

use async_trait::async_trait;
use milestone_sync::EntityRecord;
use serde_json::{Map, Value};

use crate::domain::{DomainResult, EntityType, ListQuery};

/// Generic CRUD over entities addressed by type name and id
///
/// All operations are async to support various backends.
#[async_trait]
pub trait EntityRepository: Send + Sync {
    /// Find entity by ID
    async fn get(&self, entity_type: &EntityType, id: &str) -> DomainResult<Option<EntityRecord>>;

    /// List all entities of a type
    async fn list(&self, entity_type: &EntityType, query: &ListQuery) -> DomainResult<Vec<EntityRecord>>;

    /// Entities whose fields equal every entry of `predicate`
    async fn filter(
        &self,
        entity_type: &EntityType,
        predicate: &Map<String, Value>,
        query: &ListQuery,
    ) -> DomainResult<Vec<EntityRecord>>;

    /// Create a new entity; the store assigns id and timestamps
    async fn create(&self, entity_type: &EntityType, fields: Map<String, Value>) -> DomainResult<EntityRecord>;

    /// Shallow-merge `patch` into an existing entity
    async fn update(
        &self,
        entity_type: &EntityType,
        id: &str,
        patch: Map<String, Value>,
    ) -> DomainResult<EntityRecord>;

    /// Delete entity by ID
    async fn delete(&self, entity_type: &EntityType, id: &str) -> DomainResult<()>;
}
