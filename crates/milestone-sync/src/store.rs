//! Remote Entity Store
//!
//! Abstract interface over the backend holding entities, addressed by
//! entity type name and id. Implementations can use Tauri IPC, HTTP,
//! in-memory, etc.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Opaque entity identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A stored entity: its id plus arbitrary top-level fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: EntityId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl EntityRecord {
    pub fn new(id: impl Into<EntityId>, fields: Map<String, Value>) -> Self {
        Self { id: id.into(), fields }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// CRUD by entity type name and id.
///
/// Futures are not required to be `Send`: the UI drives them on a single
/// thread.
#[async_trait(?Send)]
pub trait EntityStore {
    async fn get(&self, entity_type: &str, id: &EntityId) -> Result<EntityRecord, StoreError>;

    /// List all entities of a type. `sort` is a field name, `-` prefixed for descending.
    async fn list(&self, entity_type: &str, sort: Option<&str>) -> Result<Vec<EntityRecord>, StoreError>;

    /// Entities whose top-level fields equal every entry of `predicate`
    async fn filter(
        &self,
        entity_type: &str,
        predicate: &Map<String, Value>,
        sort: Option<&str>,
    ) -> Result<Vec<EntityRecord>, StoreError>;

    async fn create(&self, entity_type: &str, fields: Map<String, Value>) -> Result<EntityRecord, StoreError>;

    /// Shallow-merge `patch` into the stored fields
    async fn update(
        &self,
        entity_type: &str,
        id: &EntityId,
        patch: Map<String, Value>,
    ) -> Result<EntityRecord, StoreError>;

    async fn delete(&self, entity_type: &str, id: &EntityId) -> Result<(), StoreError>;
}

/// Split a sort key into field name and descending flag
pub fn parse_sort_key(sort: &str) -> (&str, bool) {
    match sort.strip_prefix('-') {
        Some(field) => (field, true),
        None => (sort, false),
    }
}

/// Total order over JSON values for sorting: null < bool < number < string < other
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Apply a sort key to a record list in place
pub fn sort_records(records: &mut [EntityRecord], sort: Option<&str>) {
    let Some(sort) = sort else { return };
    let (field, descending) = parse_sort_key(sort);
    records.sort_by(|a, b| {
        let ord = if field == "id" {
            a.id.cmp(&b.id)
        } else {
            compare_values(a.field(field), b.field(field))
        };
        if descending { ord.reverse() } else { ord }
    });
}

/// Whether a record matches an equality predicate
pub fn matches_predicate(record: &EntityRecord, predicate: &Map<String, Value>) -> bool {
    predicate.iter().all(|(key, expected)| {
        if key == "id" {
            expected.as_str() == Some(record.id.as_str())
        } else {
            record.field(key).unwrap_or(&Value::Null) == expected
        }
    })
}

/// In-process store, used for offline previews and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<BTreeMap<String, Vec<EntityRecord>>>,
    next_id: Cell<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record as-is, replacing any record with the same id
    pub fn seed(&self, entity_type: &str, record: EntityRecord) {
        let mut records = self.records.borrow_mut();
        let bucket = records.entry(entity_type.to_string()).or_default();
        bucket.retain(|r| r.id != record.id);
        bucket.push(record);
    }

    fn not_found(entity_type: &str, id: &EntityId) -> StoreError {
        StoreError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}

#[async_trait(?Send)]
impl EntityStore for MemoryStore {
    async fn get(&self, entity_type: &str, id: &EntityId) -> Result<EntityRecord, StoreError> {
        self.records
            .borrow()
            .get(entity_type)
            .and_then(|bucket| bucket.iter().find(|r| &r.id == id).cloned())
            .ok_or_else(|| Self::not_found(entity_type, id))
    }

    async fn list(&self, entity_type: &str, sort: Option<&str>) -> Result<Vec<EntityRecord>, StoreError> {
        let mut records = self.records.borrow().get(entity_type).cloned().unwrap_or_default();
        sort_records(&mut records, sort);
        Ok(records)
    }

    async fn filter(
        &self,
        entity_type: &str,
        predicate: &Map<String, Value>,
        sort: Option<&str>,
    ) -> Result<Vec<EntityRecord>, StoreError> {
        let mut records: Vec<_> = self
            .list(entity_type, None)
            .await?
            .into_iter()
            .filter(|r| matches_predicate(r, predicate))
            .collect();
        sort_records(&mut records, sort);
        Ok(records)
    }

    async fn create(&self, entity_type: &str, fields: Map<String, Value>) -> Result<EntityRecord, StoreError> {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let record = EntityRecord::new(format!("mem-{}", id), fields);
        self.seed(entity_type, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        entity_type: &str,
        id: &EntityId,
        patch: Map<String, Value>,
    ) -> Result<EntityRecord, StoreError> {
        let mut records = self.records.borrow_mut();
        let record = records
            .get_mut(entity_type)
            .and_then(|bucket| bucket.iter_mut().find(|r| &r.id == id))
            .ok_or_else(|| Self::not_found(entity_type, id))?;
        for (key, value) in patch {
            if value.is_null() {
                record.fields.remove(&key);
            } else {
                record.fields.insert(key, value);
            }
        }
        Ok(record.clone())
    }

    async fn delete(&self, entity_type: &str, id: &EntityId) -> Result<(), StoreError> {
        let mut records = self.records.borrow_mut();
        let bucket = records
            .get_mut(entity_type)
            .ok_or_else(|| Self::not_found(entity_type, id))?;
        let before = bucket.len();
        bucket.retain(|r| &r.id != id);
        if bucket.len() == before {
            return Err(Self::not_found(entity_type, id));
        }
        Ok(())
    }
}
