//! Domain Layer
//!
//! Entity type names, queries and errors. Records themselves are the
//! shared `milestone_sync::EntityRecord` shape: an id plus free-form fields.

mod entity;
mod entity_type;
mod query;

pub use entity::{DomainError, DomainResult};
pub use entity_type::EntityType;
pub use query::{ListQuery, COLUMN_FIELDS};
