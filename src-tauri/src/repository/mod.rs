//! Repository Layer
//!
//! Data access abstractions and implementations.

mod db;
mod entity_repo;
mod traits;

#[cfg(test)]
mod tests;

pub use db::{init_db, DbState};
pub use entity_repo::SqliteEntityRepository;
pub use traits::EntityRepository;
