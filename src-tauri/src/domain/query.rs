//! List Queries
//!
//! Sort keys and limits for list/filter operations.

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult};
use super::entity_type::is_valid_field;

/// Fields that live in their own columns rather than inside the JSON data
pub const COLUMN_FIELDS: [&str; 3] = ["id", "created_date", "updated_date"];

/// Field to order by, `-field` meaning descending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let (field, descending) = milestone_sync::store::parse_sort_key(raw.trim());
        if !is_valid_field(field) {
            return Err(DomainError::InvalidInput(format!("Bad sort key: {:?}", raw)));
        }
        Ok(Self {
            field: field.to_string(),
            descending,
        })
    }

    /// SQL `ORDER BY` clause body. Only built from validated field names.
    pub fn order_by(&self) -> String {
        let expr = if COLUMN_FIELDS.contains(&self.field.as_str()) {
            self.field.clone()
        } else {
            format!("json_extract(data, '$.{}')", self.field)
        };
        let direction = if self.descending { "DESC" } else { "ASC" };
        format!("{} {}, id ASC", expr, direction)
    }
}

/// Options shared by list and filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub sort: Option<SortKey>,
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn new(sort: Option<&str>, limit: Option<u32>) -> DomainResult<Self> {
        let sort = match sort {
            Some(s) if !s.trim().is_empty() => Some(SortKey::parse(s)?),
            _ => None,
        };
        Ok(Self { sort, limit })
    }

    /// Default ordering when no sort key is given: newest first
    pub fn order_by(&self) -> String {
        match &self.sort {
            Some(key) => key.order_by(),
            None => "created_date DESC, id ASC".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_parse() {
        let key = SortKey::parse("-created_date").unwrap();
        assert_eq!(key.field, "created_date");
        assert!(key.descending);
        assert_eq!(key.order_by(), "created_date DESC, id ASC");

        let key = SortKey::parse("target_date").unwrap();
        assert_eq!(key.order_by(), "json_extract(data, '$.target_date') ASC, id ASC");
    }

    #[test]
    fn test_sort_key_rejects_injection() {
        assert!(SortKey::parse("title') DESC; --").is_err());
        assert!(SortKey::parse("-").is_err());
    }

    #[test]
    fn test_blank_sort_means_default() {
        let query = ListQuery::new(Some("  "), None).unwrap();
        assert_eq!(query.sort, None);
        assert_eq!(query.order_by(), "created_date DESC, id ASC");
    }
}
