//! Entity Type Names
//!
//! Entities are stored generically and addressed by type name
//! ("Goal", "MoodEntry", "JournalEntry", ...). Names and field keys are
//! validated because sort keys end up inside SQL.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult};

fn identifier() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("valid identifier regex"))
}

/// Validated entity type name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityType(String);

impl EntityType {
    pub fn parse(name: &str) -> DomainResult<Self> {
        if identifier().is_match(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(DomainError::InvalidInput(format!("Bad entity type name: {:?}", name)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntityType {
    type Error = DomainError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::parse(&name)
    }
}

impl From<EntityType> for String {
    fn from(t: EntityType) -> Self {
        t.0
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether `key` is usable as a field name in queries
pub fn is_valid_field(key: &str) -> bool {
    key.starts_with('_') && key.len() > 1 && identifier().is_match(&key[1..]) || identifier().is_match(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_validation() {
        assert!(EntityType::parse("Goal").is_ok());
        assert!(EntityType::parse("Mood_Entry2").is_ok());
        assert!(EntityType::parse("").is_err());
        assert!(EntityType::parse("2Goal").is_err());
        assert!(EntityType::parse("Goal; DROP TABLE entities").is_err());
    }

    #[test]
    fn test_field_validation() {
        assert!(is_valid_field("created_date"));
        assert!(is_valid_field("_internal"));
        assert!(!is_valid_field("title') --"));
        assert!(!is_valid_field("_"));
    }
}
