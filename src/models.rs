//! Frontend Models
//!
//! Goals as read from the generic entity store.

use milestone_sync::{normalize_field, progress_of, EntityId, EntityRecord, Milestone};
use serde_json::{json, Map, Value};

pub const GOAL: &str = "Goal";
pub const GOAL_SORT: &str = "-created_date";

/// Goal view over an entity record
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub milestones: Vec<Milestone>,
    /// Stored progress; recomputed from milestones when absent
    pub progress: u8,
    pub record: EntityRecord,
}

impl Goal {
    pub fn from_record(record: EntityRecord) -> Self {
        let text = |name: &str| {
            record
                .field(name)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let milestones = normalize_field(record.field("milestones"));
        let progress = record
            .field("progress")
            .and_then(Value::as_u64)
            .map(|p| p.min(100) as u8)
            .unwrap_or_else(|| progress_of(&milestones));

        Self {
            id: record.id.clone(),
            title: text("title").unwrap_or_else(|| "Untitled goal".to_string()),
            description: text("description"),
            milestones,
            progress,
            record,
        }
    }
}

/// Fields for a new goal
pub fn new_goal_fields(title: &str, description: &str, milestones: &[Milestone]) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("title".to_string(), json!(title.trim()));
    if !description.trim().is_empty() {
        fields.insert("description".to_string(), json!(description.trim()));
    }
    fields.insert("milestones".to_string(), json!(milestones));
    fields.insert("progress".to_string(), json!(progress_of(milestones)));
    fields
}

/// Split a textarea into milestone titles, one per non-blank line
pub fn milestones_from_lines(text: &str) -> Vec<Milestone> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Milestone::new)
        .collect()
}
