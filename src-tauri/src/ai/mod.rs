//! AI Invocation
//!
//! Structured LLM calls used by features around goals.

mod llm;

pub use llm::LlmClient;

use milestone_sync::{normalize_field, Milestone};
use serde_json::{json, Map, Value};

/// Response schema for milestone suggestions
pub fn milestone_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "milestones": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["milestones"],
    })
}

pub fn milestone_prompt(goal_title: &str, count: usize) -> String {
    format!(
        "Break the personal wellbeing goal \"{}\" into {} small, concrete milestones. \
         Return them in the order they should be done.",
        goal_title.trim(),
        count
    )
}

/// Normalize the suggestion list like any stored milestone field
pub fn milestones_from_response(response: &Map<String, Value>) -> Vec<Milestone> {
    normalize_field(response.get("milestones"))
}
