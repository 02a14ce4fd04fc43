//! Milestone Items
//!
//! Canonical milestone shape plus the one conversion from whatever the
//! store hands back (bare strings, partial objects, junk) into it.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single normalized milestone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_date: Option<DateTime<Utc>>,
}

impl Milestone {
    /// Create an open milestone with only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            completed: false,
            due_date: None,
            completed_date: None,
        }
    }

    /// Positional title used when the stored entry has none
    pub fn default_title(index: usize) -> String {
        format!("Step {}", index + 1)
    }

    /// Return a copy with the completion flag set.
    ///
    /// `completed_date` follows the flag: `now` when completed, cleared otherwise.
    pub fn with_completion(mut self, completed: bool, now: DateTime<Utc>) -> Self {
        self.completed = completed;
        self.completed_date = completed.then_some(now);
        self
    }
}

/// A milestone as stored remotely, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum RawMilestone {
    /// Older records stored milestones as plain strings
    Legacy(String),
    /// Object form, possibly missing fields or carrying wrong types
    Structured(Map<String, Value>),
}

impl RawMilestone {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(title) => RawMilestone::Legacy(title),
            Value::Object(fields) => RawMilestone::Structured(fields),
            other => {
                log::debug!("unexpected milestone shape {}, using defaults", other);
                RawMilestone::Structured(Map::new())
            }
        }
    }

    /// Convert into the canonical shape. `index` is the position in the list.
    pub fn normalize(self, index: usize) -> Milestone {
        match self {
            RawMilestone::Legacy(title) => Milestone::new(title_or_default(Some(title), index)),
            RawMilestone::Structured(fields) => {
                let title = fields.get("title").and_then(Value::as_str).map(str::to_owned);
                Milestone {
                    title: title_or_default(title, index),
                    description: fields
                        .get("description")
                        .and_then(Value::as_str)
                        .filter(|d| !d.is_empty())
                        .map(str::to_owned),
                    completed: fields.get("completed").and_then(Value::as_bool).unwrap_or(false),
                    due_date: fields.get("due_date").and_then(Value::as_str).and_then(parse_date),
                    completed_date: fields
                        .get("completed_date")
                        .and_then(Value::as_str)
                        .and_then(parse_timestamp),
                }
            }
        }
    }
}

impl<'de> Deserialize<'de> for RawMilestone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(RawMilestone::from_value)
    }
}

impl From<Milestone> for RawMilestone {
    fn from(milestone: Milestone) -> Self {
        match serde_json::to_value(milestone) {
            Ok(Value::Object(fields)) => RawMilestone::Structured(fields),
            _ => RawMilestone::Structured(Map::new()),
        }
    }
}

/// Normalize a sequence of raw milestones
pub fn normalize<I>(raw: I) -> Vec<Milestone>
where
    I: IntoIterator<Item = RawMilestone>,
{
    raw.into_iter()
        .enumerate()
        .map(|(index, entry)| entry.normalize(index))
        .collect()
}

/// Normalize a raw entity field. Anything but an array yields an empty list.
pub fn normalize_field(field: Option<&Value>) -> Vec<Milestone> {
    match field {
        Some(Value::Array(entries)) => normalize(entries.iter().cloned().map(RawMilestone::from_value)),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            log::debug!("milestone field is not a list ({}), treating as empty", other);
            Vec::new()
        }
    }
}

fn title_or_default(title: Option<String>, index: usize) -> String {
    match title {
        Some(t) if !t.trim().is_empty() => t,
        _ => Milestone::default_title(index),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        })
}
