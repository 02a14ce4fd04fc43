//! AI Commands

use milestone_sync::Milestone;
use serde::{Deserialize, Serialize};

use super::{call, CommandError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestArgs<'a> {
    goal_title: &'a str,
    count: Option<usize>,
}

/// LLM settings as shown to the user; the API key arrives masked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Serialize)]
struct SaveConfigArgs<'a> {
    config: &'a AiConfig,
}

pub async fn suggest_milestones(goal_title: &str, count: Option<usize>) -> Result<Vec<Milestone>, CommandError> {
    call("suggest_milestones", &SuggestArgs { goal_title, count }).await
}

pub async fn get_ai_config() -> Result<AiConfig, CommandError> {
    call("get_ai_config", &()).await
}

pub async fn save_ai_config(config: &AiConfig) -> Result<(), CommandError> {
    call("save_ai_config", &SaveConfigArgs { config }).await
}
