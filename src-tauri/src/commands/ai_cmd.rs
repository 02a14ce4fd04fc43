//! Tauri Commands for AI Invocation

use milestone_sync::Milestone;
use serde_json::{Map, Value};
use tauri::State;

use crate::ai::{self, LlmClient};
use crate::AppState;

const DEFAULT_SUGGESTIONS: usize = 4;

async fn client(state: &AppState) -> Result<LlmClient, String> {
    let config = state.config.lock().await.llm.clone();
    LlmClient::new(config).map_err(|e| e.to_string())
}

/// Schema-constrained generation: prompt in, JSON object out
#[tauri::command]
pub async fn invoke_llm(
    state: State<'_, AppState>,
    prompt: String,
    response_schema: Value,
) -> Result<Map<String, Value>, String> {
    let client = client(&state).await?;
    client.invoke(&prompt, &response_schema).await.map_err(|e| {
        log::warn!("invoke_llm failed: {}", e);
        e.to_string()
    })
}

/// Suggest milestones for a goal title, normalized like stored milestones
#[tauri::command]
pub async fn suggest_milestones(
    state: State<'_, AppState>,
    goal_title: String,
    count: Option<usize>,
) -> Result<Vec<Milestone>, String> {
    if goal_title.trim().is_empty() {
        return Err("Goal title is empty".to_string());
    }
    let client = client(&state).await?;
    let prompt = ai::milestone_prompt(&goal_title, count.unwrap_or(DEFAULT_SUGGESTIONS));
    let response = client
        .invoke(&prompt, &ai::milestone_schema())
        .await
        .map_err(|e| e.to_string())?;
    Ok(ai::milestones_from_response(&response))
}
