//! Settings Commands
//!
//! AI endpoint configuration and log access.

use tauri::State;

use crate::config::LlmConfig;
use crate::AppState;

/// Current LLM settings with the API key masked
#[tauri::command]
pub async fn get_ai_config(state: State<'_, AppState>) -> Result<LlmConfig, String> {
    Ok(state.config.lock().await.llm.redacted())
}

/// Save LLM settings. A masked key (as returned by `get_ai_config`) keeps the stored one.
#[tauri::command]
pub async fn save_ai_config(state: State<'_, AppState>, config: LlmConfig) -> Result<(), String> {
    let mut current = state.config.lock().await;
    current.merge_llm(config);
    current.save(&state.config_path)?;
    log::info!("AI config saved (model {})", current.llm.model);
    Ok(())
}

/// Most recent backend log lines
#[tauri::command]
pub fn recent_logs() -> Vec<String> {
    rolling_logger::recent_lines()
}
