//! MindWell Backend
//!
//! Layered architecture:
//! - domain: Entity types, queries and errors
//! - repository: Generic entity store on SQLite
//! - ai: Structured LLM invocation
//! - commands: Tauri command handlers

use std::path::PathBuf;
use tauri::{Emitter, Manager};
use tokio::sync::Mutex;

mod ai;
mod commands;
mod config;
mod domain;
mod repository;

use config::AppConfig;
use repository::{init_db, DbState, SqliteEntityRepository};

const DB_FILE: &str = "mindwell.db";

/// Application state shared across commands
pub struct AppState {
    pub db_state: DbState,
    pub entity_repo: SqliteEntityRepository,
    pub config: Mutex<AppConfig>,
    pub config_path: PathBuf,
}

/// Get database path from app handle
fn get_db_path(app_handle: &tauri::AppHandle) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let app_dir = app_handle.path().app_data_dir()?;
    std::fs::create_dir_all(&app_dir)?;
    Ok(app_dir.join(DB_FILE))
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            // Single instance check - must be first!
            #[cfg(desktop)]
            app.handle().plugin(tauri_plugin_single_instance::init(|_app, _args, _cwd| {
                if let Some(window) = _app.get_webview_window("main") {
                    let _ = window.set_focus();
                }
            }))?;

            let app_handle = app.handle().clone();

            rolling_logger::init_logger(app_handle.path().app_log_dir()?, "MindWell")?;

            let db_path = get_db_path(&app_handle)?;
            let config_path = config::config_path(&app_handle.path().app_config_dir()?);
            let app_config = AppConfig::load(&config_path).with_env();
            log::info!(
                "App setup starting (db {}, ai configured: {})",
                db_path.display(),
                app_config.llm.is_configured()
            );

            // Commands report "Database not initialized" until the background init lands
            let db_state = DbState::new();
            app.manage(AppState {
                db_state: db_state.clone(),
                entity_repo: SqliteEntityRepository::new(db_state.conn.clone()),
                config: Mutex::new(app_config),
                config_path,
            });

            tauri::async_runtime::spawn(async move {
                match init_db(&db_path).await {
                    Ok(initialized_state) => {
                        db_state.replace_with(initialized_state).await;
                        let _ = rolling_logger::info("Async DB init success");
                        if let Err(e) = app_handle.emit("db-initialized", ()) {
                            log::error!("Failed to emit db-initialized: {}", e);
                        }
                    }
                    Err(e) => {
                        let _ = rolling_logger::error(&format!("Async DB init failed: {}", e));
                    }
                }
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Entity store
            commands::entity_get,
            commands::entity_list,
            commands::entity_filter,
            commands::entity_create,
            commands::entity_update,
            commands::entity_delete,
            // AI
            commands::invoke_llm,
            commands::suggest_milestones,
            // Settings
            commands::get_ai_config,
            commands::save_ai_config,
            commands::recent_logs,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
