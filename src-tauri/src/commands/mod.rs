//! Commands Layer
//!
//! Tauri command handlers that bridge frontend to backend services.

mod ai_cmd;
mod entity_cmd;
mod settings_cmd;

pub use ai_cmd::*;
pub use entity_cmd::*;
pub use settings_cmd::*;
