//! Tauri Command Wrappers
//!
//! Frontend bindings to backend commands, organized by domain.

mod ai;
mod entity;
mod events;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["window", "__TAURI__", "core"])]
    async fn invoke(cmd: &str, args: JsValue) -> Result<JsValue, JsValue>;
}

// Re-export all public items
pub use ai::*;
pub use entity::*;
pub use events::*;

/// Failure of a backend command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// The command ran and returned an error message
    Rejected(String),
    /// The call never completed (IPC unavailable, bad payload)
    Ipc(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Rejected(msg) => f.write_str(msg),
            CommandError::Ipc(msg) => write!(f, "IPC failure: {}", msg),
        }
    }
}

fn to_command_error(err: JsValue) -> CommandError {
    match err.as_string() {
        Some(msg) => CommandError::Rejected(msg),
        None => CommandError::Ipc(format!("{:?}", err)),
    }
}

/// Invoke `cmd` with serialized `args` and decode its result.
///
/// Arguments go through the JSON-compatible serializer so maps arrive as
/// plain objects.
async fn call<A, T>(cmd: &str, args: &A) -> Result<T, CommandError>
where
    A: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let js_args = args
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| CommandError::Ipc(e.to_string()))?;
    let result = invoke(cmd, js_args).await.map_err(to_command_error)?;
    serde_wasm_bindgen::from_value(result).map_err(|e| CommandError::Ipc(e.to_string()))
}
