//! Backend Events

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["window", "__TAURI__", "event"])]
    async fn listen(event: &str, handler: &Closure<dyn FnMut(JsValue)>) -> Result<JsValue, JsValue>;
}

/// Emitted once the backend database is open
pub const DB_INITIALIZED: &str = "db-initialized";

/// Run `on_event` every time the backend emits `event`.
///
/// The handler lives for the rest of the page.
pub async fn on_backend_event(event: &str, mut on_event: impl FnMut() + 'static) -> Result<(), String> {
    let handler = Closure::<dyn FnMut(JsValue)>::new(move |_payload: JsValue| on_event());
    listen(event, &handler)
        .await
        .map_err(|e| format!("listen({}) failed: {:?}", event, e))?;
    handler.forget();
    Ok(())
}
