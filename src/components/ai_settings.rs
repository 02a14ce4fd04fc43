//! AI Settings Component
//!
//! Endpoint, model and key for milestone suggestions.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::commands::{self, AiConfig};

/// Edit one field of the loaded config
fn edit(config: RwSignal<Option<AiConfig>>, apply: impl FnOnce(&mut AiConfig)) {
    config.update(|c| {
        if let Some(c) = c {
            apply(c);
        }
    });
}

#[component]
pub fn AiSettings() -> impl IntoView {
    let (open, set_open) = signal(false);
    let config = RwSignal::new(None::<AiConfig>);
    let (status, set_status) = signal::<Option<String>>(None);

    let toggle_open = move |_| {
        let opening = !open.get();
        set_open.set(opening);
        if opening {
            spawn_local(async move {
                match commands::get_ai_config().await {
                    Ok(loaded) => config.set(Some(loaded)),
                    Err(e) => set_status.set(Some(e.to_string())),
                }
            });
        }
    };

    let save = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(current) = config.get() else { return };
        spawn_local(async move {
            let message = match commands::save_ai_config(&current).await {
                Ok(()) => "Saved".to_string(),
                Err(e) => e.to_string(),
            };
            set_status.set(Some(message));
        });
    };

    let field = move |read: fn(&AiConfig) -> String| {
        move || config.with(|c| c.as_ref().map(read).unwrap_or_default())
    };

    view! {
        <div class="ai-settings">
            <button type="button" class="settings-toggle" on:click=toggle_open>
                {move || if open.get() { "Hide AI settings" } else { "AI settings" }}
            </button>
            <Show when=move || open.get() && config.with(Option::is_some)>
                <form class="ai-settings-form" on:submit=save>
                    <label>"Endpoint"
                        <input
                            type="text"
                            prop:value=field(|c| c.base_url.clone())
                            on:input=move |ev| {
                                let v = event_target_value(&ev);
                                edit(config, |c| c.base_url = v);
                            }
                        />
                    </label>
                    <label>"Model"
                        <input
                            type="text"
                            prop:value=field(|c| c.model.clone())
                            on:input=move |ev| {
                                let v = event_target_value(&ev);
                                edit(config, |c| c.model = v);
                            }
                        />
                    </label>
                    <label>"API key"
                        <input
                            type="password"
                            prop:value=field(|c| c.api_key.clone().unwrap_or_default())
                            on:input=move |ev| {
                                let v = event_target_value(&ev);
                                edit(config, |c| c.api_key = Some(v));
                            }
                        />
                    </label>
                    <button type="submit">"Save"</button>
                </form>
            </Show>
            {move || status.get().map(|msg| view! { <p class="settings-status">{msg}</p> })}
        </div>
    }
}
