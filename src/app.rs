//! MindWell Frontend App
//!
//! Goal list on the left, the selected goal's milestones on the right.

use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;

use crate::commands::{self, DB_INITIALIZED};
use crate::components::{AiSettings, GoalCard, GoalList, NewGoalForm};
use crate::context::AppContext;
use crate::models::{Goal, GOAL, GOAL_SORT};
use crate::store::{selected_goal, store_set_goals, AppState, AppStateStoreFields};

#[component]
pub fn App() -> impl IntoView {
    let store = Store::new(AppState::default());
    provide_context(store);

    let (reload_trigger, set_reload_trigger) = signal(0u32);
    let ctx = AppContext::new((reload_trigger, set_reload_trigger));
    provide_context(ctx);

    // The database opens in the background; reload once it is ready
    spawn_local(async move {
        if let Err(e) = commands::on_backend_event(DB_INITIALIZED, move || ctx.reload()).await {
            log::warn!("{}", e);
        }
    });

    // Load goals on mount and whenever the trigger changes
    Effect::new(move |_| {
        let trigger = reload_trigger.get();
        spawn_local(async move {
            match commands::list_entities(GOAL, Some(GOAL_SORT), None).await {
                Ok(records) => {
                    log::debug!("[APP] Loaded {} goals, trigger={}", records.len(), trigger);
                    store_set_goals(&store, records.into_iter().map(Goal::from_record).collect());
                }
                Err(e) => {
                    log::warn!("[APP] Loading goals failed: {}", e);
                    store.load_error().set(Some(e.to_string()));
                }
            }
        });
    });

    let selected = Signal::derive(move || selected_goal(&store));

    view! {
        <div class="app-layout">
            <aside class="sidebar">
                <h1>"MindWell"</h1>
                <NewGoalForm />
                <GoalList />
                <button class="refresh-btn" on:click=move |_| ctx.reload()>"Refresh"</button>
                <AiSettings />
            </aside>

            <main class="main-content">
                {move || store.load_error().get().map(|msg| view! {
                    <p class="load-error">{msg}</p>
                })}
                <GoalCard goal=selected />
            </main>
        </div>
    }
}
