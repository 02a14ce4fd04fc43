//! Goal List Component

use leptos::prelude::*;

use crate::store::{use_app_store, AppStateStoreFields};

/// All goals with their stored progress; click to select
#[component]
pub fn GoalList() -> impl IntoView {
    let store = use_app_store();

    view! {
        <nav class="goal-list">
            <For
                each=move || store.goals().get()
                key=|goal| (goal.id.clone(), goal.title.clone(), goal.progress)
                children=move |goal| {
                    let id = goal.id.clone();
                    let select_id = goal.id.clone();
                    let summary = format!("{} milestones", goal.milestones.len());
                    let is_selected = move || store.selected().get().as_ref() == Some(&id);
                    view! {
                        <button
                            class=move || if is_selected() { "goal-list-item active" } else { "goal-list-item" }
                            title=summary
                            on:click=move |_| store.selected().set(Some(select_id.clone()))
                        >
                            <span class="goal-list-title">{goal.title}</span>
                            <span class="goal-list-progress">{format!("{}%", goal.progress)}</span>
                        </button>
                    }
                }
            />
            <Show when=move || store.goals().with(|goals| goals.is_empty())>
                <p class="goal-list-empty">"No goals yet."</p>
            </Show>
        </nav>
    }
}
