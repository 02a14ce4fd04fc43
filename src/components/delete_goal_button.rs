//! Delete Goal Button
//!
//! Two-step delete for the goal on display. The button asks for the goal by
//! name, runs the delete itself and keeps a failed delete visible.

use leptos::prelude::*;
use leptos::task::spawn_local;
use milestone_sync::EntityId;

use crate::commands;
use crate::models::GOAL;

#[derive(Debug, Clone, PartialEq)]
enum DeleteStep {
    Idle,
    Confirming,
    Deleting,
    Failed(String),
}

#[component]
pub fn DeleteGoalButton(
    goal_id: EntityId,
    #[prop(into)] goal_title: String,
    /// Runs after the backend removed the goal
    #[prop(into)]
    on_deleted: Callback<EntityId>,
) -> impl IntoView {
    let step = RwSignal::new(DeleteStep::Idle);
    let goal_id = StoredValue::new(goal_id);

    let run_delete = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        let id = goal_id.get_value();
        step.set(DeleteStep::Deleting);
        spawn_local(async move {
            match commands::delete_entity(GOAL, &id).await {
                Ok(()) => {
                    log::info!("deleted goal {}", id);
                    step.try_set(DeleteStep::Idle);
                    on_deleted.run(id);
                }
                Err(e) => {
                    log::error!("delete goal {} failed: {}", id, e);
                    step.try_set(DeleteStep::Failed(e.to_string()));
                }
            }
        });
    };

    view! {
        <span class="goal-delete">
            {move || match step.get() {
                DeleteStep::Idle => view! {
                    <button
                        class="delete-btn"
                        title="Delete goal"
                        on:click=move |ev| {
                            ev.stop_propagation();
                            step.set(DeleteStep::Confirming);
                        }
                    >
                        "×"
                    </button>
                }.into_any(),
                DeleteStep::Confirming => view! {
                    <span class="delete-confirm">
                        <span class="delete-confirm-text">{format!("Delete \"{}\"?", goal_title)}</span>
                        <button class="confirm-btn" on:click=run_delete>"Delete"</button>
                        <button class="cancel-btn" on:click=move |_| step.set(DeleteStep::Idle)>"Keep"</button>
                    </span>
                }.into_any(),
                DeleteStep::Deleting => view! {
                    <span class="delete-progress">"Deleting…"</span>
                }.into_any(),
                DeleteStep::Failed(msg) => view! {
                    <span class="delete-failed" role="alert">
                        {format!("Couldn't delete: {}", msg)}
                        <button class="cancel-btn" on:click=move |_| step.set(DeleteStep::Idle)>"OK"</button>
                    </span>
                }.into_any(),
            }}
        </span>
    }
}
