//! New Goal Form Component
//!
//! Creates a goal with one milestone per line, optionally drafted by AI.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::commands;
use crate::context::AppContext;
use crate::models::{milestones_from_lines, new_goal_fields, GOAL};
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn NewGoalForm() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();

    let (title, set_title) = signal(String::new());
    let (description, set_description) = signal(String::new());
    let (milestone_text, set_milestone_text) = signal(String::new());
    let (suggesting, set_suggesting) = signal(false);
    let (form_error, set_form_error) = signal::<Option<String>>(None);

    let suggest = move |_| {
        let goal_title = title.get();
        if goal_title.trim().is_empty() {
            set_form_error.set(Some("Give the goal a title first".to_string()));
            return;
        }
        set_suggesting.set(true);
        set_form_error.set(None);
        spawn_local(async move {
            match commands::suggest_milestones(&goal_title, None).await {
                Ok(milestones) => {
                    let lines: Vec<_> = milestones.into_iter().map(|m| m.title).collect();
                    set_milestone_text.set(lines.join("\n"));
                }
                Err(e) => set_form_error.set(Some(e.to_string())),
            }
            set_suggesting.set(false);
        });
    };

    let create_goal = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let goal_title = title.get();
        if goal_title.trim().is_empty() {
            return;
        }
        let milestones = milestones_from_lines(&milestone_text.get());
        let fields = new_goal_fields(&goal_title, &description.get(), &milestones);

        spawn_local(async move {
            match commands::create_entity(GOAL, &fields).await {
                Ok(created) => {
                    log::info!("created goal {} with {} milestones", created.id, milestones.len());
                    set_title.set(String::new());
                    set_description.set(String::new());
                    set_milestone_text.set(String::new());
                    set_form_error.set(None);
                    store.selected().set(Some(created.id));
                    ctx.reload();
                }
                Err(e) => set_form_error.set(Some(e.to_string())),
            }
        });
    };

    view! {
        <form class="new-goal-form" on:submit=create_goal>
            <div class="new-goal-row">
                <input
                    type="text"
                    placeholder="New goal..."
                    prop:value=move || title.get()
                    on:input=move |ev| set_title.set(event_target_value(&ev))
                />
                <button type="submit">"Add"</button>
            </div>
            <input
                type="text"
                class="new-goal-description"
                placeholder="Why it matters (optional)"
                prop:value=move || description.get()
                on:input=move |ev| set_description.set(event_target_value(&ev))
            />
            <textarea
                class="new-goal-milestones"
                rows="4"
                placeholder="One milestone per line"
                prop:value=move || milestone_text.get()
                on:input=move |ev| set_milestone_text.set(event_target_value(&ev))
            ></textarea>
            <button
                type="button"
                class="suggest-btn"
                disabled=move || suggesting.get()
                on:click=suggest
            >
                {move || if suggesting.get() { "Thinking…" } else { "Suggest milestones" }}
            </button>
            {move || form_error.get().map(|msg| view! { <p class="form-error">{msg}</p> })}
        </form>
    }
}
