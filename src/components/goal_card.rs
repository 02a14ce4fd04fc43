//! Goal Card Component
//!
//! Shows the selected goal and owns its milestone reconciler. Checkbox
//! clicks apply locally at once; background refetches of the same goal
//! never overwrite them.

use leptos::prelude::*;
use leptos::task::spawn_local;
use milestone_sync::{persist, EntityId, Observation, Reconciler, ReconcilerConfig, SettleOutcome};

use crate::commands::TauriEntityStore;
use crate::components::{DeleteGoalButton, MilestoneRow, SaveNotice};
use crate::context::AppContext;
use crate::models::Goal;
use crate::store::{store_remove_goal, use_app_store};

#[component]
pub fn GoalCard(#[prop(into)] goal: Signal<Option<Goal>>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();

    let reconciler = RwSignal::new(Reconciler::new(ReconcilerConfig::goals()));

    // Every delivery of the selected goal, refetches included
    Effect::new(move |_| {
        let Some(goal) = goal.get() else { return };
        let observation = reconciler.try_update_untracked(|r| r.initialize(&goal.record));
        match observation {
            Some(Observation::Ignored) | None => {}
            Some(observed) => {
                log::debug!("goal card {:?} {}", observed, goal.id);
                reconciler.notify();
            }
        }
    });

    let on_toggle = Callback::new(move |(index, completed): (usize, bool)| {
        let save = match reconciler.try_update(|r| r.toggle_item_now(index, completed)) {
            Some(Ok(save)) => save,
            Some(Err(e)) => {
                log::warn!("toggle ignored: {}", e);
                return;
            }
            None => return,
        };
        spawn_local(async move {
            let Some(config) = reconciler.try_with_untracked(|r| r.config().clone()) else {
                return;
            };
            let outcome = persist(&TauriEntityStore, &config, &save).await;
            // The card may be gone by now; then there is nothing to settle
            if reconciler.try_update(|r| r.settle(&save, outcome)) == Some(SettleOutcome::Confirmed) {
                ctx.reload();
            }
        });
    });

    let on_deleted = Callback::new(move |id: EntityId| {
        store_remove_goal(&store, &id);
        ctx.reload();
    });

    // Id, title and description only; refetches of the same goal keep the DOM
    let header = Memo::new(move |_| {
        goal.with(|g| g.as_ref().map(|g| (g.id.clone(), g.title.clone(), g.description.clone())))
    });
    // Only a new failure or a dismissal changes this
    let notice = Memo::new(move |_| {
        reconciler.with(|r| r.last_error().map(|msg| (r.failure_count(), msg.to_string())))
    });
    let progress = move || reconciler.with(|r| r.progress());
    let counts = move || {
        reconciler.with(|r| format!("{} of {} done", r.checklist().completed_count(), r.checklist().len()))
    };

    view! {
        {move || match header.get() {
            None => view! { <section class="goal-card empty">"Pick or create a goal."</section> }.into_any(),
            Some((id, title, description)) => view! {
                <section class="goal-card">
                    <header class="goal-card-header">
                        <h2>{title.clone()}</h2>
                        <DeleteGoalButton goal_id=id goal_title=title on_deleted=on_deleted />
                    </header>
                    {description.map(|d| view! { <p class="goal-description">{d}</p> })}

                    <div class="progress-row">
                        <div class="progress-bar">
                            <div class="progress-fill" style=move || format!("width: {}%;", progress())></div>
                        </div>
                        <span class="progress-label">{move || format!("{}%", progress())}</span>
                        <span class="progress-counts">{counts}</span>
                        <Show when=move || reconciler.with(|r| r.is_saving())>
                            <span class="saving-marker">"saving…"</span>
                        </Show>
                    </div>

                    <SaveNotice
                        notice=notice
                        on_dismiss=Callback::new(move |_: ()| reconciler.update(|r| r.dismiss_error()))
                    />

                    <ul class="milestone-list">
                        <For
                            each=move || reconciler.with(|r| r.items().iter().cloned().enumerate().collect::<Vec<_>>())
                            key=|(index, m)| (*index, m.completed, m.title.clone())
                            children=move |(index, milestone)| view! {
                                <MilestoneRow index=index milestone=milestone on_toggle=on_toggle />
                            }
                        />
                    </ul>
                    <Show when=move || reconciler.with(|r| r.checklist().is_empty())>
                        <p class="milestone-empty">"No milestones yet."</p>
                    </Show>
                </section>
            }.into_any(),
        }}
    }
}
