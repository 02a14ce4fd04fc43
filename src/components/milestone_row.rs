//! Milestone Row Component

use leptos::prelude::*;
use milestone_sync::Milestone;

/// One milestone with its completion checkbox
#[component]
pub fn MilestoneRow(
    index: usize,
    milestone: Milestone,
    #[prop(into)] on_toggle: Callback<(usize, bool)>,
) -> impl IntoView {
    let completed = milestone.completed;
    let due = milestone.due_date.map(|d| format!("due {}", d.format("%b %-d")));
    let done_on = milestone
        .completed_date
        .filter(|_| completed)
        .map(|d| format!("done {}", d.format("%b %-d")));

    view! {
        <li class=if completed { "milestone-row completed" } else { "milestone-row" }>
            <label>
                <input
                    type="checkbox"
                    prop:checked=completed
                    on:change=move |ev| on_toggle.run((index, event_target_checked(&ev)))
                />
                <span class="milestone-title">{milestone.title}</span>
            </label>
            {milestone.description.map(|d| view! { <p class="milestone-description">{d}</p> })}
            <span class="milestone-dates">
                {due.map(|d| view! { <span class="milestone-due">{d}</span> })}
                {done_on.map(|d| view! { <span class="milestone-done">{d}</span> })}
            </span>
        </li>
    }
}
