//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity.

use leptos::prelude::*;
use milestone_sync::EntityId;
use reactive_stores::Store;

use crate::models::Goal;

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Goals as last fetched, newest first
    pub goals: Vec<Goal>,
    /// Goal shown in the card
    pub selected: Option<EntityId>,
    /// Message of the last failed goal fetch
    pub load_error: Option<String>,
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Selection after a refetch: keep the current goal if it still exists,
/// otherwise fall back to the first one
pub fn next_selection(goals: &[Goal], current: Option<&EntityId>) -> Option<EntityId> {
    current
        .filter(|id| goals.iter().any(|g| &g.id == *id))
        .cloned()
        .or_else(|| goals.first().map(|g| g.id.clone()))
}

/// Replace the goal list with a fresh fetch
pub fn store_set_goals(store: &AppStore, goals: Vec<Goal>) {
    let current = store.selected().get_untracked();
    let selected = next_selection(&goals, current.as_ref());
    store.goals().set(goals);
    store.selected().set(selected);
    store.load_error().set(None);
}

/// Remove a goal from the store by ID
pub fn store_remove_goal(store: &AppStore, goal_id: &EntityId) {
    store.goals().write().retain(|goal| &goal.id != goal_id);
    let current = store.selected().get_untracked();
    let selected = store.goals().with_untracked(|goals| next_selection(goals, current.as_ref()));
    store.selected().set(selected);
}

/// Currently selected goal, if any
pub fn selected_goal(store: &AppStore) -> Option<Goal> {
    let selected = store.selected().get()?;
    store.goals().with(|goals| goals.iter().find(|g| g.id == selected).cloned())
}
