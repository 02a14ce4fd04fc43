//! Optimistic Reconciler
//!
//! Holds the local, editable copy of an entity's milestone list. Edits land
//! locally first and are persisted afterwards; a later read of the same
//! entity never replaces the local copy.
//!
//! Lifecycle:
//! - `initialize` on every observation of an entity. Only a change of entity
//!   id moves the state machine; the same id again is ignored.
//! - `toggle_item` mutates locally and hands back a [`PendingSave`].
//! - the caller persists it (see [`crate::persist`]) and reports back through
//!   `settle`, which discards responses for anything but the current entity.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::checklist::Checklist;
use crate::error::{ReconcileError, StoreError};
use crate::item::{normalize_field, Milestone};
use crate::store::{EntityId, EntityRecord};

/// Sync guard: which entity (if any) the local list was loaded from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Uninitialized,
    Synced(EntityId),
}

impl SyncState {
    /// Whether observing `id` must reload the local list
    pub fn needs_load(&self, id: &EntityId) -> bool {
        match self {
            SyncState::Uninitialized => true,
            SyncState::Synced(current) => current != id,
        }
    }
}

/// What to restore when a save fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevertPolicy {
    /// Undo only the failed toggle: the item falls back to its newest
    /// unsettled toggle, or to its last confirmed value when none is left
    #[default]
    SingleMutation,
    /// Restore the whole list to what the store is last known to hold
    LastConfirmed,
}

/// Which entity type and fields the reconciler reads and writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    pub entity_type: String,
    pub items_field: String,
    pub progress_field: String,
    #[serde(default)]
    pub revert_policy: RevertPolicy,
}

impl ReconcilerConfig {
    /// Goal milestones, the list the app reconciles
    pub fn goals() -> Self {
        Self {
            entity_type: "Goal".to_string(),
            items_field: "milestones".to_string(),
            progress_field: "progress".to_string(),
            revert_policy: RevertPolicy::default(),
        }
    }

    pub fn with_revert_policy(mut self, policy: RevertPolicy) -> Self {
        self.revert_policy = policy;
        self
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self::goals()
    }
}

/// Result of observing an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// First entity seen by this reconciler
    Initialized,
    /// A different entity replaced the previous one
    Switched,
    /// Same entity as before; local state kept
    Ignored,
}

/// A toggle waiting to be written to the store
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave {
    entity_id: EntityId,
    epoch: u64,
    seq: u64,
    index: usize,
    after: Milestone,
    snapshot: Checklist,
}

impl PendingSave {
    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The full list to send
    pub fn items(&self) -> &[Milestone] {
        self.snapshot.items()
    }

    pub fn progress(&self) -> u8 {
        self.snapshot.progress()
    }

    /// Partial update body: `{ <items_field>: [...], <progress_field>: n }`
    pub fn patch(&self, config: &ReconcilerConfig) -> Map<String, Value> {
        let mut patch = Map::new();
        let items = serde_json::to_value(self.snapshot.items()).unwrap_or(Value::Array(Vec::new()));
        patch.insert(config.items_field.clone(), items);
        patch.insert(config.progress_field.clone(), Value::from(self.snapshot.progress()));
        patch
    }
}

/// What `settle` did with a save outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    Confirmed,
    Reverted,
    /// The save belonged to an entity no longer shown
    Discarded,
}

/// Local projection of one entity's milestone list
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: ReconcilerConfig,
    state: SyncState,
    epoch: u64,
    next_seq: u64,
    current: Checklist,
    confirmed: Checklist,
    in_flight: BTreeSet<u64>,
    /// Unsettled toggles per item, oldest first
    unsettled: BTreeMap<usize, Vec<(u64, Milestone)>>,
    last_error: Option<String>,
    failures: u64,
}

impl Reconciler {
    pub fn new(config: ReconcilerConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn has_synced_once(&self) -> bool {
        matches!(self.state, SyncState::Synced(_))
    }

    pub fn entity_id(&self) -> Option<&EntityId> {
        match &self.state {
            SyncState::Synced(id) => Some(id),
            SyncState::Uninitialized => None,
        }
    }

    pub fn checklist(&self) -> &Checklist {
        &self.current
    }

    pub fn items(&self) -> &[Milestone] {
        self.current.items()
    }

    pub fn progress(&self) -> u8 {
        self.current.progress()
    }

    /// True while any save for the current entity is outstanding
    pub fn is_saving(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Message of the most recent failed save, until dismissed
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Number of failed saves so far; never reset, so two failures with the
    /// same message still differ
    pub fn failure_count(&self) -> u64 {
        self.failures
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// Observe an entity as delivered by the surrounding view.
    ///
    /// Loads its list only when the entity id differs from the one already
    /// loaded. Re-deliveries of the same entity (background refetches, server
    /// echoes) leave items and progress untouched.
    pub fn initialize(&mut self, record: &EntityRecord) -> Observation {
        if !self.state.needs_load(&record.id) {
            log::debug!("entity {} already synced, keeping local items", record.id);
            return Observation::Ignored;
        }

        let observation = match self.state {
            SyncState::Uninitialized => Observation::Initialized,
            SyncState::Synced(_) => Observation::Switched,
        };

        let checklist = Checklist::new(normalize_field(record.field(&self.config.items_field)));
        log::debug!(
            "loaded {} items for {} {} ({}%)",
            checklist.len(),
            self.config.entity_type,
            record.id,
            checklist.progress()
        );

        self.confirmed = checklist.clone();
        self.current = checklist;
        self.state = SyncState::Synced(record.id.clone());
        self.epoch += 1;
        self.in_flight.clear();
        self.unsettled.clear();
        self.last_error = None;
        observation
    }

    /// Set `items[index].completed` locally and return the save to persist.
    ///
    /// Items and progress change together. An out-of-range index panics in
    /// debug builds and is reported as an error otherwise.
    pub fn toggle_item(
        &mut self,
        index: usize,
        completed: bool,
        now: DateTime<Utc>,
    ) -> Result<PendingSave, ReconcileError> {
        let entity_id = match &self.state {
            SyncState::Synced(id) => id.clone(),
            SyncState::Uninitialized => return Err(ReconcileError::NotInitialized),
        };

        let len = self.current.len();
        debug_assert!(index < len, "toggle_item index {} out of range for {} items", index, len);
        if index >= len {
            return Err(ReconcileError::IndexOutOfRange { index, len });
        }

        let after = self.current.items()[index].clone().with_completion(completed, now);
        self.current = self.current.with_item(index, after.clone());

        self.next_seq += 1;
        let seq = self.next_seq;
        self.in_flight.insert(seq);
        self.unsettled.entry(index).or_default().push((seq, after.clone()));

        Ok(PendingSave {
            entity_id,
            epoch: self.epoch,
            seq,
            index,
            after,
            snapshot: self.current.clone(),
        })
    }

    /// `toggle_item` stamped with the current time
    pub fn toggle_item_now(&mut self, index: usize, completed: bool) -> Result<PendingSave, ReconcileError> {
        self.toggle_item(index, completed, Utc::now())
    }

    /// Whether a save still belongs to the entity on display
    pub fn owns(&self, save: &PendingSave) -> bool {
        save.epoch == self.epoch && self.entity_id() == Some(&save.entity_id)
    }

    /// Apply the outcome of persisting `save`.
    ///
    /// Success changes nothing visible. Failure reverts according to the
    /// configured [`RevertPolicy`] and records the error for display.
    pub fn settle(&mut self, save: &PendingSave, outcome: Result<(), StoreError>) -> SettleOutcome {
        if !self.owns(save) {
            log::debug!("discarding save #{} for {}, entity no longer shown", save.seq, save.entity_id);
            return SettleOutcome::Discarded;
        }

        self.in_flight.remove(&save.seq);
        self.forget_unsettled(save);

        match outcome {
            Ok(()) => {
                if save.index < self.confirmed.len() {
                    self.confirmed = self.confirmed.with_item(save.index, save.after.clone());
                }
                SettleOutcome::Confirmed
            }
            Err(err) => {
                log::warn!(
                    "saving {} {} failed, reverting ({:?}): {}",
                    self.config.entity_type,
                    save.entity_id,
                    self.config.revert_policy,
                    err
                );
                match self.config.revert_policy {
                    RevertPolicy::SingleMutation => {
                        if let Some(fallback) = self.fallback_for(save.index) {
                            self.current = self.current.with_item(save.index, fallback);
                        }
                    }
                    RevertPolicy::LastConfirmed => {
                        self.current = self.confirmed.clone();
                        self.unsettled.clear();
                    }
                }
                self.last_error = Some(err.to_string());
                self.failures += 1;
                SettleOutcome::Reverted
            }
        }
    }

    fn forget_unsettled(&mut self, save: &PendingSave) {
        if let Some(stack) = self.unsettled.get_mut(&save.index) {
            stack.retain(|(seq, _)| *seq != save.seq);
            if stack.is_empty() {
                self.unsettled.remove(&save.index);
            }
        }
    }

    /// Value item `index` shows once a failed toggle is dropped: the newest
    /// toggle still unsettled, else the last confirmed value
    fn fallback_for(&self, index: usize) -> Option<Milestone> {
        self.unsettled
            .get(&index)
            .and_then(|stack| stack.last())
            .map(|(_, item)| item.clone())
            .or_else(|| self.confirmed.items().get(index).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn goal(id: &str, milestones: Value) -> EntityRecord {
        let mut fields = Map::new();
        fields.insert("title".to_string(), json!("Feel rested"));
        fields.insert("milestones".to_string(), milestones);
        EntityRecord::new(id, fields)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap()
    }

    fn walk_and_journal() -> EntityRecord {
        goal(
            "g1",
            json!([{"title": "Walk", "completed": false}, {"title": "Journal", "completed": false}]),
        )
    }

    fn network_down() -> Result<(), StoreError> {
        Err(StoreError::Network("offline".to_string()))
    }

    #[test]
    fn test_initial_observation_loads_items() {
        let mut rec = Reconciler::new(ReconcilerConfig::goals());
        assert_eq!(rec.state(), &SyncState::Uninitialized);
        assert!(!rec.has_synced_once());

        assert_eq!(rec.initialize(&walk_and_journal()), Observation::Initialized);
        assert!(rec.has_synced_once());
        assert_eq!(rec.entity_id(), Some(&EntityId::new("g1")));
        assert_eq!(rec.items().len(), 2);
        assert_eq!(rec.progress(), 0);
    }

    #[test]
    fn test_toggle_then_failed_save_reverts() {
        let mut rec = Reconciler::new(ReconcilerConfig::goals());
        rec.initialize(&walk_and_journal());

        let save = rec.toggle_item(0, true, now()).unwrap();
        assert!(rec.items()[0].completed);
        assert_eq!(rec.items()[0].completed_date, Some(now()));
        assert_eq!(rec.progress(), 50);
        assert!(rec.is_saving());
        assert_eq!(save.progress(), 50);

        assert_eq!(rec.settle(&save, network_down()), SettleOutcome::Reverted);
        assert!(!rec.items()[0].completed);
        assert_eq!(rec.items()[0].completed_date, None);
        assert_eq!(rec.progress(), 0);
        assert!(!rec.is_saving());
        assert_eq!(rec.last_error(), Some("network error: offline"));

        rec.dismiss_error();
        assert_eq!(rec.last_error(), None);
    }

    #[test]
    fn test_successful_save_keeps_local_state() {
        let mut rec = Reconciler::new(ReconcilerConfig::goals());
        rec.initialize(&walk_and_journal());
        let save = rec.toggle_item(1, true, now()).unwrap();
        let local = rec.checklist().clone();

        assert_eq!(rec.settle(&save, Ok(())), SettleOutcome::Confirmed);
        assert_eq!(rec.checklist(), &local);
        assert!(!rec.is_saving());
    }

    #[test]
    fn test_refetch_of_same_entity_is_ignored() {
        let mut rec = Reconciler::new(ReconcilerConfig::goals());
        rec.initialize(&walk_and_journal());
        rec.toggle_item(0, true, now()).unwrap();
        let local = rec.checklist().clone();

        // stale server copy of the same goal
        assert_eq!(rec.initialize(&walk_and_journal()), Observation::Ignored);
        assert_eq!(rec.checklist(), &local);
        assert!(rec.is_saving());
    }

    #[test]
    fn test_switching_entity_replaces_items() {
        let mut rec = Reconciler::new(ReconcilerConfig::goals());
        rec.initialize(&walk_and_journal());
        rec.toggle_item(0, true, now()).unwrap();

        let other = goal("g2", json!(["Stretch", {"title": "Hydrate", "completed": true}, "Read"]));
        assert_eq!(rec.initialize(&other), Observation::Switched);
        assert_eq!(rec.entity_id(), Some(&EntityId::new("g2")));
        assert_eq!(rec.items().len(), 3);
        assert_eq!(rec.progress(), 33);
        assert!(!rec.is_saving());
    }

    #[test]
    fn test_response_for_previous_entity_is_discarded() {
        let mut rec = Reconciler::new(ReconcilerConfig::goals());
        rec.initialize(&walk_and_journal());
        let save = rec.toggle_item(0, true, now()).unwrap();

        rec.initialize(&goal("g2", json!([{"title": "Stretch", "completed": true}])));
        let shown = rec.checklist().clone();

        assert_eq!(rec.settle(&save, network_down()), SettleOutcome::Discarded);
        assert_eq!(rec.checklist(), &shown);
        assert_eq!(rec.last_error(), None);
        assert_eq!(rec.settle(&save, Ok(())), SettleOutcome::Discarded);
        assert_eq!(rec.checklist(), &shown);
    }

    #[test]
    fn test_returning_to_entity_discards_first_visit_saves() {
        let mut rec = Reconciler::new(ReconcilerConfig::goals());
        rec.initialize(&walk_and_journal());
        let save = rec.toggle_item(0, true, now()).unwrap();

        rec.initialize(&goal("g2", json!([])));
        rec.initialize(&walk_and_journal());
        let shown = rec.checklist().clone();

        assert_eq!(rec.settle(&save, network_down()), SettleOutcome::Discarded);
        assert_eq!(rec.checklist(), &shown);
    }

    #[test]
    fn test_single_mutation_revert_leaves_other_toggles() {
        let mut rec = Reconciler::new(ReconcilerConfig::goals());
        rec.initialize(&walk_and_journal());
        let first = rec.toggle_item(0, true, now()).unwrap();
        let second = rec.toggle_item(1, true, now()).unwrap();
        assert_eq!(rec.progress(), 100);

        assert_eq!(rec.settle(&first, network_down()), SettleOutcome::Reverted);
        assert!(!rec.items()[0].completed);
        assert!(rec.items()[1].completed);
        assert_eq!(rec.progress(), 50);
        assert!(rec.is_saving());

        assert_eq!(rec.settle(&second, Ok(())), SettleOutcome::Confirmed);
        assert!(!rec.is_saving());
    }

    #[test]
    fn test_newer_toggle_of_same_item_wins_over_failed_older_one() {
        let mut rec = Reconciler::new(ReconcilerConfig::goals());
        rec.initialize(&walk_and_journal());
        let check = rec.toggle_item(0, true, now()).unwrap();
        let uncheck = rec.toggle_item(0, false, now()).unwrap();

        assert_eq!(rec.settle(&check, network_down()), SettleOutcome::Reverted);
        assert!(!rec.items()[0].completed);
        assert_eq!(rec.settle(&uncheck, Ok(())), SettleOutcome::Confirmed);
        assert!(!rec.items()[0].completed);
    }

    #[test]
    fn test_both_toggles_of_item_fail_newest_settles_first() {
        let mut rec = Reconciler::new(ReconcilerConfig::goals());
        rec.initialize(&goal("g1", json!([{"title": "Walk", "completed": false}])));
        let check = rec.toggle_item(0, true, now()).unwrap();
        let uncheck = rec.toggle_item(0, false, now()).unwrap();

        assert_eq!(rec.settle(&uncheck, network_down()), SettleOutcome::Reverted);
        // the check is still on its way, so it is what the item shows
        assert!(rec.items()[0].completed);
        assert_eq!(rec.progress(), 100);

        assert_eq!(rec.settle(&check, network_down()), SettleOutcome::Reverted);
        assert!(!rec.items()[0].completed);
        assert_eq!(rec.items()[0].completed_date, None);
        assert_eq!(rec.progress(), 0);
        assert!(!rec.is_saving());
    }

    #[test]
    fn test_both_toggles_of_item_fail_oldest_settles_first() {
        let mut rec = Reconciler::new(ReconcilerConfig::goals());
        rec.initialize(&goal("g1", json!([{"title": "Walk", "completed": false}])));
        let check = rec.toggle_item(0, true, now()).unwrap();
        let uncheck = rec.toggle_item(0, false, now()).unwrap();

        assert_eq!(rec.settle(&check, network_down()), SettleOutcome::Reverted);
        assert!(!rec.items()[0].completed);
        assert_eq!(rec.failure_count(), 1);

        assert_eq!(rec.settle(&uncheck, network_down()), SettleOutcome::Reverted);
        assert!(!rec.items()[0].completed);
        assert_eq!(rec.progress(), 0);
        // same message twice, still two distinct failures
        assert_eq!(rec.last_error(), Some("network error: offline"));
        assert_eq!(rec.failure_count(), 2);
    }

    #[test]
    fn test_failure_falls_back_to_confirmed_toggle() {
        let mut rec = Reconciler::new(ReconcilerConfig::goals());
        rec.initialize(&walk_and_journal());
        let check = rec.toggle_item(0, true, now()).unwrap();
        let uncheck = rec.toggle_item(0, false, now()).unwrap();

        assert_eq!(rec.settle(&check, Ok(())), SettleOutcome::Confirmed);
        assert_eq!(rec.settle(&uncheck, network_down()), SettleOutcome::Reverted);
        // the store holds the confirmed check
        assert!(rec.items()[0].completed);
        assert_eq!(rec.items()[0].completed_date, Some(now()));
        assert_eq!(rec.progress(), 50);
    }

    #[test]
    fn test_last_confirmed_policy_restores_store_state() {
        let config = ReconcilerConfig::goals().with_revert_policy(RevertPolicy::LastConfirmed);
        let mut rec = Reconciler::new(config);
        rec.initialize(&walk_and_journal());

        let first = rec.toggle_item(0, true, now()).unwrap();
        rec.settle(&first, Ok(()));
        let second = rec.toggle_item(1, true, now()).unwrap();
        let third = rec.toggle_item(0, false, now()).unwrap();

        assert_eq!(rec.settle(&third, network_down()), SettleOutcome::Reverted);
        // back to the confirmed state: item 0 done, item 1 open
        assert!(rec.items()[0].completed);
        assert!(!rec.items()[1].completed);
        assert_eq!(rec.progress(), 50);

        assert_eq!(rec.settle(&second, Ok(())), SettleOutcome::Confirmed);
    }

    #[test]
    fn test_toggle_before_initialize_is_an_error() {
        let mut rec = Reconciler::new(ReconcilerConfig::goals());
        assert_eq!(rec.toggle_item(0, true, now()).unwrap_err(), ReconcileError::NotInitialized);
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "out of range"))]
    fn test_out_of_range_toggle() {
        let mut rec = Reconciler::new(ReconcilerConfig::goals());
        rec.initialize(&walk_and_journal());
        let err = rec.toggle_item(5, true, now()).unwrap_err();
        assert_eq!(err, ReconcileError::IndexOutOfRange { index: 5, len: 2 });
    }

    #[test]
    fn test_patch_uses_configured_fields() {
        let mut rec = Reconciler::new(ReconcilerConfig::goals());
        rec.initialize(&goal("g1", json!(["Walk"])));
        let save = rec.toggle_item(0, true, now()).unwrap();

        let patch = save.patch(rec.config());
        assert_eq!(patch["progress"], json!(100));
        assert_eq!(patch["milestones"][0]["title"], json!("Walk"));
        assert_eq!(patch["milestones"][0]["completed"], json!(true));
        assert_eq!(patch["milestones"][0]["completed_date"], json!("2024-04-02T09:00:00Z"));
    }
}
