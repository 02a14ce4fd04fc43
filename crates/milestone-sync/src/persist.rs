//! Persisting toggles
//!
//! The reconciler itself never awaits. These helpers send a [`PendingSave`]
//! to an [`EntityStore`] and feed the outcome back.

use std::cell::RefCell;

use crate::error::{ReconcileError, StoreError};
use crate::reconciler::{PendingSave, ReconcilerConfig, Reconciler, SettleOutcome};
use crate::store::EntityStore;

/// Write the full item list and progress of `save` to the store
pub async fn persist<S>(store: &S, config: &ReconcilerConfig, save: &PendingSave) -> Result<(), StoreError>
where
    S: EntityStore + ?Sized,
{
    log::debug!(
        "persisting {} {} save #{} ({} items, {}%)",
        config.entity_type,
        save.entity_id(),
        save.seq(),
        save.items().len(),
        save.progress()
    );
    store
        .update(&config.entity_type, save.entity_id(), save.patch(config))
        .await
        .map(|_| ())
}

/// Toggle an item, persist it, then settle.
///
/// The `RefCell` is only borrowed around the synchronous steps, so other
/// toggles and observations can interleave while the write is in flight.
pub async fn toggle_and_persist<S>(
    reconciler: &RefCell<Reconciler>,
    store: &S,
    index: usize,
    completed: bool,
) -> Result<SettleOutcome, ReconcileError>
where
    S: EntityStore + ?Sized,
{
    let (save, config) = {
        let mut rec = reconciler.borrow_mut();
        let save = rec.toggle_item_now(index, completed)?;
        (save, rec.config().clone())
    };
    let outcome = persist(store, &config, &save).await;
    Ok(reconciler.borrow_mut().settle(&save, outcome))
}
