//! Checklist
//!
//! Items and their completion percentage, kept together so the two can
//! never be observed out of step.

use crate::item::Milestone;

/// Completion percentage, `round(100 * completed / total)`, 0 when empty.
///
/// Halves round up, matching how the progress bar has always displayed.
pub fn progress_of(items: &[Milestone]) -> u8 {
    let total = items.len();
    if total == 0 {
        return 0;
    }
    let done = items.iter().filter(|m| m.completed).count();
    ((200 * done + total) / (2 * total)) as u8
}

/// Ordered milestones plus derived progress
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Checklist {
    items: Vec<Milestone>,
    progress: u8,
}

impl Checklist {
    pub fn new(items: Vec<Milestone>) -> Self {
        let progress = progress_of(&items);
        Self { items, progress }
    }

    pub fn items(&self) -> &[Milestone] {
        &self.items
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|m| m.completed).count()
    }

    /// New checklist with `items[index]` replaced; `self` is left untouched.
    ///
    /// Panics if `index` is out of range.
    pub fn with_item(&self, index: usize, item: Milestone) -> Self {
        let mut items = self.items.clone();
        items[index] = item;
        Self::new(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn list(flags: &[bool]) -> Vec<Milestone> {
        flags
            .iter()
            .enumerate()
            .map(|(i, done)| Milestone::new(format!("m{}", i)).with_completion(*done, Utc::now()))
            .collect()
    }

    #[test]
    fn test_empty_progress_is_zero() {
        assert_eq!(progress_of(&[]), 0);
        assert_eq!(Checklist::default().progress(), 0);
    }

    #[test]
    fn test_progress_rounding() {
        assert_eq!(progress_of(&list(&[true, false])), 50);
        assert_eq!(progress_of(&list(&[true, false, false])), 33);
        assert_eq!(progress_of(&list(&[true, true, false])), 67);
        assert_eq!(progress_of(&list(&[true, false, false, false, false, false, false, false])), 13);
        assert_eq!(progress_of(&list(&[true, true])), 100);
    }

    #[test]
    fn test_with_item_recomputes_progress() {
        let before = Checklist::new(list(&[false, false]));
        let after = before.with_item(1, Milestone::new("x").with_completion(true, Utc::now()));
        assert_eq!(before.progress(), 0);
        assert_eq!(after.progress(), 50);
        assert_eq!(after.completed_count(), 1);
        assert!(!before.items()[1].completed);
    }
}
