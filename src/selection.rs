use std::collections::HashSet;

use crate::types::PageId;

/// Pages currently marked for a batch operation. Callers pass the live page
/// ids in so the set never holds an id the collection no longer has.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    selected: HashSet<PageId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips a single page. Ids absent from `live` are ignored; returns whether
    /// the page is selected afterwards.
    pub fn toggle<'a>(&mut self, id: &PageId, live: impl IntoIterator<Item = &'a PageId>) -> bool {
        if !live.into_iter().any(|candidate| candidate == id) {
            return false;
        }
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    /// Selects every live page, or clears the selection when every live page
    /// is already selected.
    pub fn select_all<'a>(&mut self, live: impl IntoIterator<Item = &'a PageId>) {
        let live: HashSet<PageId> = live.into_iter().cloned().collect();
        if !live.is_empty() && live.iter().all(|id| self.selected.contains(id)) {
            self.selected.clear();
        } else {
            self.selected = live;
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Drops any id that is no longer part of the collection.
    pub fn retain_existing<'a>(&mut self, live: impl IntoIterator<Item = &'a PageId>) {
        let live: HashSet<&PageId> = live.into_iter().collect();
        self.selected.retain(|id| live.contains(id));
    }

    pub fn is_selected(&self, id: &PageId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> &HashSet<PageId> {
        &self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live(ids: &[&str]) -> Vec<PageId> {
        ids.iter().map(|id| PageId::from(*id)).collect()
    }

    #[test]
    fn select_all_twice_returns_to_empty() {
        let pages = live(&["A", "B", "C"]);
        let mut selection = SelectionSet::new();
        selection.select_all(&pages);
        assert_eq!(selection.len(), 3);
        selection.select_all(&pages);
        assert!(selection.is_empty());
    }

    #[test]
    fn select_all_from_partial_selects_everything() {
        let pages = live(&["A", "B", "C"]);
        let mut selection = SelectionSet::new();
        selection.toggle(&pages[0], &pages);
        selection.select_all(&pages);
        assert_eq!(selection.len(), 3);
    }

    #[test]
    fn select_all_on_empty_collection_stays_empty() {
        let mut selection = SelectionSet::new();
        selection.select_all(&Vec::<PageId>::new());
        assert!(selection.is_empty());
    }

    #[test]
    fn toggle_ignores_unknown_ids() {
        let pages = live(&["A"]);
        let mut selection = SelectionSet::new();
        assert!(!selection.toggle(&PageId::from("Z"), &pages));
        assert!(selection.is_empty());
        assert!(selection.toggle(&pages[0], &pages));
        assert!(!selection.toggle(&pages[0], &pages));
        assert!(selection.is_empty());
    }

    #[test]
    fn retain_existing_prunes_removed_pages() {
        let pages = live(&["A", "B", "C"]);
        let mut selection = SelectionSet::new();
        selection.select_all(&pages);
        selection.retain_existing(&live(&["B"]));
        assert_eq!(selection.len(), 1);
        assert!(selection.is_selected(&PageId::from("B")));
    }
}
