use std::collections::HashSet;

use crate::reorder::{self, ReorderError};
use crate::types::{Direction, PageId, PageRecord};

/// Owns the ordered pages of one chapter for an editing session.
///
/// Every method that changes the order leaves positions as `1..=len`, so a
/// snapshot taken at any time is ready to be persisted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageStore {
    pages: Vec<PageRecord>,
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from records as returned by the remote store. They are
    /// sorted by their reported position before being reindexed.
    pub fn from_remote(mut records: Vec<PageRecord>) -> Self {
        records.sort_by_key(|record| record.position);
        Self {
            pages: reorder::reindex(&records),
        }
    }

    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    pub fn snapshot(&self) -> Vec<PageRecord> {
        self.pages.clone()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &PageId> {
        self.pages.iter().map(|record| &record.id)
    }

    pub fn contains(&self, id: &PageId) -> bool {
        self.pages.iter().any(|record| &record.id == id)
    }

    pub fn index_of(&self, id: &PageId) -> Option<usize> {
        self.pages.iter().position(|record| &record.id == id)
    }

    pub fn get(&self, id: &PageId) -> Option<&PageRecord> {
        self.pages.iter().find(|record| &record.id == id)
    }

    /// Returns `true` when the order changed.
    pub fn move_adjacent(&mut self, index: usize, direction: Direction) -> Result<bool, ReorderError> {
        let next = reorder::move_adjacent(&self.pages, index, direction)?;
        Ok(self.commit(next))
    }

    /// Returns `true` when the order changed.
    pub fn splice_move(&mut self, from: usize, to: usize) -> Result<bool, ReorderError> {
        let next = reorder::splice_move(&self.pages, from, to)?;
        Ok(self.commit(next))
    }

    /// Drops the given pages; returns how many were actually removed.
    pub fn remove(&mut self, ids: &HashSet<PageId>) -> usize {
        let before = self.pages.len();
        let next = reorder::remove_ids(&self.pages, ids);
        self.pages = next;
        before - self.pages.len()
    }

    pub fn append(&mut self, created: &[PageRecord]) {
        self.pages = reorder::append_records(&self.pages, created);
    }

    /// Replaces the whole order with a snapshot taken earlier in the session.
    pub(crate) fn restore(&mut self, snapshot: Vec<PageRecord>) {
        self.pages = reorder::reindex(&snapshot);
    }

    fn commit(&mut self, next: Vec<PageRecord>) -> bool {
        let next = reorder::reindex(&next);
        if next == self.pages {
            return false;
        }
        self.pages = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(id: &str, position: u32) -> PageRecord {
        PageRecord::new(id, position, format!("https://cdn.example/{}.jpg", id))
    }

    fn ids(store: &PageStore) -> Vec<&str> {
        store.ids().map(|id| id.as_str()).collect()
    }

    #[test]
    fn remote_records_are_sorted_by_position() {
        let store = PageStore::from_remote(vec![page("C", 30), page("A", 10), page("B", 20)]);
        assert_eq!(ids(&store), vec!["A", "B", "C"]);
        let positions: Vec<u32> = store.pages().iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn boundary_move_reports_no_change() {
        let mut store = PageStore::from_remote(vec![page("A", 1), page("B", 2)]);
        assert!(!store.move_adjacent(0, Direction::Up).unwrap());
        assert!(store.move_adjacent(0, Direction::Down).unwrap());
        assert_eq!(ids(&store), vec!["B", "A"]);
        assert_eq!(store.get(&PageId::from("B")).unwrap().position, 1);
    }

    #[test]
    fn failed_move_leaves_store_untouched() {
        let mut store = PageStore::from_remote(vec![page("A", 1), page("B", 2)]);
        let before = store.clone();
        assert!(store.splice_move(0, 2).is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn remove_and_append_keep_positions_contiguous() {
        let mut store = PageStore::from_remote(vec![page("A", 1), page("B", 2), page("C", 3)]);
        let gone: HashSet<PageId> = [PageId::from("A"), PageId::from("Z")].into_iter().collect();
        assert_eq!(store.remove(&gone), 1);
        store.append(&[page("D", 99)]);
        assert_eq!(ids(&store), vec!["B", "C", "D"]);
        assert!(reorder::is_contiguous(store.pages()));
    }
}
