use crate::error::EditorError;
use crate::reorder::{self, ReorderError};
use crate::store::PageStore;
use crate::types::PageRecord;

/// Pointer-drag gesture over the page grid.
///
/// Each `over` commits a new local order so the grid follows the pointer;
/// only `finish` hands the final order back for persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        origin: usize,
        current: usize,
        snapshot: Vec<PageRecord>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragOutcome {
    pub origin: usize,
    pub destination: usize,
    pub changed: bool,
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    pub fn begin(&mut self, index: usize, store: &PageStore) -> Result<(), EditorError> {
        if self.is_dragging() {
            return Err(EditorError::DragInProgress);
        }
        if index >= store.len() {
            return Err(ReorderError::IndexOutOfRange {
                index,
                len: store.len(),
            }
            .into());
        }
        *self = DragState::Dragging {
            origin: index,
            current: index,
            snapshot: store.snapshot(),
        };
        Ok(())
    }

    /// Moves the dragged page onto `index`. Returns whether the order changed.
    pub fn over(&mut self, index: usize, store: &mut PageStore) -> Result<bool, EditorError> {
        match self {
            DragState::Idle => Err(EditorError::NotDragging),
            DragState::Dragging { current, .. } => {
                let changed = store.splice_move(*current, index)?;
                *current = index;
                Ok(changed)
            }
        }
    }

    pub fn finish(&mut self, store: &PageStore) -> Result<DragOutcome, EditorError> {
        match std::mem::take(self) {
            DragState::Idle => Err(EditorError::NotDragging),
            DragState::Dragging {
                origin,
                current,
                snapshot,
            } => Ok(DragOutcome {
                origin,
                destination: current,
                changed: store.pages() != snapshot.as_slice(),
            }),
        }
    }

    /// Pages appended while a gesture is running are kept if it is cancelled.
    pub fn append(&mut self, created: &[PageRecord]) {
        if let DragState::Dragging { snapshot, .. } = self {
            *snapshot = reorder::append_records(snapshot, created);
        }
    }

    /// Abandons the gesture and puts back the order captured at `begin`.
    pub fn cancel(&mut self, store: &mut PageStore) -> Result<(), EditorError> {
        match std::mem::take(self) {
            DragState::Idle => Err(EditorError::NotDragging),
            DragState::Dragging { snapshot, .. } => {
                store.restore(snapshot);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> PageStore {
        PageStore::from_remote(
            ["A", "B", "C", "D"]
                .iter()
                .enumerate()
                .map(|(i, id)| PageRecord::new(*id, i as u32 + 1, format!("{}.jpg", id)))
                .collect(),
        )
    }

    fn ids(store: &PageStore) -> Vec<&str> {
        store.ids().map(|id| id.as_str()).collect()
    }

    #[test]
    fn each_pointer_step_commits_a_new_order() {
        let mut store = store();
        let mut drag = DragState::default();
        drag.begin(3, &store).unwrap();
        assert!(drag.over(2, &mut store).unwrap());
        assert_eq!(ids(&store), vec!["A", "B", "D", "C"]);
        assert!(drag.over(0, &mut store).unwrap());
        assert_eq!(ids(&store), vec!["D", "A", "B", "C"]);

        let outcome = drag.finish(&store).unwrap();
        assert_eq!(
            outcome,
            DragOutcome {
                origin: 3,
                destination: 0,
                changed: true
            }
        );
        assert!(!drag.is_dragging());
    }

    #[test]
    fn returning_to_origin_reports_unchanged() {
        let mut store = store();
        let mut drag = DragState::default();
        drag.begin(1, &store).unwrap();
        drag.over(3, &mut store).unwrap();
        drag.over(1, &mut store).unwrap();
        assert!(!drag.finish(&store).unwrap().changed);
    }

    #[test]
    fn cancel_restores_original_order() {
        let mut store = store();
        let mut drag = DragState::default();
        drag.begin(0, &store).unwrap();
        drag.over(3, &mut store).unwrap();
        drag.cancel(&mut store).unwrap();
        assert_eq!(ids(&store), vec!["A", "B", "C", "D"]);
        assert!(matches!(drag.cancel(&mut store), Err(EditorError::NotDragging)));
    }

    #[test]
    fn cancel_keeps_pages_appended_mid_gesture() {
        let mut store = store();
        let mut drag = DragState::default();
        drag.begin(0, &store).unwrap();
        drag.over(2, &mut store).unwrap();
        let created = vec![PageRecord::new("E", 1, "E.jpg")];
        store.append(&created);
        drag.append(&created);
        drag.cancel(&mut store).unwrap();
        assert_eq!(ids(&store), vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn nested_begin_and_stray_events_are_rejected() {
        let mut store = store();
        let mut drag = DragState::default();
        assert!(matches!(drag.over(1, &mut store), Err(EditorError::NotDragging)));
        assert!(matches!(drag.begin(9, &store), Err(EditorError::Reorder(_))));
        drag.begin(0, &store).unwrap();
        assert!(matches!(drag.begin(1, &store), Err(EditorError::DragInProgress)));
    }
}
