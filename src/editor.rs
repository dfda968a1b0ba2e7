use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::runtime::Handle;

use crate::drag::DragState;
use crate::error::EditorError;
use crate::notice::{Notice, NoticeKind, NoticeSink};
use crate::remote::PageService;
#[cfg(feature = "pages-http")]
use crate::remote::HttpPageService;
use crate::selection::SelectionSet;
use crate::settings::DEFAULT_UPLOAD_BATCH_LIMIT;
#[cfg(feature = "pages-http")]
use crate::settings::EditorSettings;
use crate::store::PageStore;
use crate::sync::{current_runtime, SyncCoordinator, SyncHandle};
use crate::types::{ChapterId, Direction, PageFile, PageId, PageRecord};
use crate::upload::{UploadGateway, UploadHandle};

/// A removal waiting for the user to confirm it. Nothing changes until it is
/// passed to [`ChapterEditor::confirm_removal`]; dropping it cancels.
#[derive(Debug)]
pub struct PendingRemoval {
    ids: HashSet<PageId>,
}

impl PendingRemoval {
    pub fn ids(&self) -> &HashSet<PageId> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn cancel(self) {}
}

/// Editing session for the pages of one chapter.
///
/// Local changes are applied immediately. Every change to order or membership
/// then persists the whole reindexed order and hands back a [`SyncHandle`];
/// the next change does not have to wait for it. Remote failures become
/// notices and are never rolled back locally, so the local order can differ
/// from the stored one until the next [`refresh`](Self::refresh).
///
/// Methods that dispatch remote work must be called from within a tokio
/// runtime; without one they fail with [`EditorError::NoRuntime`] before
/// touching local state.
pub struct ChapterEditor {
    chapter_id: ChapterId,
    service: Arc<dyn PageService>,
    notices: Arc<dyn NoticeSink>,
    store: PageStore,
    selection: SelectionSet,
    drag: DragState,
    sync: SyncCoordinator,
    uploads: UploadGateway,
}

impl ChapterEditor {
    pub fn new(
        chapter_id: impl Into<ChapterId>,
        service: Arc<dyn PageService>,
        notices: Arc<dyn NoticeSink>,
    ) -> Self {
        let chapter_id = chapter_id.into();
        Self {
            sync: SyncCoordinator::new(chapter_id.clone(), service.clone(), notices.clone()),
            uploads: UploadGateway::new(
                chapter_id.clone(),
                service.clone(),
                DEFAULT_UPLOAD_BATCH_LIMIT,
            ),
            chapter_id,
            service,
            notices,
            store: PageStore::new(),
            selection: SelectionSet::new(),
            drag: DragState::default(),
        }
    }

    #[cfg(feature = "pages-http")]
    pub fn from_settings(
        chapter_id: impl Into<ChapterId>,
        settings: &EditorSettings,
        notices: Arc<dyn NoticeSink>,
    ) -> Self {
        let settings = settings.clone().normalize();
        let service: Arc<dyn PageService> = Arc::new(HttpPageService::from_settings(&settings));
        Self::new(chapter_id, service, notices).with_upload_limit(settings.upload_batch_limit)
    }

    pub fn with_upload_limit(mut self, limit: usize) -> Self {
        let limit = if limit == 0 {
            DEFAULT_UPLOAD_BATCH_LIMIT
        } else {
            limit
        };
        self.uploads = UploadGateway::new(self.chapter_id.clone(), self.service.clone(), limit);
        self
    }

    pub fn chapter_id(&self) -> &str {
        &self.chapter_id
    }

    pub fn pages(&self) -> &[PageRecord] {
        self.store.pages()
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Selected pages in their current order.
    pub fn selected_pages(&self) -> Vec<PageRecord> {
        self.store
            .pages()
            .iter()
            .filter(|record| self.selection.is_selected(&record.id))
            .cloned()
            .collect()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Reloads the chapter from the remote store. The selection is always
    /// cleared and any drag in progress is dropped.
    pub async fn refresh(&mut self) -> Result<(), EditorError> {
        let service = self.service.clone();
        let chapter_id = self.chapter_id.clone();
        let fetched = current_runtime()?
            .spawn_blocking(move || service.fetch_pages(&chapter_id))
            .await;

        match fetched {
            Ok(Ok(records)) => {
                info!(target: "chapter_pages::editor", "loaded {} pages for chapter {}", records.len(), self.chapter_id);
                self.store = PageStore::from_remote(records);
                self.selection.clear();
                self.drag = DragState::Idle;
                Ok(())
            }
            Ok(Err(err)) => {
                self.fetch_failed(&err);
                Err(EditorError::Fetch(err))
            }
            Err(err) => {
                self.fetch_failed(&err);
                Err(EditorError::Join(err))
            }
        }
    }

    fn fetch_failed(&self, err: &dyn std::fmt::Display) {
        warn!(target: "chapter_pages::editor", "loading chapter {} failed: {}", self.chapter_id, err);
        self.notices.notify(Notice::new(
            NoticeKind::FetchFailed,
            format!("页面加载失败: {}", err),
        ));
    }

    pub fn toggle_selected(&mut self, id: &PageId) -> bool {
        self.selection.toggle(id, self.store.ids())
    }

    pub fn toggle_select_all(&mut self) {
        self.selection.select_all(self.store.ids());
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Moves one page a single step. Boundary moves change nothing and
    /// persist nothing.
    pub fn move_adjacent(
        &mut self,
        index: usize,
        direction: Direction,
    ) -> Result<Option<SyncHandle>, EditorError> {
        self.ensure_idle()?;
        let runtime = current_runtime()?;
        let changed = self.store.move_adjacent(index, direction)?;
        Ok(self.persist_if(&runtime, changed))
    }

    pub fn move_page(&mut self, id: &PageId, to: usize) -> Result<Option<SyncHandle>, EditorError> {
        self.ensure_idle()?;
        let runtime = current_runtime()?;
        let from = self
            .store
            .index_of(id)
            .ok_or_else(|| EditorError::UnknownPage(id.clone()))?;
        let changed = self.store.splice_move(from, to)?;
        Ok(self.persist_if(&runtime, changed))
    }

    pub fn begin_drag(&mut self, index: usize) -> Result<(), EditorError> {
        self.drag.begin(index, &self.store)
    }

    /// Pointer moved over `index`; the local order follows immediately.
    pub fn drag_over(&mut self, index: usize) -> Result<bool, EditorError> {
        self.drag.over(index, &mut self.store)
    }

    /// Ends the gesture and persists the final order if it differs from the
    /// order at `begin_drag`.
    pub fn end_drag(&mut self) -> Result<Option<SyncHandle>, EditorError> {
        if !self.drag.is_dragging() {
            return Err(EditorError::NotDragging);
        }
        let runtime = current_runtime()?;
        let outcome = self.drag.finish(&self.store)?;
        debug!(target: "chapter_pages::editor", "drag in chapter {} ended: {} -> {}, changed: {}", self.chapter_id, outcome.origin, outcome.destination, outcome.changed);
        Ok(self.persist_if(&runtime, outcome.changed))
    }

    pub fn cancel_drag(&mut self) -> Result<(), EditorError> {
        self.drag.cancel(&mut self.store)
    }

    pub fn prepare_remove(&self, id: &PageId) -> Result<PendingRemoval, EditorError> {
        if !self.store.contains(id) {
            return Err(EditorError::UnknownPage(id.clone()));
        }
        Ok(PendingRemoval {
            ids: HashSet::from([id.clone()]),
        })
    }

    pub fn prepare_remove_selected(&self) -> Result<PendingRemoval, EditorError> {
        if self.selection.is_empty() {
            return Err(EditorError::NothingSelected);
        }
        Ok(PendingRemoval {
            ids: self.selection.ids().clone(),
        })
    }

    /// Applies a confirmed removal: the order without those pages is
    /// reindexed and persisted. There is no separate delete call, and the
    /// `Removed` notice is only sent once the store accepts the new order.
    pub fn confirm_removal(&mut self, pending: PendingRemoval) -> Result<SyncHandle, EditorError> {
        self.ensure_idle()?;
        if pending.ids.iter().any(|id| !self.store.contains(id)) {
            return Err(EditorError::StaleRemoval);
        }
        let runtime = current_runtime()?;

        let removed = self.store.remove(&pending.ids);
        self.selection.retain_existing(self.store.ids());
        Ok(self.sync.persist_with_notice(
            &runtime,
            self.store.pages(),
            Some(Notice::new(NoticeKind::Removed, format!("已删除 {} 页", removed))),
        ))
    }

    /// Validates and dispatches an upload. Rejected batches leave the
    /// collection untouched and never reach the service.
    pub fn start_upload(&self, files: Vec<PageFile>) -> Result<UploadHandle, EditorError> {
        self.uploads.start(files).map_err(|err| {
            self.notices
                .notify(Notice::new(NoticeKind::UploadRejected, err.to_string()));
            err
        })
    }

    /// Appends the pages created by `handle` at the tail and returns them.
    /// Pages already loaded by a refresh that ran during the upload are
    /// skipped. The appended order is not persisted here; the store already
    /// assigned those positions.
    pub async fn finish_upload(&mut self, handle: UploadHandle) -> Result<Vec<PageRecord>, EditorError> {
        match handle.created().await {
            Ok(created) => {
                let uploaded = created.len();
                let fresh: Vec<PageRecord> = created
                    .into_iter()
                    .filter(|record| !self.store.contains(&record.id))
                    .collect();
                if fresh.len() < uploaded {
                    debug!(target: "chapter_pages::editor", "{} uploaded pages were already loaded", uploaded - fresh.len());
                }
                if !fresh.is_empty() {
                    self.store.append(&fresh);
                    self.drag.append(&fresh);
                }
                info!(target: "chapter_pages::editor", "appended {} uploaded pages to chapter {}", fresh.len(), self.chapter_id);
                self.notices.notify(Notice::new(
                    NoticeKind::Uploaded,
                    format!("已上传 {} 页", uploaded),
                ));
                let start = self.store.len() - fresh.len();
                Ok(self.store.pages()[start..].to_vec())
            }
            Err(err) => {
                self.notices.notify(Notice::new(
                    NoticeKind::UploadFailed,
                    format!("上传失败: {}", err),
                ));
                Err(err)
            }
        }
    }

    pub async fn upload(&mut self, files: Vec<PageFile>) -> Result<Vec<PageRecord>, EditorError> {
        let handle = self.start_upload(files)?;
        self.finish_upload(handle).await
    }

    fn ensure_idle(&self) -> Result<(), EditorError> {
        if self.drag.is_dragging() {
            return Err(EditorError::DragInProgress);
        }
        Ok(())
    }

    fn persist_if(&self, runtime: &Handle, changed: bool) -> Option<SyncHandle> {
        if changed {
            Some(self.sync.persist(runtime, self.store.pages()))
        } else {
            None
        }
    }
}
