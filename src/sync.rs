use std::sync::Arc;

use log::{debug, warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::{EditorError, ServiceError};
use crate::notice::{Notice, NoticeKind, NoticeSink};
use crate::remote::PageService;
use crate::reorder;
use crate::types::{ChapterId, PageRecord};

/// Sends the full page order of one chapter to the remote store.
///
/// There is no retry and no rollback: a failed persist leaves the local order
/// as it is and reports a notice. Persists are not serialized either, so when
/// two are in flight the one that completes last decides the stored order.
#[derive(Clone)]
pub struct SyncCoordinator {
    chapter_id: ChapterId,
    service: Arc<dyn PageService>,
    notices: Arc<dyn NoticeSink>,
}

#[derive(Debug)]
pub enum SyncOutcome {
    Persisted { pages: usize },
    Failed(EditorError),
}

impl SyncOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self, SyncOutcome::Persisted { .. })
    }
}

/// An in-flight persist. Dropping it discards the result; the request itself
/// still runs to completion.
#[must_use = "dropping a SyncHandle discards the persist outcome"]
pub struct SyncHandle {
    pages: usize,
    task: JoinHandle<Result<(), ServiceError>>,
}

impl SyncHandle {
    pub fn pages(&self) -> usize {
        self.pages
    }

    pub async fn outcome(self) -> SyncOutcome {
        match self.task.await {
            Ok(Ok(())) => SyncOutcome::Persisted { pages: self.pages },
            Ok(Err(err)) => SyncOutcome::Failed(EditorError::Sync(err)),
            Err(err) => SyncOutcome::Failed(EditorError::Join(err)),
        }
    }
}

/// Handle of the runtime the caller is on. Checked before any local change so
/// a caller without a runtime gets an error instead of a half-applied edit.
pub fn current_runtime() -> Result<Handle, EditorError> {
    Handle::try_current().map_err(|_| EditorError::NoRuntime)
}

impl SyncCoordinator {
    pub fn new(
        chapter_id: impl Into<ChapterId>,
        service: Arc<dyn PageService>,
        notices: Arc<dyn NoticeSink>,
    ) -> Self {
        Self {
            chapter_id: chapter_id.into(),
            service,
            notices,
        }
    }

    pub fn chapter_id(&self) -> &str {
        &self.chapter_id
    }

    /// Dispatches `order` on the blocking pool of `runtime`.
    pub fn persist(&self, runtime: &Handle, order: &[PageRecord]) -> SyncHandle {
        self.persist_with_notice(runtime, order, None)
    }

    /// Like [`persist`](Self::persist), sending `on_success` once the store
    /// has accepted the order.
    pub fn persist_with_notice(
        &self,
        runtime: &Handle,
        order: &[PageRecord],
        on_success: Option<Notice>,
    ) -> SyncHandle {
        let order = reorder::reindex(order);
        let pages = order.len();
        let chapter_id = self.chapter_id.clone();
        let service = Arc::clone(&self.service);
        let notices = Arc::clone(&self.notices);

        debug!(target: "chapter_pages::sync", "persisting {} pages for chapter {}", pages, chapter_id);
        let task = runtime.spawn_blocking(move || {
            let result = service.persist_order(&chapter_id, &order);
            match &result {
                Ok(()) => {
                    if let Some(notice) = on_success {
                        notices.notify(notice);
                    }
                }
                Err(err) => {
                    warn!(target: "chapter_pages::sync", "persist for chapter {} failed: {}", chapter_id, err);
                    notices.notify(Notice::new(
                        NoticeKind::SyncFailed,
                        format!("页面顺序保存失败: {}", err),
                    ));
                }
            }
            result
        });

        SyncHandle { pages, task }
    }
}
