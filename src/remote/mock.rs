use std::collections::HashMap;
use std::sync::Mutex;

use super::PageService;
use crate::error::ServiceError;
use crate::types::{ChapterId, OrderEntry, PageFile, PageId, PageRecord};

/// An offline store kept in memory. It lets the editor be wired up without a
/// network and records every call so behaviour can be inspected.
#[derive(Default)]
pub struct MockPageService {
    inner: Mutex<MockInner>,
}

#[derive(Default)]
struct MockInner {
    seq: u64,
    chapters: HashMap<ChapterId, Vec<PageRecord>>,
    persisted: Vec<(ChapterId, Vec<OrderEntry>)>,
    upload_calls: usize,
    fail_fetch: bool,
    fail_upload: bool,
    fail_persist: bool,
}

impl MockPageService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a chapter with records exactly as given, including their order
    /// and positions.
    pub fn with_chapter(self, chapter_id: &str, records: Vec<PageRecord>) -> Self {
        if let Ok(mut guard) = self.inner.lock() {
            guard.chapters.insert(chapter_id.to_string(), records);
        }
        self
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.fail_fetch = fail;
        }
    }

    pub fn set_fail_upload(&self, fail: bool) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.fail_upload = fail;
        }
    }

    pub fn set_fail_persist(&self, fail: bool) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.fail_persist = fail;
        }
    }

    /// Every order persisted so far, oldest first.
    pub fn persisted(&self) -> Vec<(ChapterId, Vec<OrderEntry>)> {
        self.inner
            .lock()
            .map(|guard| guard.persisted.clone())
            .unwrap_or_default()
    }

    pub fn upload_calls(&self) -> usize {
        self.inner.lock().map(|guard| guard.upload_calls).unwrap_or(0)
    }

    pub fn stored(&self, chapter_id: &str) -> Vec<PageRecord> {
        self.inner
            .lock()
            .ok()
            .and_then(|guard| guard.chapters.get(chapter_id).cloned())
            .unwrap_or_default()
    }
}

fn poisoned() -> ServiceError {
    ServiceError::Unavailable("mock store poisoned".into())
}

impl PageService for MockPageService {
    fn fetch_pages(&self, chapter_id: &str) -> Result<Vec<PageRecord>, ServiceError> {
        let guard = self.inner.lock().map_err(|_| poisoned())?;
        if guard.fail_fetch {
            return Err(ServiceError::Unavailable("fetch disabled".into()));
        }
        Ok(guard.chapters.get(chapter_id).cloned().unwrap_or_default())
    }

    fn upload_pages(
        &self,
        chapter_id: &str,
        files: &[PageFile],
    ) -> Result<Vec<PageRecord>, ServiceError> {
        let mut guard = self.inner.lock().map_err(|_| poisoned())?;
        guard.upload_calls += 1;
        if guard.fail_upload {
            return Err(ServiceError::Unavailable("upload disabled".into()));
        }

        let start = guard.chapters.get(chapter_id).map(Vec::len).unwrap_or(0) as u32;
        let mut created = Vec::with_capacity(files.len());
        for (offset, file) in files.iter().enumerate() {
            guard.seq += 1;
            let id = PageId::new(format!("page-{}", guard.seq));
            created.push(PageRecord {
                image_url: format!("mock://{}/{}/{}", chapter_id, id, file.name),
                id,
                position: start + offset as u32 + 1,
            });
        }
        guard
            .chapters
            .entry(chapter_id.to_string())
            .or_default()
            .extend(created.iter().cloned());
        Ok(created)
    }

    fn persist_order(&self, chapter_id: &str, order: &[PageRecord]) -> Result<(), ServiceError> {
        let mut guard = self.inner.lock().map_err(|_| poisoned())?;
        if guard.fail_persist {
            return Err(ServiceError::Unavailable("persist disabled".into()));
        }
        guard.persisted.push((
            chapter_id.to_string(),
            order.iter().map(OrderEntry::from).collect(),
        ));
        guard.chapters.insert(chapter_id.to_string(), order.to_vec());
        Ok(())
    }
}
