use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    FetchFailed,
    UploadFailed,
    UploadRejected,
    SyncFailed,
    Uploaded,
    Removed,
}

impl NoticeKind {
    pub fn is_error(self) -> bool {
        matches!(
            self,
            NoticeKind::FetchFailed
                | NoticeKind::UploadFailed
                | NoticeKind::UploadRejected
                | NoticeKind::SyncFailed
        )
    }
}

/// Transient message meant for a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub created_at: i64, // unix ms
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Drops every notice.
pub struct NullSink;

impl NoticeSink for NullSink {
    fn notify(&self, _notice: Notice) {}
}

/// Keeps notices in memory until the host drains them.
#[derive(Debug, Default)]
pub struct NoticeLog {
    inner: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notice> {
        self.inner
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> Vec<Notice> {
        self.inner
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl NoticeSink for NoticeLog {
    fn notify(&self, notice: Notice) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.push(notice);
        }
    }
}
