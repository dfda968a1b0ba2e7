use reqwest::StatusCode;
use thiserror::Error;
use tokio::task::JoinError;

use crate::reorder::ReorderError;
use crate::types::PageId;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid service url: {0}")]
    Url(#[from] url::ParseError),
    #[error("unexpected response status: {0}")]
    UnexpectedStatus(StatusCode),
    #[error("service url is empty")]
    InvalidServiceUrl,
    #[error("chapter id is empty")]
    InvalidChapterId,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// Everything the editor can report back to its host.
///
/// `Fetch`, `Upload` and `Sync` wrap remote failures; the remaining variants are
/// local rejections raised before anything is sent.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("failed to load pages: {0}")]
    Fetch(#[source] ServiceError),
    #[error("failed to upload pages: {0}")]
    Upload(#[source] ServiceError),
    #[error("failed to save page order: {0}")]
    Sync(#[source] ServiceError),
    #[error("no files selected for upload")]
    EmptyBatch,
    #[error("too many files: {count} selected, at most {limit} per upload")]
    BatchTooLarge { count: usize, limit: usize },
    #[error(transparent)]
    Reorder(#[from] ReorderError),
    #[error("page not found: {0}")]
    UnknownPage(PageId),
    #[error("a drag gesture is already in progress")]
    DragInProgress,
    #[error("no drag gesture in progress")]
    NotDragging,
    #[error("no pages selected")]
    NothingSelected,
    #[error("pending removal refers to pages that are no longer present")]
    StaleRemoval,
    #[error("no tokio runtime is running on this thread")]
    NoRuntime,
    #[error("task join error: {0}")]
    Join(#[from] JoinError),
}
