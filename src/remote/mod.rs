//! The remote store of record for chapter pages.

use crate::error::ServiceError;
use crate::types::{PageFile, PageRecord};

#[cfg(feature = "pages-http")]
mod http;
mod mock;

#[cfg(feature = "pages-http")]
pub use http::HttpPageService;
pub use mock::MockPageService;

/// Blocking calls against the remote store. The editor runs them on tokio's
/// blocking pool, never on the thread handling user input.
pub trait PageService: Send + Sync {
    /// Records in whatever order the store returns them.
    fn fetch_pages(&self, chapter_id: &str) -> Result<Vec<PageRecord>, ServiceError>;

    /// Creates one page per file. The batch either succeeds as a whole or fails.
    fn upload_pages(
        &self,
        chapter_id: &str,
        files: &[PageFile],
    ) -> Result<Vec<PageRecord>, ServiceError>;

    /// Replaces the stored order with `order`, which is always the full
    /// collection with positions `1..=len`.
    fn persist_order(&self, chapter_id: &str, order: &[PageRecord]) -> Result<(), ServiceError>;
}
