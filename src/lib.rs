//! Ordered page management for a single chapter: local reordering, selection,
//! removal and upload, with the full order synced to a remote store after
//! every change.

pub mod drag;
pub mod editor;
pub mod error;
pub mod notice;
pub mod remote;
pub mod reorder;
pub mod selection;
pub mod settings;
pub mod store;
pub mod sync;
pub mod types;
pub mod upload;

pub use editor::{ChapterEditor, PendingRemoval};
pub use error::{EditorError, ServiceError};
pub use notice::{Notice, NoticeKind, NoticeLog, NoticeSink, NullSink};
#[cfg(feature = "pages-http")]
pub use remote::HttpPageService;
pub use remote::{MockPageService, PageService};
pub use settings::EditorSettings;
pub use sync::{SyncHandle, SyncOutcome};
pub use types::{ChapterId, Direction, PageFile, PageId, PageRecord};
pub use upload::{collect_page_files, UploadHandle};
