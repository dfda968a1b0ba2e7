use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::warn;
use natord::compare;
use thiserror::Error;
use tokio::task::JoinHandle;
use walkdir::WalkDir;

use crate::error::{EditorError, ServiceError};
use crate::remote::PageService;
use crate::sync::current_runtime;
use crate::types::{ChapterId, PageFile, PageRecord};

const SUPPORTED_IMAGE_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "webp", "bmp", "tif", "tiff", "gif"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("no image files found in {}", .0.display())]
    EmptyDirectory(PathBuf),
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Rejects a batch that is empty or larger than `limit` before anything is
/// sent.
pub fn validate_batch(files: &[PageFile], limit: usize) -> Result<(), EditorError> {
    if files.is_empty() {
        return Err(EditorError::EmptyBatch);
    }
    if files.len() > limit {
        return Err(EditorError::BatchTooLarge {
            count: files.len(),
            limit,
        });
    }
    Ok(())
}

/// Sends a validated batch to the remote store.
pub struct UploadGateway {
    chapter_id: ChapterId,
    service: Arc<dyn PageService>,
    limit: usize,
}

/// An upload running on the blocking pool.
#[must_use = "an UploadHandle must be finished for the pages to be appended"]
pub struct UploadHandle {
    files: usize,
    task: JoinHandle<Result<Vec<PageRecord>, ServiceError>>,
}

impl UploadHandle {
    pub fn files(&self) -> usize {
        self.files
    }

    pub async fn created(self) -> Result<Vec<PageRecord>, EditorError> {
        self.task.await?.map_err(EditorError::Upload)
    }
}

impl UploadGateway {
    pub fn new(chapter_id: impl Into<ChapterId>, service: Arc<dyn PageService>, limit: usize) -> Self {
        Self {
            chapter_id: chapter_id.into(),
            service,
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn start(&self, files: Vec<PageFile>) -> Result<UploadHandle, EditorError> {
        validate_batch(&files, self.limit)?;
        let runtime = current_runtime()?;

        let chapter_id = self.chapter_id.clone();
        let service = Arc::clone(&self.service);
        let count = files.len();
        let task = runtime.spawn_blocking(move || {
            let result = service.upload_pages(&chapter_id, &files);
            if let Err(err) = &result {
                warn!(target: "chapter_pages::editor", "upload of {} files to chapter {} failed: {}", files.len(), chapter_id, err);
            }
            result
        });

        Ok(UploadHandle { files: count, task })
    }
}

/// Loads every supported image directly inside `directory`, in natural file
/// name order (`2.jpg` before `10.jpg`).
pub fn collect_page_files(directory: &Path) -> Result<Vec<PageFile>, UploadError> {
    if !directory.exists() || !directory.is_dir() {
        return Err(UploadError::DirectoryNotFound(directory.to_path_buf()));
    }

    let mut entries: Vec<(PathBuf, String)> = Vec::new();
    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_supported_image(entry.path()) {
            continue;
        }
        let name = entry
            .file_name()
            .to_str()
            .ok_or_else(|| UploadError::NonUtf8Path(entry.path().to_path_buf()))?
            .to_string();
        entries.push((entry.into_path(), name));
    }

    if entries.is_empty() {
        return Err(UploadError::EmptyDirectory(directory.to_path_buf()));
    }

    entries.sort_by(|a, b| compare(&a.1, &b.1));

    let mut files = Vec::with_capacity(entries.len());
    for (path, name) in entries {
        files.push(PageFile::new(name, fs::read(&path)?));
    }
    Ok(files)
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lower = ext.to_ascii_lowercase();
            SUPPORTED_IMAGE_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MockPageService;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str) {
        let path = dir.join(name);
        let mut file = File::create(path).expect("create file");
        file.write_all(b"test").expect("write file");
    }

    fn files(count: usize) -> Vec<PageFile> {
        (0..count)
            .map(|i| PageFile::new(format!("{:03}.jpg", i), vec![0u8; 4]))
            .collect()
    }

    #[test]
    fn batch_limits_are_enforced() {
        assert!(matches!(validate_batch(&[], 100), Err(EditorError::EmptyBatch)));
        assert!(validate_batch(&files(1), 100).is_ok());
        assert!(validate_batch(&files(100), 100).is_ok());
        assert!(matches!(
            validate_batch(&files(101), 100),
            Err(EditorError::BatchTooLarge { count: 101, limit: 100 })
        ));
    }

    #[tokio::test]
    async fn oversized_batch_never_reaches_the_service() {
        let service = Arc::new(MockPageService::new());
        let gateway = UploadGateway::new("ch-1", service.clone(), 100);
        assert!(gateway.start(files(101)).is_err());
        assert_eq!(service.upload_calls(), 0);

        let created = gateway.start(files(2)).unwrap().created().await.unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(service.upload_calls(), 1);
    }

    #[test]
    fn start_without_runtime_is_an_error() {
        let service = Arc::new(MockPageService::new());
        let gateway = UploadGateway::new("ch-1", service.clone(), 100);
        assert!(matches!(gateway.start(files(1)), Err(EditorError::NoRuntime)));
        assert_eq!(service.upload_calls(), 0);
    }

    #[test]
    fn collect_page_files_uses_natural_order() {
        let temp = TempDir::new().expect("temp dir");
        write_file(temp.path(), "10.jpg");
        write_file(temp.path(), "2.PNG");
        write_file(temp.path(), "1.webp");
        write_file(temp.path(), "notes.txt");
        fs::create_dir_all(temp.path().join("extras")).expect("sub dir");
        write_file(&temp.path().join("extras"), "3.jpg");

        let files = collect_page_files(temp.path()).expect("files");
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["1.webp", "2.PNG", "10.jpg"]);
        assert_eq!(files[0].bytes, b"test");
    }

    #[test]
    fn collect_page_files_reports_missing_and_empty_directories() {
        let temp = TempDir::new().expect("temp dir");
        assert!(matches!(
            collect_page_files(&temp.path().join("missing")),
            Err(UploadError::DirectoryNotFound(_))
        ));
        write_file(temp.path(), "readme.md");
        assert!(matches!(
            collect_page_files(temp.path()),
            Err(UploadError::EmptyDirectory(_))
        ));
    }
}
