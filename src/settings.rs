use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_UPLOAD_BATCH_LIMIT: usize = 100;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    #[serde(default)]
    pub service_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
    #[serde(default = "default_upload_batch_limit")]
    pub upload_batch_limit: usize,
    /// Left unset, requests use the HTTP client's own defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

fn default_upload_batch_limit() -> usize {
    DEFAULT_UPLOAD_BATCH_LIMIT
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            service_url: String::new(),
            bearer_token: None,
            upload_batch_limit: default_upload_batch_limit(),
            request_timeout_secs: None,
        }
    }
}

impl EditorSettings {
    /// Returns a clone with the bearer token masked for display.
    pub fn masked(&self) -> Self {
        let mut cloned = self.clone();
        if let Some(token) = cloned.bearer_token.as_mut() {
            let prefix: String = token.chars().take(2).collect();
            *token = format!("{}****", prefix);
        }
        cloned
    }

    pub fn normalize(mut self) -> Self {
        self.service_url = self.service_url.trim().to_string();
        if let Some(token) = self.bearer_token.take() {
            let trimmed = token.trim();
            if !trimmed.is_empty() {
                self.bearer_token = Some(trimmed.to_string());
            }
        }
        if self.upload_batch_limit == 0 {
            self.upload_batch_limit = DEFAULT_UPLOAD_BATCH_LIMIT;
        }
        if self.request_timeout_secs == Some(0) {
            self.request_timeout_secs = None;
        }
        self
    }
}

pub fn load_settings(path: &Path) -> Result<EditorSettings, SettingsError> {
    let bytes = fs::read(path)?;
    let settings: EditorSettings = serde_json::from_slice(&bytes)?;
    Ok(settings.normalize())
}

pub fn save_settings(path: &Path, settings: &EditorSettings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn default_settings_path(root: &Path) -> PathBuf {
    root.join("chapter_pages_settings.json")
}
