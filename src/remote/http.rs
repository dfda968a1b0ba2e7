use std::time::Duration;

use log::{debug, info};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use url::Url;

use super::PageService;
use crate::error::ServiceError;
use crate::settings::EditorSettings;
use crate::types::{OrderEntry, PageFile, PageRecord};

/// Talks to the page service over HTTP:
///
/// - `GET  chapters/{id}/pages`
/// - `POST chapters/{id}/pages` (multipart, one `files` part per file)
/// - `PUT  chapters/{id}/pages/order`
#[derive(Debug, Clone)]
pub struct HttpPageService {
    service_url: String,
    bearer_token: Option<String>,
    timeout: Option<Duration>,
}

#[derive(Debug, Serialize)]
struct PersistOrderPayload<'a> {
    pages: &'a [OrderEntry],
}

impl HttpPageService {
    pub fn new(service_url: impl Into<String>, bearer_token: Option<String>) -> Self {
        Self {
            service_url: service_url.into(),
            bearer_token,
            timeout: None,
        }
    }

    pub fn from_settings(settings: &EditorSettings) -> Self {
        Self {
            service_url: settings.service_url.clone(),
            bearer_token: settings.bearer_token.clone(),
            timeout: settings.request_timeout_secs.map(Duration::from_secs),
        }
    }

    // Built per call: the blocking client owns a runtime of its own and must
    // not be created or dropped on an async worker thread.
    fn client(&self) -> Result<Client, ServiceError> {
        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.bearer_token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn endpoint(&self, chapter_id: &str, tail: &[&str]) -> Result<Url, ServiceError> {
        build_pages_endpoint(&self.service_url, chapter_id, tail)
    }
}

fn build_pages_endpoint(base: &str, chapter_id: &str, tail: &[&str]) -> Result<Url, ServiceError> {
    if base.trim().is_empty() {
        return Err(ServiceError::InvalidServiceUrl);
    }
    if chapter_id.trim().is_empty() {
        return Err(ServiceError::InvalidChapterId);
    }

    let mut url = Url::parse(base.trim())?;
    url.path_segments_mut()
        .map_err(|_| ServiceError::InvalidServiceUrl)?
        .pop_if_empty()
        .extend(["chapters", chapter_id, "pages"])
        .extend(tail);
    Ok(url)
}

fn ensure_success(response: Response) -> Result<Response, ServiceError> {
    if !response.status().is_success() {
        return Err(ServiceError::UnexpectedStatus(response.status()));
    }
    Ok(response)
}

impl PageService for HttpPageService {
    fn fetch_pages(&self, chapter_id: &str) -> Result<Vec<PageRecord>, ServiceError> {
        let url = self.endpoint(chapter_id, &[])?;
        let response = self.authorize(self.client()?.get(url)).send()?;
        let records = ensure_success(response)?.json::<Vec<PageRecord>>()?;
        info!(target: "chapter_pages::remote", "fetched {} pages for chapter {}", records.len(), chapter_id);
        Ok(records)
    }

    fn upload_pages(
        &self,
        chapter_id: &str,
        files: &[PageFile],
    ) -> Result<Vec<PageRecord>, ServiceError> {
        let url = self.endpoint(chapter_id, &[])?;
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.name.clone())
                .mime_str(file.mime_type())?;
            form = form.part("files", part);
        }

        let response = self
            .authorize(self.client()?.post(url))
            .multipart(form)
            .send()?;
        let created = ensure_success(response)?.json::<Vec<PageRecord>>()?;
        if created.len() != files.len() {
            return Err(ServiceError::InvalidResponse(format!(
                "uploaded {} files but {} pages were created",
                files.len(),
                created.len()
            )));
        }
        Ok(created)
    }

    fn persist_order(&self, chapter_id: &str, order: &[PageRecord]) -> Result<(), ServiceError> {
        let url = self.endpoint(chapter_id, &["order"])?;
        let entries: Vec<OrderEntry> = order.iter().map(OrderEntry::from).collect();
        debug!(target: "chapter_pages::remote", "PUT {} ({} pages)", url, entries.len());

        let response = self
            .authorize(self.client()?.put(url))
            .json(&PersistOrderPayload { pages: &entries })
            .send()?;
        ensure_success(response)?;
        Ok(())
    }
}
