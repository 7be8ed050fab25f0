//! Remote collaborators: Slides, Drive, and Translation.
//!
//! Tools only see the traits defined here. The reqwest-backed clients live
//! in the submodules; `testing` provides in-memory stand-ins.

mod client;
mod drive;
mod slides;
mod translate;

pub use client::GoogleHttp;
pub use drive::GoogleDriveClient;
pub use slides::GoogleSlidesClient;
pub use translate::GoogleTranslateClient;

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::Deserialize;

use crate::config::Config;
use crate::slides::model::Presentation;
use crate::slides::requests::Request;

/// Failure reported by a remote API (or by the transport reaching it).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", self.describe())]
pub struct ApiError {
    /// HTTP status, absent for transport and decode failures.
    pub status: Option<u16>,
    pub message: String,
    /// Machine-readable reason from the error body (`notFound`, `PERMISSION_DENIED`).
    pub reason: Option<String>,
}

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorClass {
    NotFound,
    Forbidden,
    InvalidParent,
    Other,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}

impl ApiError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Transport or decode failure with no HTTP status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    /// Build from a non-2xx response, pulling message and reason out of a
    /// Google error envelope when the body is one.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => {
                let reason = envelope
                    .error
                    .errors
                    .into_iter()
                    .find_map(|d| d.reason)
                    .or(envelope.error.status);
                let message = if envelope.error.message.is_empty() {
                    body.to_string()
                } else {
                    envelope.error.message
                };
                Self {
                    status: Some(status),
                    message,
                    reason,
                }
            }
            Err(_) => Self::new(Some(status), body.trim()),
        }
    }

    fn describe(&self) -> String {
        match self.status {
            Some(status) => format!("HTTP {}: {}", status, self.message),
            None => self.message.clone(),
        }
    }

    /// Classify by status, then by reason and message signatures.
    pub fn class(&self) -> ApiErrorClass {
        let message = self.message.to_ascii_lowercase();
        let reason = self.reason.as_deref().unwrap_or("").to_ascii_lowercase();

        let parent_problem = message.contains("invalid parent")
            || reason.contains("parentnotfound")
            || reason.contains("invalidparent")
            || (message.contains("parent") && message.contains("not found"));
        if parent_problem {
            return ApiErrorClass::InvalidParent;
        }

        match self.status {
            Some(404) => return ApiErrorClass::NotFound,
            Some(401) | Some(403) => return ApiErrorClass::Forbidden,
            Some(400) | None => {}
            Some(_) => return ApiErrorClass::Other,
        }

        if message.contains("not found")
            || message.contains("could not be found")
            || reason.contains("notfound")
            || reason == "not_found"
        {
            ApiErrorClass::NotFound
        } else if reason.contains("permission_denied")
            || message.contains("permission_denied")
            || message.contains("insufficient permissions")
            || message.contains("forbidden")
            || reason.contains("forbidden")
        {
            ApiErrorClass::Forbidden
        } else {
            ApiErrorClass::Other
        }
    }
}

/// A Drive file as returned by create/copy/upload.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub web_view_link: Option<String>,
}

/// Response of `presentations.batchUpdate`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReply {
    #[serde(default)]
    pub presentation_id: String,
    #[serde(default)]
    pub replies: Vec<serde_json::Value>,
}

impl BatchReply {
    /// Object ID reported by a `createImage` reply at `index`.
    pub fn created_image_id(&self, index: usize) -> Option<&str> {
        self.replies.get(index)?["createImage"]["objectId"].as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct QuotedContent {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentReply {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub author: Option<CommentAuthor>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub author: Option<CommentAuthor>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub quoted_file_content: Option<QuotedContent>,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub modified_time: Option<String>,
    #[serde(default)]
    pub replies: Vec<CommentReply>,
}

/// One page of `comments.list`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Streamed response body. Dropping it releases the connection.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ApiError>> + Send>>;

/// Presentation documents.
#[async_trait]
pub trait SlidesApi: Send + Sync {
    async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation, ApiError>;

    /// Apply requests atomically, in order.
    async fn batch_update(
        &self,
        presentation_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchReply, ApiError>;

    async fn create_presentation(&self, title: &str) -> Result<Presentation, ApiError>;
}

/// File storage.
#[async_trait]
pub trait DriveApi: Send + Sync {
    async fn upload_file(
        &self,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<FileRef, ApiError>;

    /// Grant anyone-with-the-link read access.
    async fn make_public(&self, file_id: &str) -> Result<(), ApiError>;

    async fn copy_file(
        &self,
        source_id: &str,
        name: &str,
        parent_folder_id: Option<&str>,
    ) -> Result<FileRef, ApiError>;

    async fn move_file(&self, file_id: &str, folder_id: &str) -> Result<(), ApiError>;

    async fn export_file(&self, file_id: &str, mime_type: &str) -> Result<ByteStream, ApiError>;

    async fn list_comments(
        &self,
        file_id: &str,
        include_deleted: bool,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<CommentPage, ApiError>;
}

/// Text translation.
#[async_trait]
pub trait TranslateApi: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        target: &str,
        source: Option<&str>,
    ) -> Result<String, ApiError> {
        let mut translated = self
            .translate_batch(&[text.to_string()], target, source)
            .await?;
        translated
            .pop()
            .ok_or_else(|| ApiError::transport("translation response was empty"))
    }

    /// Translate many strings in one call. Output order matches input.
    async fn translate_batch(
        &self,
        texts: &[String],
        target: &str,
        source: Option<&str>,
    ) -> Result<Vec<String>, ApiError>;
}

/// The collaborators a tool may call.
#[derive(Clone)]
pub struct GoogleServices {
    pub slides: Arc<dyn SlidesApi>,
    pub drive: Arc<dyn DriveApi>,
    pub translate: Arc<dyn TranslateApi>,
}

impl GoogleServices {
    /// reqwest-backed clients sharing one connection pool.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let http = GoogleHttp::new(config.oauth_token.clone(), config.http_timeout)?;
        Ok(Self {
            slides: Arc::new(GoogleSlidesClient::new(
                http.clone(),
                &config.slides_api_base_url,
            )),
            drive: Arc::new(GoogleDriveClient::new(
                http.clone(),
                &config.drive_api_base_url,
                &config.drive_upload_base_url,
            )),
            translate: Arc::new(GoogleTranslateClient::new(
                http,
                &config.translate_api_base_url,
                config.translate_api_key.clone(),
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_reads_google_envelope() {
        let body = r#"{"error": {"code": 404, "message": "Requested entity was not found.",
            "status": "NOT_FOUND", "errors": [{"reason": "notFound"}]}}"#;
        let err = ApiError::from_response(404, body);
        assert_eq!(err.status, Some(404));
        assert_eq!(err.message, "Requested entity was not found.");
        assert_eq!(err.reason.as_deref(), Some("notFound"));
        assert_eq!(err.to_string(), "HTTP 404: Requested entity was not found.");
    }

    #[test]
    fn test_from_response_keeps_plain_bodies() {
        let err = ApiError::from_response(502, "  Bad Gateway  ");
        assert_eq!(err.message, "Bad Gateway");
        assert!(err.reason.is_none());
    }

    #[test]
    fn test_class_by_status() {
        assert_eq!(ApiError::new(Some(404), "x").class(), ApiErrorClass::NotFound);
        assert_eq!(ApiError::new(Some(403), "x").class(), ApiErrorClass::Forbidden);
        assert_eq!(ApiError::new(Some(401), "x").class(), ApiErrorClass::Forbidden);
        assert_eq!(ApiError::new(Some(500), "not found").class(), ApiErrorClass::Other);
    }

    #[test]
    fn test_class_by_signature_without_status() {
        assert_eq!(
            ApiError::transport("File not found: abc").class(),
            ApiErrorClass::NotFound
        );
        assert_eq!(
            ApiError::new(Some(400), "The caller does not have permission")
                .with_reason("PERMISSION_DENIED")
                .class(),
            ApiErrorClass::Forbidden
        );
        assert_eq!(
            ApiError::transport("Insufficient permissions for this file").class(),
            ApiErrorClass::Forbidden
        );
        assert_eq!(
            ApiError::new(Some(400), "The object (img_9) could not be found.").class(),
            ApiErrorClass::NotFound
        );
        assert_eq!(ApiError::transport("timeout").class(), ApiErrorClass::Other);
    }

    #[test]
    fn test_parent_errors_win_over_not_found() {
        assert_eq!(
            ApiError::new(Some(404), "Parent folder not found: f1").class(),
            ApiErrorClass::InvalidParent
        );
        assert_eq!(
            ApiError::new(Some(400), "Invalid parent").class(),
            ApiErrorClass::InvalidParent
        );
    }

    #[test]
    fn test_created_image_id() {
        let reply: BatchReply = serde_json::from_value(serde_json::json!({
            "presentationId": "p1",
            "replies": [{}, {"createImage": {"objectId": "img_1"}}]
        }))
        .unwrap();
        assert_eq!(reply.created_image_id(1), Some("img_1"));
        assert_eq!(reply.created_image_id(0), None);
        assert_eq!(reply.created_image_id(5), None);
    }
}
