//! Slides tools, one orchestrator per capability.
//!
//! Each tool validates its parameters, fetches the document when it needs
//! current state, builds requests with `crate::slides`, submits one batch,
//! and maps upstream failures onto [`ToolError`] kinds.

mod add_image;
mod copy_presentation;
mod create_presentation;
mod delete_objects;
mod export_pdf;
mod list_comments;
mod modify_image;
mod modify_video;
mod replace_image;
mod search_text;
mod set_transition;
mod translate;

pub use add_image::AddImageTool;
pub use copy_presentation::CopyPresentationTool;
pub use create_presentation::CreatePresentationTool;
pub use delete_objects::DeleteObjectsTool;
pub use export_pdf::ExportPdfTool;
pub use list_comments::ListCommentsTool;
pub use modify_image::ModifyImageTool;
pub use modify_video::ModifyVideoTool;
pub use replace_image::ReplaceImageTool;
pub use search_text::SearchTextTool;
pub use set_transition::SetTransitionTool;
pub use translate::TranslatePresentationTool;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::ToolSettings;
use crate::context::JobContext;
use crate::error::ToolError;
use crate::google::{ApiError, ApiErrorClass, BatchReply, FileRef, GoogleServices};
use crate::slides::model::Presentation;
use crate::slides::requests::Request;
use crate::slides::validate::DecodedImage;
use crate::tools::ToolRegistry;

/// Decode tool parameters into their typed form.
pub(crate) fn parse_params<T: DeserializeOwned>(params: serde_json::Value) -> Result<T, ToolError> {
    serde_json::from_value(params).map_err(|e| ToolError::InvalidParameters(e.to_string()))
}

/// Map an upstream failure onto a domain kind.
///
/// `not_found` is what a not-found response means at this call site;
/// `failure` is the operation's generic kind for anything unclassified.
/// The upstream message is always kept in the detail.
pub fn classify(
    err: &ApiError,
    not_found: fn(String) -> ToolError,
    failure: fn(String) -> ToolError,
) -> ToolError {
    let detail = err.to_string();
    match err.class() {
        ApiErrorClass::NotFound => not_found(detail),
        ApiErrorClass::Forbidden => ToolError::AccessDenied(detail),
        ApiErrorClass::InvalidParent => ToolError::FolderNotFound(detail),
        ApiErrorClass::Other => failure(detail),
    }
}

/// Fetch the current document.
pub(crate) async fn fetch_presentation(
    services: &GoogleServices,
    presentation_id: &str,
) -> Result<Presentation, ToolError> {
    services
        .slides
        .get_presentation(presentation_id)
        .await
        .map_err(|e| classify(&e, ToolError::PresentationNotFound, ToolError::ServiceError))
}

/// Submit one atomic batch.
///
/// A 404 means the presentation is gone; any other not-found signature
/// points at an object named in the batch.
pub(crate) async fn submit(
    services: &GoogleServices,
    presentation_id: &str,
    requests: Vec<Request>,
    failure: fn(String) -> ToolError,
) -> Result<BatchReply, ToolError> {
    let names: Vec<&str> = requests.iter().map(|r| r.name()).collect();
    tracing::debug!(
        "Submitting batch to {}: [{}]",
        presentation_id,
        names.join(", ")
    );
    services
        .slides
        .batch_update(presentation_id, requests)
        .await
        .map_err(|e| {
            let not_found: fn(String) -> ToolError = if e.status == Some(404) {
                ToolError::PresentationNotFound
            } else {
                ToolError::ObjectNotFound
            };
            classify(&e, not_found, failure)
        })
}

/// Outcome of an operation with best-effort follow-up steps.
///
/// `Partial` means the primary artifact exists but a secondary step failed;
/// the warnings say which.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion<T> {
    Full(T),
    Partial { value: T, warnings: Vec<String> },
}

impl<T> Completion<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Full(value) | Self::Partial { value, .. } => value,
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            Self::Full(_) => &[],
            Self::Partial { warnings, .. } => warnings,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Partial { .. })
    }

    /// Record a failed follow-up step.
    pub fn warn(self, warning: impl Into<String>) -> Self {
        match self {
            Self::Full(value) => Self::Partial {
                value,
                warnings: vec![warning.into()],
            },
            Self::Partial { value, mut warnings } => {
                warnings.push(warning.into());
                Self::Partial { value, warnings }
            }
        }
    }

    pub fn into_parts(self) -> (T, Vec<String>) {
        match self {
            Self::Full(value) => (value, Vec::new()),
            Self::Partial { value, warnings } => (value, warnings),
        }
    }
}

/// An image uploaded to Drive, ready to be referenced by URL.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UploadedImage {
    pub file: FileRef,
    pub url: String,
}

/// Upload image bytes and make them readable by the Slides renderer.
///
/// Sharing is best-effort: a failure there is a warning, not an error.
pub(crate) async fn upload_image(
    services: &GoogleServices,
    image: &DecodedImage,
    ctx: &JobContext,
) -> Result<Completion<UploadedImage>, ToolError> {
    let name = format!(
        "slidesmith-{}.{}",
        ctx.job_id.simple(),
        image.format.extension()
    );
    let file = services
        .drive
        .upload_file(&name, image.format.mime_type(), image.bytes.clone())
        .await
        .map_err(|e| classify(&e, ToolError::UploadFailed, ToolError::UploadFailed))?;

    let url = image_url(&file.id);
    let mut completion = Completion::Full(UploadedImage {
        file: file.clone(),
        url,
    });

    if let Err(e) = services.drive.make_public(&file.id).await {
        tracing::warn!(
            "[{}] Could not share uploaded image {}: {}",
            ctx.job_id,
            file.id,
            e
        );
        completion = completion.warn(format!(
            "uploaded image {} could not be made public: {}",
            file.id, e
        ));
    }

    Ok(completion)
}

/// Fresh Slides-legal object ID: `{prefix}_{32 hex chars}`.
pub fn new_object_id(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Editor URL for a presentation.
pub fn presentation_url(presentation_id: &str) -> String {
    format!("https://docs.google.com/presentation/d/{}/edit", presentation_id)
}

/// Direct-download URL for a Drive file.
pub fn image_url(file_id: &str) -> String {
    format!("https://drive.google.com/uc?export=download&id={}", file_id)
}

/// Register every Slides tool.
pub async fn register_slides_tools(
    registry: &ToolRegistry,
    services: GoogleServices,
    settings: ToolSettings,
) {
    registry
        .register(Arc::new(AddImageTool::new(services.clone())))
        .await;
    registry
        .register(Arc::new(ReplaceImageTool::new(services.clone())))
        .await;
    registry
        .register(Arc::new(ModifyImageTool::new(services.clone())))
        .await;
    registry
        .register(Arc::new(ModifyVideoTool::new(services.clone())))
        .await;
    registry
        .register(Arc::new(DeleteObjectsTool::new(services.clone())))
        .await;
    registry
        .register(Arc::new(CreatePresentationTool::new(services.clone())))
        .await;
    registry
        .register(Arc::new(CopyPresentationTool::new(services.clone())))
        .await;
    registry
        .register(Arc::new(ExportPdfTool::new(
            services.clone(),
            settings.export_max_bytes,
        )))
        .await;
    registry
        .register(Arc::new(SearchTextTool::new(
            services.clone(),
            settings.search_context_chars,
        )))
        .await;
    registry
        .register(Arc::new(TranslatePresentationTool::new(services.clone())))
        .await;
    registry
        .register(Arc::new(ListCommentsTool::new(services)))
        .await;
    registry.register(Arc::new(SetTransitionTool::new())).await;

    tracing::info!("Registered {} slides tools", registry.list().await.len());
}
