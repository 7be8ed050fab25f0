use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;

use crate::context::JobContext;
use crate::error::ToolError;
use crate::google::{ApiError, ApiErrorClass, GoogleServices};
use crate::slides::validate;
use crate::tools::slides::{classify, parse_params, presentation_url};
use crate::tools::tool::{Tool, ToolOutput};

#[derive(Debug, Deserialize)]
struct Params {
    source_id: String,
    name: String,
    #[serde(default)]
    destination_folder_id: Option<String>,
}

/// Duplicate a deck under a new name.
pub struct CopyPresentationTool {
    services: GoogleServices,
}

impl CopyPresentationTool {
    pub fn new(services: GoogleServices) -> Self {
        Self { services }
    }
}

/// The destination folder is part of the copy request itself, so a
/// not-found that names it is a folder problem, not a missing source.
fn copy_error(err: &ApiError, destination: Option<&str>) -> ToolError {
    if err.class() == ApiErrorClass::NotFound
        && let Some(folder) = destination
        && names_id(&err.message, folder)
    {
        return ToolError::FolderNotFound(err.to_string());
    }
    classify(err, ToolError::SourceNotFound, ToolError::CopyFailed)
}

/// Whether `message` mentions `id` as a whole Drive ID, not as part of a
/// longer one.
fn names_id(message: &str, id: &str) -> bool {
    message
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .any(|token| token == id)
}

#[async_trait]
impl Tool for CopyPresentationTool {
    fn name(&self) -> &str {
        "copy_presentation"
    }

    fn description(&self) -> &str {
        "Copy a presentation to a new file with the given name, optionally into a Drive folder."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "source_id": {"type": "string", "description": "Presentation to copy"},
                "name": {"type": "string", "maxLength": validate::MAX_TITLE_CHARS},
                "destination_folder_id": {"type": "string"}
            },
            "required": ["source_id", "name"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &JobContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let params: Params = parse_params(params)?;

        let source_id = validate::presentation_id(&params.source_id)?;
        let name = validate::title(&params.name)?;
        let destination = params
            .destination_folder_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());

        tracing::info!(
            "[{}] copy_presentation: {} -> '{}' (folder: {:?})",
            ctx.job_id,
            source_id,
            name,
            destination
        );

        let copy = self
            .services
            .drive
            .copy_file(source_id, name, destination)
            .await
            .map_err(|e| copy_error(&e, destination))?;

        Ok(ToolOutput::success(
            serde_json::json!({
                "presentation_id": copy.id,
                "name": copy.name,
                "url": presentation_url(&copy.id),
                "source_id": source_id,
            }),
            start.elapsed(),
        ))
    }
}
