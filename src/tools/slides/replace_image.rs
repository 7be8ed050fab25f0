use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;

use crate::context::JobContext;
use crate::error::ToolError;
use crate::google::GoogleServices;
use crate::slides::builders;
use crate::slides::validate;
use crate::slides::walker::locate;
use crate::tools::slides::{fetch_presentation, new_object_id, parse_params, submit, upload_image};
use crate::tools::tool::{Tool, ToolOutput};

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct Params {
    presentation_id: String,
    object_id: String,
    image_data: String,
    #[serde(default = "default_true")]
    preserve_size: bool,
}

/// Swap an existing image for new image data.
///
/// The replacement gets a new object ID; the old one is deleted in the
/// same batch.
pub struct ReplaceImageTool {
    services: GoogleServices,
}

impl ReplaceImageTool {
    pub fn new(services: GoogleServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Tool for ReplaceImageTool {
    fn name(&self) -> &str {
        "replace_image"
    }

    fn description(&self) -> &str {
        "Replace an image with new image data at the same position. By default the old \
         size is kept; set preserve_size to false to keep only the old transform. \
         Returns the new object ID."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "presentation_id": {"type": "string"},
                "object_id": {"type": "string", "description": "Image to replace"},
                "image_data": {"type": "string", "description": "Base64 image bytes or a data: URL"},
                "preserve_size": {"type": "boolean", "default": true}
            },
            "required": ["presentation_id", "object_id", "image_data"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &JobContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let params: Params = parse_params(params)?;

        let presentation_id = validate::presentation_id(&params.presentation_id)?;
        let object_id = validate::object_id(&params.object_id)?;
        let image = validate::image_data(&params.image_data)?;

        tracing::info!(
            "[{}] replace_image: {} in {} (preserve_size={})",
            ctx.job_id,
            object_id,
            presentation_id,
            params.preserve_size
        );

        let presentation = fetch_presentation(&self.services, presentation_id).await?;
        let located = locate(&presentation, object_id).ok_or_else(|| {
            ToolError::ObjectNotFound(format!("no object with ID '{}'", object_id))
        })?;
        if located.element.as_image().is_none() {
            return Err(ToolError::InvalidObjectType(format!(
                "object '{}' is a {}, not an image",
                object_id,
                located.element.kind_name()
            )));
        }
        let page_id = located.page.page.object_id.clone();

        let upload = upload_image(&self.services, &image, ctx).await?;
        let new_id = new_object_id("img");
        let requests = builders::replace_image(
            located.element,
            &page_id,
            &new_id,
            &upload.value().url,
            params.preserve_size,
        );

        let reply = submit(
            &self.services,
            presentation_id,
            requests,
            ToolError::ReplaceFailed,
        )
        .await?;
        let created_id = reply
            .created_image_id(1)
            .map(str::to_string)
            .unwrap_or(new_id);

        let (uploaded, warnings) = upload.into_parts();
        Ok(ToolOutput::success(
            serde_json::json!({
                "new_object_id": created_id,
                "replaced_object_id": object_id,
                "page_id": page_id,
                "file_id": uploaded.file.id,
                "image_url": uploaded.url,
                "warnings": warnings,
            }),
            start.elapsed(),
        ))
    }

    fn requires_approval(&self) -> bool {
        true
    }
}
