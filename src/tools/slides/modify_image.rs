use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;

use crate::context::JobContext;
use crate::error::ToolError;
use crate::google::GoogleServices;
use crate::slides::builders;
use crate::slides::props::ImageChanges;
use crate::slides::validate;
use crate::slides::walker::locate;
use crate::tools::slides::{fetch_presentation, parse_params, submit};
use crate::tools::tool::{Tool, ToolOutput};

#[derive(Debug, Deserialize)]
struct Params {
    presentation_id: String,
    object_id: String,
    #[serde(default)]
    properties: ImageChanges,
}

/// Change an existing image's geometry and appearance in one batch.
pub struct ModifyImageTool {
    services: GoogleServices,
}

impl ModifyImageTool {
    pub fn new(services: GoogleServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Tool for ModifyImageTool {
    fn name(&self) -> &str {
        "modify_image"
    }

    fn description(&self) -> &str {
        "Modify an image: position and size in points, brightness and contrast (-1 to 1), \
         transparency (0 to 1), crop offsets as fractions, and recolor presets. Only the \
         given properties change; recolor NONE removes a recolor."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        let fraction = serde_json::json!({"type": "number", "minimum": 0, "maximum": 1});
        serde_json::json!({
            "type": "object",
            "properties": {
                "presentation_id": {"type": "string"},
                "object_id": {"type": "string"},
                "properties": {
                    "type": "object",
                    "properties": {
                        "position": {
                            "type": "object",
                            "properties": {"x": {"type": "number"}, "y": {"type": "number"}}
                        },
                        "size": {
                            "type": "object",
                            "properties": {"width": {"type": "number"}, "height": {"type": "number"}}
                        },
                        "brightness": {"type": "number", "minimum": -1, "maximum": 1},
                        "contrast": {"type": "number", "minimum": -1, "maximum": 1},
                        "transparency": fraction,
                        "crop": {
                            "type": "object",
                            "properties": {
                                "left": fraction, "right": fraction,
                                "top": fraction, "bottom": fraction
                            }
                        },
                        "recolor": {
                            "type": "string",
                            "description": "NONE, GRAYSCALE, SEPIA, NEGATIVE, LIGHT1-LIGHT10, DARK1-DARK10"
                        }
                    }
                }
            },
            "required": ["presentation_id", "object_id", "properties"]
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
        let edit = validate::image_changes(&params.properties)?;

        tracing::info!(
            "[{}] modify_image: {} in {}",
            ctx.job_id,
            object_id,
            presentation_id
        );

        let presentation = fetch_presentation(&self.services, presentation_id).await?;
        let located = locate(&presentation, object_id).ok_or_else(|| {
            ToolError::ObjectNotFound(format!("no object with ID '{}'", object_id))
        })?;
        let plan = builders::modify_image(located.element, &edit)?;
        let requests_applied = plan.requests.len();

        submit(
            &self.services,
            presentation_id,
            plan.requests,
            ToolError::ModifyImageFailed,
        )
        .await?;

        Ok(ToolOutput::success(
            serde_json::json!({
                "object_id": object_id,
                "requests_applied": requests_applied,
                "modified_fields": plan.modified_fields,
            }),
            start.elapsed(),
        ))
    }
}
