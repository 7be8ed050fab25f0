use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;

use crate::context::JobContext;
use crate::error::ToolError;
use crate::google::GoogleServices;
use crate::slides::builders;
use crate::slides::props::VideoChanges;
use crate::slides::validate;
use crate::slides::walker::locate;
use crate::tools::slides::{fetch_presentation, parse_params, submit};
use crate::tools::tool::{Tool, ToolOutput};

#[derive(Debug, Deserialize)]
struct Params {
    presentation_id: String,
    object_id: String,
    #[serde(default)]
    properties: VideoChanges,
}

/// Change an embedded video's geometry and playback settings.
pub struct ModifyVideoTool {
    services: GoogleServices,
}

impl ModifyVideoTool {
    pub fn new(services: GoogleServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Tool for ModifyVideoTool {
    fn name(&self) -> &str {
        "modify_video"
    }

    fn description(&self) -> &str {
        "Modify a video: position and size in points, playback start and end in seconds, \
         autoplay and mute."
    }

    fn parameters_schema(&self) -> serde_json::Value {
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
                        "start_time": {"type": "number", "minimum": 0, "description": "Seconds"},
                        "end_time": {"type": "number", "minimum": 0, "description": "Seconds"},
                        "autoplay": {"type": "boolean"},
                        "mute": {"type": "boolean"}
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
        let edit = validate::video_changes(&params.properties)?;

        tracing::info!(
            "[{}] modify_video: {} in {}",
            ctx.job_id,
            object_id,
            presentation_id
        );

        let presentation = fetch_presentation(&self.services, presentation_id).await?;
        let located = locate(&presentation, object_id).ok_or_else(|| {
            ToolError::ObjectNotFound(format!("no object with ID '{}'", object_id))
        })?;
        let plan = builders::modify_video(located.element, &edit)?;
        let requests_applied = plan.requests.len();

        submit(
            &self.services,
            presentation_id,
            plan.requests,
            ToolError::ModifyVideoFailed,
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
