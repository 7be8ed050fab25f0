use async_trait::async_trait;
use serde::Deserialize;

use crate::context::JobContext;
use crate::error::ToolError;
use crate::slides::validate::{self, TransitionType};
use crate::tools::slides::parse_params;
use crate::tools::tool::{Tool, ToolOutput};

#[derive(Debug, Deserialize)]
struct Params {
    presentation_id: String,
    #[serde(default)]
    slide_index: Option<i64>,
    #[serde(default)]
    slide_id: Option<String>,
    #[serde(default)]
    apply_to_all: bool,
    transition_type: String,
    #[serde(default)]
    duration_seconds: Option<f64>,
}

/// Slide transitions.
///
/// The Slides API exposes no request that sets a transition, so after
/// checking the input this always reports TRANSITION_NOT_SUPPORTED and
/// touches nothing remote.
#[derive(Default)]
pub struct SetTransitionTool;

impl SetTransitionTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for SetTransitionTool {
    fn name(&self) -> &str {
        "set_transition"
    }

    fn description(&self) -> &str {
        "Set a slide transition. The Google Slides API cannot change transitions, so this \
         validates the request and reports that transitions must be set in the editor."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        let types: Vec<&str> = TransitionType::ALL.iter().map(|t| t.as_str()).collect();
        serde_json::json!({
            "type": "object",
            "properties": {
                "presentation_id": {"type": "string"},
                "slide_index": {"type": "integer", "minimum": 1},
                "slide_id": {"type": "string"},
                "apply_to_all": {"type": "boolean", "default": false},
                "transition_type": {"type": "string", "enum": types},
                "duration_seconds": {
                    "type": "number",
                    "exclusiveMinimum": 0,
                    "maximum": validate::MAX_TRANSITION_SECONDS
                }
            },
            "required": ["presentation_id", "transition_type"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &JobContext,
    ) -> Result<ToolOutput, ToolError> {
        let params: Params = parse_params(params)?;

        let presentation_id = validate::presentation_id(&params.presentation_id)?;
        let target = if params.apply_to_all {
            if params.slide_index.is_some()
                || params.slide_id.as_deref().is_some_and(|id| !id.trim().is_empty())
            {
                return Err(ToolError::InvalidSlideReference(
                    "apply_to_all cannot be combined with slide_index or slide_id".to_string(),
                ));
            }
            "all slides".to_string()
        } else {
            let slide = validate::slide_ref(params.slide_index, params.slide_id.as_deref())?;
            format!("{:?}", slide)
        };
        let transition = validate::transition_type(&params.transition_type)?;
        if let Some(seconds) = params.duration_seconds {
            validate::transition_duration(seconds)?;
        }

        tracing::info!(
            "[{}] set_transition: {} on {} in {} (not supported)",
            ctx.job_id,
            transition.as_str(),
            target,
            presentation_id
        );

        Err(ToolError::TransitionNotSupported(format!(
            "the Slides API cannot set transitions; apply {} to {} in the Slides editor",
            transition.as_str(),
            target
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_valid_request_is_not_supported() {
        let tool = SetTransitionTool::new();
        let err = tool
            .execute(
                json!({"presentation_id": "pres-1", "slide_index": 1,
                       "transition_type": "fade", "duration_seconds": 1.5}),
                &JobContext::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "TRANSITION_NOT_SUPPORTED");
        assert!(err.detail().contains("FADE"));
    }

    #[tokio::test]
    async fn test_input_errors_come_first() {
        let tool = SetTransitionTool::new();
        let ctx = JobContext::default();

        let cases = [
            (json!({"presentation_id": "pres-1", "transition_type": "FADE"}), "INVALID_SLIDE_REFERENCE"),
            (json!({"presentation_id": "pres-1", "apply_to_all": true, "slide_index": 2,
                    "transition_type": "FADE"}), "INVALID_SLIDE_REFERENCE"),
            (json!({"presentation_id": "pres-1", "apply_to_all": true,
                    "transition_type": "SPIN"}), "INVALID_TRANSITION_TYPE"),
            (json!({"presentation_id": "pres-1", "apply_to_all": true,
                    "transition_type": "CUBE", "duration_seconds": 9}), "INVALID_TRANSITION_DURATION"),
            (json!({"presentation_id": "pres-1", "apply_to_all": true,
                    "transition_type": "CUBE", "duration_seconds": 0}), "INVALID_TRANSITION_DURATION"),
        ];
        for (params, kind) in cases {
            let err = tool.execute(params, &ctx).await.unwrap_err();
            assert_eq!(err.kind(), kind);
        }
    }
}
