use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;

use crate::context::JobContext;
use crate::error::ToolError;
use crate::google::GoogleServices;
use crate::slides::builders;
use crate::slides::validate;
use crate::slides::walker::categorize_ids;
use crate::tools::slides::{fetch_presentation, parse_params, submit};
use crate::tools::tool::{Tool, ToolOutput};

#[derive(Debug, Deserialize)]
struct Params {
    presentation_id: String,
    #[serde(default)]
    object_ids: Vec<String>,
    #[serde(default)]
    object_id: Option<String>,
}

impl Params {
    /// `object_ids` first, then the single `object_id` form.
    fn requested(&self) -> Vec<&str> {
        self.object_ids
            .iter()
            .map(String::as_str)
            .chain(self.object_id.as_deref())
            .collect()
    }
}

/// Delete page elements (or whole pages) by ID.
///
/// IDs the document does not contain are reported back rather than
/// failing the call, unless none of the requested IDs exist.
pub struct DeleteObjectsTool {
    services: GoogleServices,
}

impl DeleteObjectsTool {
    pub fn new(services: GoogleServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Tool for DeleteObjectsTool {
    fn name(&self) -> &str {
        "delete_objects"
    }

    fn description(&self) -> &str {
        "Delete one or more objects from a presentation. Duplicate IDs are collapsed; \
         IDs that do not exist are listed in not_found_ids."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "presentation_id": {"type": "string"},
                "object_ids": {"type": "array", "items": {"type": "string"}},
                "object_id": {"type": "string", "description": "Single ID; combined with object_ids"}
            },
            "required": ["presentation_id"]
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
        let requested = params.requested();
        if requested.is_empty() {
            return Err(ToolError::NoObjectsSpecified(
                "give object_ids or object_id".to_string(),
            ));
        }
        let requested = requested
            .into_iter()
            .map(validate::object_id)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            "[{}] delete_objects: {} ID(s) in {}",
            ctx.job_id,
            requested.len(),
            presentation_id
        );

        let presentation = fetch_presentation(&self.services, presentation_id).await?;
        let partition = categorize_ids(&presentation, &requested);
        if partition.existing.is_empty() {
            return Err(ToolError::ObjectNotFound(format!(
                "none of the requested objects exist: {}",
                partition.not_found.join(", ")
            )));
        }
        if !partition.not_found.is_empty() {
            tracing::warn!(
                "[{}] Skipping {} unknown ID(s) in {}: {}",
                ctx.job_id,
                partition.not_found.len(),
                presentation_id,
                partition.not_found.join(", ")
            );
        }

        let requests = builders::delete_objects(&partition.existing);
        submit(
            &self.services,
            presentation_id,
            requests,
            ToolError::DeleteFailed,
        )
        .await?;

        Ok(ToolOutput::success(
            serde_json::json!({
                "deleted_ids": partition.existing,
                "deleted_count": partition.existing.len(),
                "not_found_ids": partition.not_found,
            }),
            start.elapsed(),
        ))
    }

    fn requires_approval(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::stub_services;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_deletes_existing_and_reports_unknown() {
        let (services, slides, _, _) = stub_services();
        let tool = DeleteObjectsTool::new(services);

        let output = tool
            .execute(
                json!({
                    "presentation_id": "pres-1",
                    "object_ids": ["image-1", "ghost", "image-1"],
                    "object_id": "deep-shape"
                }),
                &JobContext::default(),
            )
            .await
            .unwrap();

        assert_eq!(output.result["deleted_ids"], json!(["image-1", "deep-shape"]));
        assert_eq!(output.result["deleted_count"], 2);
        assert_eq!(output.result["not_found_ids"], json!(["ghost"]));

        let batch = slides.last_batch().unwrap();
        let targets: Vec<&str> = batch.iter().filter_map(|r| r.object_id()).collect();
        assert_eq!(targets, vec!["image-1", "deep-shape"]);
    }

    #[tokio::test]
    async fn test_all_unknown_is_an_error() {
        let (services, slides, _, _) = stub_services();
        let tool = DeleteObjectsTool::new(services);
        let err = tool
            .execute(
                json!({"presentation_id": "pres-1", "object_ids": ["a", "b"]}),
                &JobContext::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "OBJECT_NOT_FOUND");
        assert!(slides.batches().is_empty());
    }

    #[tokio::test]
    async fn test_input_checks_run_before_fetch() {
        let (services, slides, _, _) = stub_services();
        let tool = DeleteObjectsTool::new(services);
        let ctx = JobContext::default();

        let err = tool
            .execute(json!({"presentation_id": "pres-1", "object_ids": []}), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "NO_OBJECTS_SPECIFIED");

        let err = tool
            .execute(
                json!({"presentation_id": "pres-1", "object_ids": ["image-1", "  "]}),
                &ctx,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "INVALID_OBJECT_ID");
        assert_eq!(slides.calls(), 0);
        assert!(tool.requires_approval());
    }
}
