use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;

use crate::context::JobContext;
use crate::error::ToolError;
use crate::google::GoogleServices;
use crate::slides::validate;
use crate::tools::slides::{Completion, classify, parse_params, presentation_url};
use crate::tools::tool::{Tool, ToolOutput};

#[derive(Debug, Deserialize)]
struct Params {
    title: String,
    #[serde(default)]
    folder_id: Option<String>,
}

/// Create an empty deck, optionally filed into a Drive folder.
pub struct CreatePresentationTool {
    services: GoogleServices,
}

impl CreatePresentationTool {
    pub fn new(services: GoogleServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Tool for CreatePresentationTool {
    fn name(&self) -> &str {
        "create_presentation"
    }

    fn description(&self) -> &str {
        "Create a new presentation. If folder_id is given the deck is moved there; a failed \
         move is reported as a warning and the presentation is still returned."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "title": {"type": "string", "maxLength": validate::MAX_TITLE_CHARS},
                "folder_id": {"type": "string", "description": "Drive folder to file the deck in"}
            },
            "required": ["title"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &JobContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let params: Params = parse_params(params)?;

        let title = validate::title(&params.title)?;
        let folder_id = params
            .folder_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());

        tracing::info!("[{}] create_presentation: '{}'", ctx.job_id, title);

        let presentation = self
            .services
            .slides
            .create_presentation(title)
            .await
            .map_err(|e| classify(&e, ToolError::CreateFailed, ToolError::CreateFailed))?;
        let id = presentation.presentation_id.clone();

        let mut completion = Completion::Full(presentation);
        if let Some(folder_id) = folder_id
            && let Err(e) = self.services.drive.move_file(&id, folder_id).await
        {
            tracing::warn!(
                "[{}] Created {} but could not move it to folder {}: {}",
                ctx.job_id,
                id,
                folder_id,
                e
            );
            completion = completion.warn(format!(
                "presentation was created but could not be moved to folder {}: {}",
                folder_id, e
            ));
        }

        let (presentation, warnings) = completion.into_parts();
        Ok(ToolOutput::success(
            serde_json::json!({
                "presentation_id": id,
                "title": presentation.title,
                "url": presentation_url(&id),
                "slide_count": presentation.slides.len(),
                "warnings": warnings,
            }),
            start.elapsed(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::ApiError;
    use crate::testing::stub_services;
    use serde_json::json;

    #[tokio::test]
    async fn test_creates_and_files_into_folder() {
        let (services, slides, drive, _) = stub_services();
        let tool = CreatePresentationTool::new(services);

        let output = tool
            .execute(
                json!({"title": "  Roadmap  ", "folder_id": "folder-7"}),
                &JobContext::default(),
            )
            .await
            .unwrap();

        assert_eq!(output.result["presentation_id"], "new-pres-1");
        assert_eq!(
            output.result["url"],
            "https://docs.google.com/presentation/d/new-pres-1/edit"
        );
        assert_eq!(output.result["slide_count"], 1);
        assert_eq!(output.result["warnings"], json!([]));
        assert_eq!(slides.created_titles(), vec!["Roadmap"]);
        assert_eq!(
            drive.moves(),
            vec![("new-pres-1".to_string(), "folder-7".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failed_move_is_a_warning() {
        let (services, _, drive, _) = stub_services();
        drive.fail_move_with(ApiError::new(Some(404), "File not found: folder-7"));
        let tool = CreatePresentationTool::new(services);

        let output = tool
            .execute(
                json!({"title": "Roadmap", "folder_id": "folder-7"}),
                &JobContext::default(),
            )
            .await
            .unwrap();
        let warnings = output.result["warnings"].as_array().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].as_str().unwrap().contains("folder-7"));
    }

    #[tokio::test]
    async fn test_title_checked_and_create_failure_mapped() {
        let (services, slides, drive, _) = stub_services();
        let tool = CreatePresentationTool::new(services);
        let ctx = JobContext::default();

        let err = tool.execute(json!({"title": "   "}), &ctx).await.unwrap_err();
        assert_eq!(err.kind(), "INVALID_TITLE");
        assert_eq!(slides.calls(), 0);

        slides.fail_create_with(ApiError::new(Some(403), "The caller does not have permission"));
        let err = tool.execute(json!({"title": "Deck"}), &ctx).await.unwrap_err();
        assert_eq!(err.kind(), "ACCESS_DENIED");

        slides.fail_create_with(ApiError::new(Some(503), "Backend unavailable"));
        let err = tool.execute(json!({"title": "Deck"}), &ctx).await.unwrap_err();
        assert_eq!(err.kind(), "CREATE_FAILED");
        assert_eq!(drive.calls(), 0);
    }
}
