use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;

use crate::context::JobContext;
use crate::error::ToolError;
use crate::google::GoogleServices;
use crate::slides::builders;
use crate::slides::props::{Position, SizeInput};
use crate::slides::validate;
use crate::tools::slides::{
    fetch_presentation, new_object_id, parse_params, presentation_url, submit, upload_image,
};
use crate::tools::tool::{Tool, ToolOutput};

#[derive(Debug, Deserialize)]
struct Params {
    presentation_id: String,
    #[serde(default)]
    slide_index: Option<i64>,
    #[serde(default)]
    slide_id: Option<String>,
    image_data: String,
    #[serde(default)]
    position: Option<Position>,
    #[serde(default)]
    size: Option<SizeInput>,
}

/// Upload an image and place it on a slide.
pub struct AddImageTool {
    services: GoogleServices,
}

impl AddImageTool {
    pub fn new(services: GoogleServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Tool for AddImageTool {
    fn name(&self) -> &str {
        "add_image"
    }

    fn description(&self) -> &str {
        "Add an image (base64 PNG, JPEG, GIF, WebP or BMP) to a slide. Position and size \
         are in points; omit size to keep the image's natural size, or give one axis to \
         keep its aspect ratio."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "presentation_id": {"type": "string", "description": "Presentation ID"},
                "slide_index": {"type": "integer", "minimum": 1, "description": "1-based slide position"},
                "slide_id": {"type": "string", "description": "Slide object ID (instead of slide_index)"},
                "image_data": {"type": "string", "description": "Base64 image bytes or a data: URL"},
                "position": {
                    "type": "object",
                    "properties": {
                        "x": {"type": "number", "minimum": 0},
                        "y": {"type": "number", "minimum": 0}
                    },
                    "required": ["x", "y"]
                },
                "size": {
                    "type": "object",
                    "properties": {
                        "width": {"type": "number", "exclusiveMinimum": 0},
                        "height": {"type": "number", "exclusiveMinimum": 0}
                    }
                }
            },
            "required": ["presentation_id", "image_data"]
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
        let slide = validate::slide_ref(params.slide_index, params.slide_id.as_deref())?;
        let image = validate::image_data(&params.image_data)?;
        if let Some(position) = &params.position {
            validate::position(position)?;
        }
        if let Some(size) = &params.size {
            validate::size(size)?;
        }

        tracing::info!(
            "[{}] add_image: {} on {:?} ({})",
            ctx.job_id,
            presentation_id,
            slide,
            image.format.mime_type()
        );

        let presentation = fetch_presentation(&self.services, presentation_id).await?;
        let (_, page) = validate::resolve_slide(&presentation, &slide)?;
        let slide_id = page.object_id.clone();

        let upload = upload_image(&self.services, &image, ctx).await?;
        let object_id = new_object_id("img");
        let request = builders::create_image(
            &object_id,
            &slide_id,
            &upload.value().url,
            params.position.as_ref(),
            params.size.as_ref(),
        );

        let reply = submit(
            &self.services,
            presentation_id,
            vec![request],
            ToolError::CreateFailed,
        )
        .await?;
        let created_id = reply
            .created_image_id(0)
            .map(str::to_string)
            .unwrap_or(object_id);

        let (uploaded, warnings) = upload.into_parts();
        Ok(ToolOutput::success(
            serde_json::json!({
                "object_id": created_id,
                "slide_id": slide_id,
                "file_id": uploaded.file.id,
                "image_url": uploaded.url,
                "presentation_url": presentation_url(presentation_id),
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
    use crate::slides::requests::Request;
    use crate::testing::{PNG_1X1_BASE64, stub_services};
    use serde_json::json;

    #[tokio::test]
    async fn test_adds_image_to_slide_by_index() {
        let (services, slides, drive, _) = stub_services();
        let tool = AddImageTool::new(services);

        let output = tool
            .execute(
                json!({
                    "presentation_id": "pres-1",
                    "slide_index": 2,
                    "image_data": PNG_1X1_BASE64,
                    "position": {"x": 100, "y": 50},
                    "size": {"width": 200, "height": 150}
                }),
                &JobContext::default(),
            )
            .await
            .unwrap();

        assert_eq!(output.result["slide_id"], "slide-2");
        assert_eq!(output.result["file_id"], "file-1");
        assert_eq!(
            output.result["image_url"],
            "https://drive.google.com/uc?export=download&id=file-1"
        );
        assert_eq!(output.result["warnings"], json!([]));
        assert_eq!(drive.made_public(), vec!["file-1"]);

        let batch = slides.last_batch().unwrap();
        assert_eq!(batch.len(), 1);
        let Request::CreateImage(create) = &batch[0] else {
            panic!("expected createImage");
        };
        assert_eq!(output.result["object_id"], json!(create.object_id));
        assert_eq!(create.element_properties.page_object_id, "slide-2");
        let transform = create.element_properties.transform.unwrap();
        assert_eq!(transform.translate_x, 1_270_000.0);
    }

    #[tokio::test]
    async fn test_rejects_bad_input_before_any_call() {
        let (services, slides, drive, _) = stub_services();
        let tool = AddImageTool::new(services);
        let ctx = JobContext::default();

        let cases = [
            (json!({"presentation_id": "pres-1", "image_data": PNG_1X1_BASE64}), "INVALID_SLIDE_REFERENCE"),
            (json!({"presentation_id": "pres-1", "slide_index": 0, "image_data": PNG_1X1_BASE64}), "INVALID_SLIDE_REFERENCE"),
            (json!({"presentation_id": "pres-1", "slide_index": 1, "image_data": "bm90IGFuIGltYWdl"}), "INVALID_IMAGE_DATA"),
            (json!({"presentation_id": "", "slide_index": 1, "image_data": PNG_1X1_BASE64}), "INVALID_PRESENTATION_ID"),
            (json!({"presentation_id": "pres-1", "slide_index": 1, "image_data": PNG_1X1_BASE64,
                    "position": {"x": -5, "y": 0}}), "INVALID_POSITION"),
            (json!({"presentation_id": "pres-1", "slide_index": 1, "image_data": PNG_1X1_BASE64,
                    "size": {"width": 0}}), "INVALID_SIZE"),
            (json!({"presentation_id": "pres-1"}), "INVALID_PARAMETERS"),
        ];
        for (params, kind) in cases {
            let err = tool.execute(params.clone(), &ctx).await.unwrap_err();
            assert_eq!(err.kind(), kind, "{}", params);
        }
        assert_eq!(slides.calls(), 0);
        assert_eq!(drive.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_slide_fails_before_upload() {
        let (services, _, drive, _) = stub_services();
        let tool = AddImageTool::new(services);
        let err = tool
            .execute(
                json!({"presentation_id": "pres-1", "slide_id": "slide-9", "image_data": PNG_1X1_BASE64}),
                &JobContext::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "SLIDE_NOT_FOUND");
        assert_eq!(drive.calls(), 0);
    }

    #[tokio::test]
    async fn test_sharing_failure_is_a_warning() {
        let (services, slides, drive, _) = stub_services();
        drive.fail_public_with(ApiError::new(Some(403), "sharing disabled by admin"));
        let tool = AddImageTool::new(services);

        let output = tool
            .execute(
                json!({"presentation_id": "pres-1", "slide_id": "slide-1", "image_data": PNG_1X1_BASE64}),
                &JobContext::default(),
            )
            .await
            .unwrap();
        assert_eq!(output.result["warnings"].as_array().unwrap().len(), 1);
        assert_eq!(slides.batches().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_presentation_and_upload_failure() {
        let (services, _, drive, _) = stub_services();
        let tool = AddImageTool::new(services);
        let ctx = JobContext::default();

        let err = tool
            .execute(
                json!({"presentation_id": "other", "slide_index": 1, "image_data": PNG_1X1_BASE64}),
                &ctx,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "PRESENTATION_NOT_FOUND");

        drive.fail_upload_with(ApiError::new(Some(500), "backend error"));
        let err = tool
            .execute(
                json!({"presentation_id": "pres-1", "slide_index": 1, "image_data": PNG_1X1_BASE64}),
                &ctx,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "UPLOAD_FAILED");
    }
}
