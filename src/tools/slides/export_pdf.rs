use std::time::Instant;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::StreamExt;
use serde::Deserialize;

use crate::context::JobContext;
use crate::error::ToolError;
use crate::google::{ByteStream, GoogleServices};
use crate::slides::detect::count_pdf_pages;
use crate::slides::validate;
use crate::tools::slides::{classify, parse_params};
use crate::tools::tool::{Tool, ToolOutput};

const PDF_MIME: &str = "application/pdf";

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct Params {
    presentation_id: String,
    #[serde(default = "default_true")]
    include_content: bool,
}

/// Export a deck as PDF.
pub struct ExportPdfTool {
    services: GoogleServices,
    max_bytes: usize,
}

impl ExportPdfTool {
    pub fn new(services: GoogleServices, max_bytes: usize) -> Self {
        Self {
            services,
            max_bytes,
        }
    }
}

/// Drain an export stream, refusing bodies over `max_bytes`.
///
/// The stream is owned here, so it is dropped (and the connection
/// released) on every return path.
async fn read_capped(mut stream: ByteStream, max_bytes: usize) -> Result<Vec<u8>, ToolError> {
    let mut body = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ToolError::ExportFailed(e.to_string()))?;
        if body.len() + chunk.len() > max_bytes {
            return Err(ToolError::ExportFailed(format!(
                "export is larger than the {} byte limit",
                max_bytes
            )));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

#[async_trait]
impl Tool for ExportPdfTool {
    fn name(&self) -> &str {
        "export_pdf"
    }

    fn description(&self) -> &str {
        "Export a presentation as PDF. Returns the size, an estimated page count and, \
         unless include_content is false, the PDF bytes as base64."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "presentation_id": {"type": "string"},
                "include_content": {"type": "boolean", "default": true}
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

        tracing::info!("[{}] export_pdf: {}", ctx.job_id, presentation_id);

        let stream = self
            .services
            .drive
            .export_file(presentation_id, PDF_MIME)
            .await
            .map_err(|e| classify(&e, ToolError::PresentationNotFound, ToolError::ExportFailed))?;
        let body = read_capped(stream, self.max_bytes).await?;

        let page_count = count_pdf_pages(&body);
        tracing::debug!(
            "[{}] Exported {} bytes, ~{} page(s)",
            ctx.job_id,
            body.len(),
            page_count
        );

        let mut result = serde_json::json!({
            "presentation_id": presentation_id,
            "mime_type": PDF_MIME,
            "size_bytes": body.len(),
            "page_count": page_count,
        });
        if params.include_content {
            result["content_base64"] = serde_json::Value::String(STANDARD.encode(&body));
        }

        Ok(ToolOutput::success(result, start.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::ApiError;
    use crate::testing::{fake_pdf, stub_services};
    use serde_json::json;

    #[tokio::test]
    async fn test_exports_with_content() {
        let (services, _, drive, _) = stub_services();
        drive.set_export_body(fake_pdf(3));
        let tool = ExportPdfTool::new(services, 1024 * 1024);

        let output = tool
            .execute(json!({"presentation_id": "pres-1"}), &JobContext::default())
            .await
            .unwrap();

        let expected = fake_pdf(3);
        assert_eq!(output.result["mime_type"], "application/pdf");
        assert_eq!(output.result["size_bytes"], expected.len());
        assert_eq!(output.result["page_count"], 3);
        assert_eq!(
            STANDARD
                .decode(output.result["content_base64"].as_str().unwrap())
                .unwrap(),
            expected
        );
        assert_eq!(
            drive.exports(),
            vec![("pres-1".to_string(), "application/pdf".to_string())]
        );
    }

    #[tokio::test]
    async fn test_metadata_only() {
        let (services, _, _, _) = stub_services();
        let tool = ExportPdfTool::new(services, 1024 * 1024);
        let output = tool
            .execute(
                json!({"presentation_id": "pres-1", "include_content": false}),
                &JobContext::default(),
            )
            .await
            .unwrap();
        assert!(output.result.get("content_base64").is_none());
        assert_eq!(output.result["page_count"], 2);
    }

    #[tokio::test]
    async fn test_size_cap_and_upstream_errors() {
        let (services, _, drive, _) = stub_services();
        let tool = ExportPdfTool::new(services, 16);
        let ctx = JobContext::default();

        let err = tool
            .execute(json!({"presentation_id": "pres-1"}), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "EXPORT_FAILED");
        assert!(err.detail().contains("16 byte limit"));

        drive.fail_export_with(ApiError::new(Some(404), "File not found: pres-9"));
        let err = tool
            .execute(json!({"presentation_id": "pres-9"}), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "PRESENTATION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_stream_error_fails_export() {
        let chunks: Vec<Result<bytes::Bytes, ApiError>> = vec![
            Ok(bytes::Bytes::from_static(b"%PDF-1.4")),
            Err(ApiError::transport("connection reset")),
        ];
        let stream: ByteStream = Box::pin(futures::stream::iter(chunks));
        let err = read_capped(stream, 1024).await.unwrap_err();
        assert_eq!(err.kind(), "EXPORT_FAILED");
        assert!(err.detail().contains("connection reset"));
    }
}
