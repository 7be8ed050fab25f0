use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;

use crate::context::JobContext;
use crate::error::ToolError;
use crate::google::GoogleServices;
use crate::slides::search::{self, MAX_CONTEXT_CHARS, SearchOptions};
use crate::slides::validate;
use crate::tools::slides::{fetch_presentation, parse_params};
use crate::tools::tool::{Tool, ToolOutput};

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct Params {
    presentation_id: String,
    query: String,
    #[serde(default)]
    case_sensitive: bool,
    #[serde(default)]
    context_chars: Option<usize>,
    #[serde(default = "default_true")]
    include_notes: bool,
    #[serde(default)]
    max_results: Option<usize>,
}

/// Find text across slides, groups, tables and speaker notes.
pub struct SearchTextTool {
    services: GoogleServices,
    default_context_chars: usize,
}

impl SearchTextTool {
    pub fn new(services: GoogleServices, default_context_chars: usize) -> Self {
        Self {
            services,
            default_context_chars,
        }
    }
}

#[async_trait]
impl Tool for SearchTextTool {
    fn name(&self) -> &str {
        "search_text"
    }

    fn description(&self) -> &str {
        "Search every slide for a substring. Matches may overlap. Each match reports its \
         1-based slide index, the containing object and a context snippet."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "presentation_id": {"type": "string"},
                "query": {"type": "string"},
                "case_sensitive": {"type": "boolean", "default": false},
                "context_chars": {
                    "type": "integer",
                    "minimum": 0,
                    "maximum": MAX_CONTEXT_CHARS,
                    "default": self.default_context_chars
                },
                "include_notes": {"type": "boolean", "default": true},
                "max_results": {"type": "integer", "minimum": 1}
            },
            "required": ["presentation_id", "query"]
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
        if params.query.trim().is_empty() {
            return Err(ToolError::EmptyQuery("query must not be empty".to_string()));
        }
        let options = SearchOptions {
            case_sensitive: params.case_sensitive,
            context_chars: params.context_chars.unwrap_or(self.default_context_chars),
            include_notes: params.include_notes,
            max_results: params.max_results,
        };
        options.validate()?;

        tracing::info!(
            "[{}] search_text: {:?} in {}",
            ctx.job_id,
            params.query,
            presentation_id
        );

        let presentation = fetch_presentation(&self.services, presentation_id).await?;
        let outcome = search::search(&presentation, &params.query, &options);

        tracing::debug!(
            "[{}] {} match(es), {} returned",
            ctx.job_id,
            outcome.total_matches,
            outcome.matches.len()
        );

        Ok(ToolOutput::success(
            serde_json::json!({
                "query": params.query,
                "total_matches": outcome.total_matches,
                "matches": outcome.matches,
                "truncated": outcome.truncated,
            }),
            start.elapsed(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::stub_services;
    use serde_json::json;

    #[tokio::test]
    async fn test_finds_text_everywhere() {
        let (services, _, _, _) = stub_services();
        let tool = SearchTextTool::new(services, 40);

        let output = tool
            .execute(
                json!({"presentation_id": "pres-1", "query": "FINDME"}),
                &JobContext::default(),
            )
            .await
            .unwrap();

        assert_eq!(output.result["total_matches"], 3);
        assert_eq!(output.result["truncated"], false);
        let types: Vec<&str> = output.result["matches"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["object_type"].as_str().unwrap())
            .collect();
        assert!(types.iter().any(|t| t.starts_with("SPEAKER_NOTES:")));
        assert!(types.contains(&"table_cell"));
        assert_eq!(output.result["matches"][0]["match"], "findme");
    }

    #[tokio::test]
    async fn test_notes_excluded_and_results_capped() {
        let (services, _, _, _) = stub_services();
        let tool = SearchTextTool::new(services, 40);

        let output = tool
            .execute(
                json!({"presentation_id": "pres-1", "query": "findme",
                       "include_notes": false, "max_results": 1}),
                &JobContext::default(),
            )
            .await
            .unwrap();
        assert_eq!(output.result["total_matches"], 2);
        assert_eq!(output.result["matches"].as_array().unwrap().len(), 1);
        assert_eq!(output.result["truncated"], true);
    }

    #[tokio::test]
    async fn test_rejects_bad_queries_without_fetching() {
        let (services, slides, _, _) = stub_services();
        let tool = SearchTextTool::new(services, 40);
        let ctx = JobContext::default();

        let err = tool
            .execute(json!({"presentation_id": "pres-1", "query": "  "}), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "EMPTY_QUERY");

        let err = tool
            .execute(
                json!({"presentation_id": "pres-1", "query": "x", "context_chars": 501}),
                &ctx,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "INVALID_SEARCH_OPTIONS");
        assert_eq!(slides.calls(), 0);
    }
}
