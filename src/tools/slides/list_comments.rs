use std::collections::HashSet;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::JobContext;
use crate::error::ToolError;
use crate::google::{Comment, CommentAuthor, CommentReply, GoogleServices};
use crate::slides::validate;
use crate::tools::slides::{classify, parse_params};
use crate::tools::tool::{Tool, ToolOutput};

/// Largest page `comments.list` serves.
const PAGE_SIZE: u32 = 100;

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct Params {
    presentation_id: String,
    #[serde(default)]
    include_deleted: bool,
    #[serde(default = "default_true")]
    include_resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct ReplySummary {
    id: String,
    author: String,
    content: String,
    created_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct CommentSummary {
    id: String,
    author: String,
    content: String,
    quoted_text: Option<String>,
    resolved: bool,
    created_time: Option<String>,
    modified_time: Option<String>,
    replies: Vec<ReplySummary>,
}

fn author_name(author: Option<&CommentAuthor>) -> String {
    author
        .map(|a| a.display_name.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn summarize_reply(reply: &CommentReply) -> ReplySummary {
    ReplySummary {
        id: reply.id.clone(),
        author: author_name(reply.author.as_ref()),
        content: reply.content.clone(),
        created_time: reply.created_time.clone(),
    }
}

fn summarize(comment: &Comment, include_deleted: bool) -> CommentSummary {
    CommentSummary {
        id: comment.id.clone(),
        author: author_name(comment.author.as_ref()),
        content: comment.content.clone(),
        quoted_text: comment
            .quoted_file_content
            .as_ref()
            .map(|q| q.value.clone())
            .filter(|v| !v.is_empty()),
        resolved: comment.resolved,
        created_time: comment.created_time.clone(),
        modified_time: comment.modified_time.clone(),
        replies: comment
            .replies
            .iter()
            .filter(|r| include_deleted || !r.deleted)
            .map(summarize_reply)
            .collect(),
    }
}

/// List the discussion threads on a deck.
pub struct ListCommentsTool {
    services: GoogleServices,
}

impl ListCommentsTool {
    pub fn new(services: GoogleServices) -> Self {
        Self { services }
    }

    /// Follow page tokens until the listing is exhausted.
    async fn fetch_all(
        &self,
        presentation_id: &str,
        include_deleted: bool,
    ) -> Result<Vec<Comment>, ToolError> {
        let mut comments = Vec::new();
        let mut seen_tokens = HashSet::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .services
                .drive
                .list_comments(
                    presentation_id,
                    include_deleted,
                    PAGE_SIZE,
                    page_token.as_deref(),
                )
                .await
                .map_err(|e| {
                    classify(&e, ToolError::PresentationNotFound, ToolError::ServiceError)
                })?;
            comments.extend(page.comments);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) if seen_tokens.insert(token.clone()) => page_token = Some(token),
                Some(token) => {
                    tracing::warn!(
                        "Comment listing for {} repeated page token {}, stopping",
                        presentation_id,
                        token
                    );
                    break;
                }
                None => break,
            }
        }
        Ok(comments)
    }
}

#[async_trait]
impl Tool for ListCommentsTool {
    fn name(&self) -> &str {
        "list_comments"
    }

    fn description(&self) -> &str {
        "List comments on a presentation with their replies and quoted text."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "presentation_id": {"type": "string"},
                "include_deleted": {"type": "boolean", "default": false},
                "include_resolved": {"type": "boolean", "default": true}
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

        tracing::info!("[{}] list_comments: {}", ctx.job_id, presentation_id);

        let comments: Vec<CommentSummary> = self
            .fetch_all(presentation_id, params.include_deleted)
            .await?
            .iter()
            .filter(|c| params.include_resolved || !c.resolved)
            .map(|c| summarize(c, params.include_deleted))
            .collect();

        Ok(ToolOutput::success(
            serde_json::json!({
                "total": comments.len(),
                "comments": comments,
            }),
            start.elapsed(),
        ))
    }
}
