use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;

use crate::context::JobContext;
use crate::error::ToolError;
use crate::google::GoogleServices;
use crate::slides::builders::{self, TextTarget};
use crate::slides::model::{Page, Presentation};
use crate::slides::validate::{self, SlideRef};
use crate::slides::walker::locate;
use crate::tools::slides::{classify, fetch_presentation, parse_params, submit};
use crate::tools::tool::{Tool, ToolOutput};

/// How much of the deck to translate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Scope {
    #[default]
    Presentation,
    Slide,
    Object,
}

#[derive(Debug, Deserialize)]
struct Params {
    presentation_id: String,
    target_language: String,
    #[serde(default)]
    source_language: Option<String>,
    #[serde(default)]
    scope: Scope,
    #[serde(default)]
    slide_index: Option<i64>,
    #[serde(default)]
    slide_id: Option<String>,
    #[serde(default)]
    object_id: Option<String>,
    #[serde(default)]
    include_notes: bool,
}

/// Validated scope, ready to resolve against a fetched document.
enum Target<'a> {
    Presentation,
    Slide(SlideRef),
    Object(&'a str),
}

/// Translate text in place across a deck, one slide, or one object.
pub struct TranslatePresentationTool {
    services: GoogleServices,
}

impl TranslatePresentationTool {
    pub fn new(services: GoogleServices) -> Self {
        Self { services }
    }
}

fn slide_targets(slide: &Page, include_notes: bool) -> Vec<TextTarget> {
    let mut targets = builders::collect_text_targets(&slide.page_elements);
    if include_notes && let Some(notes) = slide.notes_page() {
        targets.extend(builders::collect_text_targets(&notes.page_elements));
    }
    targets
}

fn collect_targets(
    presentation: &Presentation,
    target: &Target<'_>,
    include_notes: bool,
) -> Result<Vec<TextTarget>, ToolError> {
    match target {
        Target::Presentation => Ok(presentation
            .slides
            .iter()
            .flat_map(|slide| slide_targets(slide, include_notes))
            .collect()),
        Target::Slide(slide) => {
            let (_, page) = validate::resolve_slide(presentation, slide)?;
            Ok(slide_targets(page, include_notes))
        }
        Target::Object(object_id) => {
            let located = locate(presentation, object_id).ok_or_else(|| {
                ToolError::ObjectNotFound(format!("no object with ID '{}'", object_id))
            })?;
            Ok(builders::collect_text_targets(std::slice::from_ref(
                located.element,
            )))
        }
    }
}

#[async_trait]
impl Tool for TranslatePresentationTool {
    fn name(&self) -> &str {
        "translate_presentation"
    }

    fn description(&self) -> &str {
        "Translate text in shapes, groups and table cells in place. Scope is the whole \
         presentation, one slide (slide_index or slide_id) or one object (object_id). \
         Speaker notes are included only with include_notes."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "presentation_id": {"type": "string"},
                "target_language": {"type": "string", "description": "Language code, e.g. es or pt-BR"},
                "source_language": {"type": "string", "description": "Detected when omitted"},
                "scope": {"type": "string", "enum": ["presentation", "slide", "object"], "default": "presentation"},
                "slide_index": {"type": "integer", "minimum": 1},
                "slide_id": {"type": "string"},
                "object_id": {"type": "string"},
                "include_notes": {"type": "boolean", "default": false}
            },
            "required": ["presentation_id", "target_language"]
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
        let target_language = validate::language(&params.target_language)?;
        let source_language = params
            .source_language
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(validate::language)
            .transpose()?;
        let target = match params.scope {
            Scope::Presentation => Target::Presentation,
            Scope::Slide => Target::Slide(validate::slide_ref(
                params.slide_index,
                params.slide_id.as_deref(),
            )?),
            Scope::Object => Target::Object(validate::object_id(
                params.object_id.as_deref().unwrap_or(""),
            )?),
        };

        tracing::info!(
            "[{}] translate_presentation: {} to {} ({:?})",
            ctx.job_id,
            presentation_id,
            target_language,
            params.scope
        );

        let presentation = fetch_presentation(&self.services, presentation_id).await?;
        let targets = collect_targets(&presentation, &target, params.include_notes)?;
        if targets.is_empty() {
            return Err(ToolError::NoTextToTranslate(
                "no text found in the requested scope".to_string(),
            ));
        }

        let texts: Vec<String> = targets.iter().map(|t| t.text.clone()).collect();
        let translations = self
            .services
            .translate
            .translate_batch(&texts, &target_language, source_language.as_deref())
            .await
            .map_err(|e| classify(&e, ToolError::TranslateFailed, ToolError::TranslateFailed))?;
        if translations.len() != texts.len() {
            return Err(ToolError::TranslateFailed(format!(
                "sent {} texts but got {} translations",
                texts.len(),
                translations.len()
            )));
        }

        let plan = builders::translation_requests(&targets, &translations);
        if plan.requests.is_empty() {
            tracing::debug!("[{}] Nothing changed after translation", ctx.job_id);
        } else {
            submit(
                &self.services,
                presentation_id,
                plan.requests,
                ToolError::TranslateFailed,
            )
            .await?;
        }

        Ok(ToolOutput::success(
            serde_json::json!({
                "translated_count": plan.translated_count,
                "skipped_count": plan.skipped_count,
                "target_language": target_language,
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
    use crate::testing::stub_services;
    use serde_json::json;

    #[tokio::test]
    async fn test_translates_whole_deck() {
        let (services, slides, _, translate) = stub_services();
        translate.insert("Name", "Name");
        let tool = TranslatePresentationTool::new(services);

        let output = tool
            .execute(
                json!({"presentation_id": "pres-1", "target_language": "es"}),
                &JobContext::default(),
            )
            .await
            .unwrap();

        assert_eq!(output.result["translated_count"], 5);
        assert_eq!(output.result["skipped_count"], 1);
        assert_eq!(output.result["target_language"], "es");

        let (texts, target, source) = translate.requests()[0].clone();
        assert_eq!(texts.len(), 6);
        assert_eq!(texts[0], "Quarterly Review");
        assert_eq!(target, "es");
        assert_eq!(source, None);

        let batch = slides.last_batch().unwrap();
        assert_eq!(batch.len(), 10);
        let Request::InsertText(insert) = &batch[1] else {
            panic!("expected insertText after deleteText");
        };
        assert_eq!(insert.text, "[es] Quarterly Review");
        assert_eq!(insert.insertion_index, 0);
    }

    #[tokio::test]
    async fn test_slide_scope_with_notes() {
        let (services, _, _, translate) = stub_services();
        let tool = TranslatePresentationTool::new(services);

        let output = tool
            .execute(
                json!({"presentation_id": "pres-1", "target_language": "fr", "scope": "slide",
                       "slide_index": 1, "include_notes": true, "source_language": "en"}),
                &JobContext::default(),
            )
            .await
            .unwrap();

        assert_eq!(output.result["translated_count"], 2);
        let (texts, _, source) = translate.requests()[0].clone();
        assert_eq!(texts, vec!["Quarterly Review", "Remember to findme the budget"]);
        assert_eq!(source.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_object_scope_table_cells() {
        let (services, slides, _, _) = stub_services();
        let tool = TranslatePresentationTool::new(services);

        tool.execute(
            json!({"presentation_id": "pres-1", "target_language": "de",
                   "scope": "object", "object_id": "table-1"}),
            &JobContext::default(),
        )
        .await
        .unwrap();

        let batch = slides.last_batch().unwrap();
        assert_eq!(batch.len(), 6);
        let Request::DeleteText(delete) = &batch[2] else {
            panic!("expected deleteText");
        };
        assert_eq!(delete.object_id, "table-1");
        let cell = delete.cell_location.unwrap();
        assert_eq!((cell.row_index, cell.column_index), (0, 1));
    }

    #[tokio::test]
    async fn test_nothing_to_translate_and_failures() {
        let (services, slides, _, translate) = stub_services();
        let tool = TranslatePresentationTool::new(services);
        let ctx = JobContext::default();

        let err = tool
            .execute(
                json!({"presentation_id": "pres-1", "target_language": "es",
                       "scope": "object", "object_id": "image-1"}),
                &ctx,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "NO_TEXT_TO_TRANSLATE");

        let err = tool
            .execute(
                json!({"presentation_id": "pres-1", "target_language": "spanish!"}),
                &ctx,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "INVALID_LANGUAGE");

        let err = tool
            .execute(
                json!({"presentation_id": "pres-1", "target_language": "es", "scope": "object"}),
                &ctx,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "INVALID_OBJECT_ID");

        translate.fail_with(ApiError::new(Some(500), "quota exceeded"));
        let err = tool
            .execute(json!({"presentation_id": "pres-1", "target_language": "es"}), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "TRANSLATE_FAILED");
        assert!(slides.batches().is_empty());
    }

    #[tokio::test]
    async fn test_unchanged_translation_submits_nothing() {
        let (services, slides, _, translate) = stub_services();
        translate.insert("Inner text", "Inner text");
        let tool = TranslatePresentationTool::new(services);

        let output = tool
            .execute(
                json!({"presentation_id": "pres-1", "target_language": "en",
                       "scope": "object", "object_id": "group-inner-shape"}),
                &JobContext::default(),
            )
            .await
            .unwrap();
        assert_eq!(output.result["translated_count"], 0);
        assert_eq!(output.result["skipped_count"], 1);
        assert!(slides.batches().is_empty());
    }
}
