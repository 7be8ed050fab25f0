//! Substring search over every text-bearing element of a deck.
//!
//! Offsets and context windows count Unicode scalar values, not bytes.
//! The scan is non-consuming: a match at `i` does not stop another from
//! starting at `i + 1`.

use serde::Serialize;

use crate::error::ToolError;
use crate::slides::model::{ElementKind, PageElement, Presentation};
use crate::slides::walker::MAX_DEPTH;

/// Label prefix for text found on a speaker-notes page.
pub const NOTES_PREFIX: &str = "SPEAKER_NOTES:";

/// Widest context radius a caller may ask for.
pub const MAX_CONTEXT_CHARS: usize = 500;

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    pub context_chars: usize,
    pub include_notes: bool,
    pub max_results: Option<usize>,
}

impl SearchOptions {
    pub fn validate(&self) -> Result<(), ToolError> {
        if self.context_chars > MAX_CONTEXT_CHARS {
            return Err(ToolError::InvalidSearchOptions(format!(
                "context_chars must be at most {}, got {}",
                MAX_CONTEXT_CHARS, self.context_chars
            )));
        }
        if self.max_results == Some(0) {
            return Err(ToolError::InvalidSearchOptions(
                "max_results must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    /// 1-based slide position.
    pub slide_index: usize,
    pub slide_id: String,
    /// Element ID, or `table[row,col]` for a table cell.
    pub object_id: String,
    pub object_type: String,
    /// Character offset of the match inside the element's text.
    pub start_index: usize,
    #[serde(rename = "match")]
    pub matched: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    pub total_matches: usize,
    pub matches: Vec<SearchMatch>,
    pub truncated: bool,
}

/// A unit of searchable text and where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSource {
    pub slide_index: usize,
    pub slide_id: String,
    pub object_id: String,
    pub object_type: String,
    pub text: String,
}

/// Every searchable text unit on the slides, in document order, with each
/// slide's notes following its own elements when requested.
pub fn text_sources(presentation: &Presentation, include_notes: bool) -> Vec<TextSource> {
    let mut sources = Vec::new();
    for (index, slide) in presentation.slides.iter().enumerate() {
        let mut push = |object_id: String, object_type: String, text: String| {
            sources.push(TextSource {
                slide_index: index + 1,
                slide_id: slide.object_id.clone(),
                object_id,
                object_type,
                text,
            });
        };
        walk_text(&slide.page_elements, "", &mut push, 0);
        if include_notes && let Some(notes) = slide.notes_page() {
            walk_text(&notes.page_elements, NOTES_PREFIX, &mut push, 0);
        }
    }
    sources
}

fn walk_text<F>(elements: &[PageElement], prefix: &str, push: &mut F, depth: usize)
where
    F: FnMut(String, String, String),
{
    if depth > MAX_DEPTH {
        return;
    }
    for element in elements {
        match &element.kind {
            ElementKind::Shape(shape) => {
                if let Some(text) = &shape.text {
                    push(
                        element.object_id.clone(),
                        format!("{}shape", prefix),
                        text.plain_text(),
                    );
                }
            }
            ElementKind::Table(table) => {
                for (row, table_row) in table.table_rows.iter().enumerate() {
                    for (column, cell) in table_row.table_cells.iter().enumerate() {
                        if let Some(text) = &cell.text {
                            push(
                                format!("{}[{},{}]", element.object_id, row, column),
                                format!("{}table_cell", prefix),
                                text.plain_text(),
                            );
                        }
                    }
                }
            }
            ElementKind::Group(group) => walk_text(&group.children, prefix, push, depth + 1),
            ElementKind::Image(_) | ElementKind::Video(_) | ElementKind::Other(_) => {}
        }
    }
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Start offsets (in chars) of every occurrence of `needle` in `haystack`,
/// overlaps included.
pub fn find_all(haystack: &[char], needle: &[char], case_sensitive: bool) -> Vec<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }
    let eq = |a: char, b: char| {
        if case_sensitive {
            a == b
        } else {
            fold(a) == fold(b)
        }
    };
    (0..=haystack.len() - needle.len())
        .filter(|&start| {
            haystack[start..start + needle.len()]
                .iter()
                .zip(needle)
                .all(|(&a, &b)| eq(a, b))
        })
        .collect()
}

/// Text around a match, with `...` where the window cuts the text.
pub fn context_window(chars: &[char], start: usize, len: usize, radius: usize) -> String {
    let from = start.saturating_sub(radius);
    let to = (start + len + radius).min(chars.len());
    let mut context = String::new();
    if from > 0 {
        context.push_str(ELLIPSIS);
    }
    context.extend(&chars[from..to]);
    if to < chars.len() {
        context.push_str(ELLIPSIS);
    }
    context
}

/// Search the deck. `total_matches` counts every hit even when
/// `max_results` caps the returned list.
pub fn search(presentation: &Presentation, query: &str, options: &SearchOptions) -> SearchOutcome {
    let needle: Vec<char> = query.chars().collect();
    let mut matches = Vec::new();
    let mut total_matches = 0;

    for source in text_sources(presentation, options.include_notes) {
        let chars: Vec<char> = source.text.chars().collect();
        for start in find_all(&chars, &needle, options.case_sensitive) {
            total_matches += 1;
            if options.max_results.is_some_and(|max| matches.len() >= max) {
                continue;
            }
            matches.push(SearchMatch {
                slide_index: source.slide_index,
                slide_id: source.slide_id.clone(),
                object_id: source.object_id.clone(),
                object_type: source.object_type.clone(),
                start_index: start,
                matched: chars[start..start + needle.len()].iter().collect(),
                context: context_window(&chars, start, needle.len(), options.context_chars),
            });
        }
    }

    SearchOutcome {
        truncated: total_matches > matches.len(),
        total_matches,
        matches,
    }
}
