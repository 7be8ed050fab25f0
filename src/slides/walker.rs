//! Locating objects inside a presentation tree.
//!
//! Pages own elements; groups own child elements. The walk is depth-first
//! and stops descending at [`MAX_DEPTH`] so malformed upstream data cannot
//! recurse without bound. Table cells carry no object ID and are never
//! matched here (see `slides::search` for cell-level text access).

use std::collections::HashSet;

use crate::slides::model::{ElementKind, Page, PageElement, PageKind, Presentation};

/// Deepest group nesting the walker descends into.
pub const MAX_DEPTH: usize = 64;

/// Find an element by object ID, descending into groups.
pub fn find_element<'a>(elements: &'a [PageElement], object_id: &str) -> Option<&'a PageElement> {
    find_at_depth(elements, object_id, 0)
}

fn find_at_depth<'a>(
    elements: &'a [PageElement],
    object_id: &str,
    depth: usize,
) -> Option<&'a PageElement> {
    if depth > MAX_DEPTH {
        return None;
    }
    for element in elements {
        if element.object_id == object_id {
            return Some(element);
        }
        if let ElementKind::Group(group) = &element.kind
            && let Some(found) = find_at_depth(&group.children, object_id, depth + 1)
        {
            return Some(found);
        }
    }
    None
}

/// A page visited during a document walk.
#[derive(Debug, Clone, Copy)]
pub struct PageRef<'a> {
    pub page: &'a Page,
    pub kind: PageKind,
    /// 0-based index of the owning slide, for slides and their notes pages.
    pub slide_index: Option<usize>,
}

/// Every page in the document: each slide followed by its notes page,
/// then masters, then layouts.
pub fn pages(presentation: &Presentation) -> Vec<PageRef<'_>> {
    let mut pages = Vec::new();
    for (index, slide) in presentation.slides.iter().enumerate() {
        pages.push(PageRef {
            page: slide,
            kind: PageKind::Slide,
            slide_index: Some(index),
        });
        if let Some(notes) = slide.notes_page() {
            pages.push(PageRef {
                page: notes,
                kind: PageKind::Notes,
                slide_index: Some(index),
            });
        }
    }
    for master in &presentation.masters {
        pages.push(PageRef {
            page: master,
            kind: PageKind::Master,
            slide_index: None,
        });
    }
    for layout in &presentation.layouts {
        pages.push(PageRef {
            page: layout,
            kind: PageKind::Layout,
            slide_index: None,
        });
    }
    pages
}

/// An element together with the page that owns it.
#[derive(Debug, Clone, Copy)]
pub struct Located<'a> {
    pub element: &'a PageElement,
    pub page: PageRef<'a>,
}

/// Find an element anywhere in the document.
pub fn locate<'a>(presentation: &'a Presentation, object_id: &str) -> Option<Located<'a>> {
    pages(presentation).into_iter().find_map(|page| {
        find_element(&page.page.page_elements, object_id).map(|element| Located { element, page })
    })
}

/// Every object ID in the document: pages, notes pages, and elements at
/// any group depth.
pub fn collect_object_ids(presentation: &Presentation) -> HashSet<String> {
    let mut ids = HashSet::new();
    for page in pages(presentation) {
        if !page.page.object_id.is_empty() {
            ids.insert(page.page.object_id.clone());
        }
        collect_element_ids(&page.page.page_elements, &mut ids, 0);
    }
    ids
}

fn collect_element_ids(elements: &[PageElement], ids: &mut HashSet<String>, depth: usize) {
    if depth > MAX_DEPTH {
        return;
    }
    for element in elements {
        ids.insert(element.object_id.clone());
        if let ElementKind::Group(group) = &element.kind {
            collect_element_ids(&group.children, ids, depth + 1);
        }
    }
}

/// Drop repeated IDs, keeping the first occurrence of each.
pub fn dedup_ids<S: AsRef<str>>(ids: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(|id| id.as_ref())
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// Requested IDs split by whether the document contains them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdPartition {
    pub existing: Vec<String>,
    pub not_found: Vec<String>,
}

/// Partition requested IDs against the document, preserving request order
/// in both halves. Duplicates are collapsed first.
pub fn categorize_ids<S: AsRef<str>>(presentation: &Presentation, requested: &[S]) -> IdPartition {
    let known = collect_object_ids(presentation);
    let mut partition = IdPartition::default();
    for id in dedup_ids(requested) {
        if known.contains(&id) {
            partition.existing.push(id);
        } else {
            partition.not_found.push(id);
        }
    }
    partition
}
