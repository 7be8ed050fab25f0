//! Turning validated intents into ordered batch requests.

use serde_json::json;

use crate::error::ToolError;
use crate::slides::model::{Dimension, ElementKind, PageElement, Size, Transform};
use crate::slides::props::{ImageEdit, Position, Recolor, SizeInput, VideoEdit};
use crate::slides::requests::{
    ApplyMode, CreateImage, DeleteObject, DeleteText, FieldMask, InsertText,
    PageElementProperties, Request, TableCellLocation, TextRange, UpdateImageProperties,
    UpdatePageElementTransform, UpdateVideoProperties,
};
use crate::slides::units::{ScaleError, pt_to_emu, scale_for_target_size};
use crate::slides::walker::MAX_DEPTH;

/// A size in EMU built from per-axis point values. Absent axes stay absent.
fn size_from_points(size: &SizeInput) -> Size {
    Size {
        width: size.width.map(|w| Dimension::emu(pt_to_emu(w))),
        height: size.height.map(|h| Dimension::emu(pt_to_emu(h))),
    }
}

/// Create an image on a page.
///
/// The transform is only sent when a position is given; otherwise the API
/// places the image at the page origin. Each size axis is sent only when
/// given so the API can keep the image's aspect ratio for the other one.
pub fn create_image(
    object_id: &str,
    page_id: &str,
    url: &str,
    position: Option<&Position>,
    size: Option<&SizeInput>,
) -> Request {
    Request::CreateImage(CreateImage {
        object_id: Some(object_id.to_string()),
        url: url.to_string(),
        element_properties: PageElementProperties {
            page_object_id: page_id.to_string(),
            size: size.filter(|s| !s.is_empty()).map(size_from_points),
            transform: position.map(|p| Transform::at(pt_to_emu(p.x), pt_to_emu(p.y))),
        },
    })
}

/// Replace an image: delete the old element, then create the new one in
/// its place.
///
/// The old transform is always carried over. The old size is carried over
/// only with `preserve_size`; without it the new image keeps its natural
/// size under the old scale and position.
pub fn replace_image(
    old: &PageElement,
    page_id: &str,
    new_object_id: &str,
    url: &str,
    preserve_size: bool,
) -> Vec<Request> {
    let size = if preserve_size { old.size } else { None };
    let transform = old.transform.map(|t| t.in_emu());

    vec![
        Request::DeleteObject(DeleteObject {
            object_id: old.object_id.clone(),
        }),
        Request::CreateImage(CreateImage {
            object_id: Some(new_object_id.to_string()),
            url: url.to_string(),
            element_properties: PageElementProperties {
                page_object_id: page_id.to_string(),
                size,
                transform,
            },
        }),
    ]
}

/// Requests for a modify call plus the names of the fields they touch.
#[derive(Debug, Clone, PartialEq)]
pub struct EditPlan {
    pub requests: Vec<Request>,
    pub modified_fields: Vec<&'static str>,
}

/// New absolute transform for a position and/or size change.
///
/// Size changes are multiplied into the existing scale (and shear) rather
/// than replacing it, because the element's intrinsic size never changes.
fn edited_transform(
    element: &PageElement,
    position: Option<&Position>,
    size: Option<&SizeInput>,
) -> Result<Transform, ToolError> {
    let mut transform = element.transform.unwrap_or_default().in_emu();

    if let Some(size) = size {
        let (current_width, current_height) = element.rendered_size_emu().ok_or_else(|| {
            ToolError::InvalidObjectState(format!(
                "object '{}' has no size, so it cannot be resized",
                element.object_id
            ))
        })?;
        let (factor_x, factor_y) =
            scale_for_target_size(current_width, current_height, size.width, size.height)
                .map_err(|e| match e {
                    ScaleError::NoTarget => {
                        ToolError::InvalidSize("size must set width and/or height".to_string())
                    }
                    other => ToolError::InvalidObjectState(format!(
                        "object '{}': {}",
                        element.object_id, other
                    )),
                })?;
        transform.scale_x *= factor_x;
        transform.shear_x *= factor_x;
        transform.scale_y *= factor_y;
        transform.shear_y *= factor_y;
    }

    if let Some(position) = position {
        transform.translate_x = pt_to_emu(position.x);
        transform.translate_y = pt_to_emu(position.y);
    }

    Ok(transform)
}

fn transform_request(object_id: &str, transform: Transform) -> Request {
    Request::UpdatePageElementTransform(UpdatePageElementTransform {
        object_id: object_id.to_string(),
        transform,
        apply_mode: ApplyMode::Absolute,
    })
}

fn geometry_fields(position: Option<&Position>, size: Option<&SizeInput>) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if position.is_some() {
        fields.push("position");
    }
    if size.is_some() {
        fields.push("size");
    }
    fields
}

/// Modify an image: transform update first, then property update.
pub fn modify_image(element: &PageElement, edit: &ImageEdit) -> Result<EditPlan, ToolError> {
    if element.as_image().is_none() {
        return Err(ToolError::InvalidObjectType(format!(
            "object '{}' is a {}, not an image",
            element.object_id,
            element.kind_name()
        )));
    }

    let mut requests = Vec::new();
    let mut modified_fields = geometry_fields(edit.position.as_ref(), edit.size.as_ref());

    if edit.touches_transform() {
        let transform = edited_transform(element, edit.position.as_ref(), edit.size.as_ref())?;
        requests.push(transform_request(&element.object_id, transform));
    }

    let mut mask = FieldMask::new();
    if let Some(brightness) = edit.brightness {
        mask.set("brightness", brightness);
        modified_fields.push("brightness");
    }
    if let Some(contrast) = edit.contrast {
        mask.set("contrast", contrast);
        modified_fields.push("contrast");
    }
    if let Some(transparency) = edit.transparency {
        mask.set("transparency", transparency);
        modified_fields.push("transparency");
    }
    if let Some(crop) = &edit.crop {
        for (path, value) in [
            ("cropProperties.leftOffset", crop.left),
            ("cropProperties.rightOffset", crop.right),
            ("cropProperties.topOffset", crop.top),
            ("cropProperties.bottomOffset", crop.bottom),
        ] {
            if let Some(value) = value {
                mask.set(path, value);
            }
        }
        modified_fields.push("crop");
    }
    match &edit.recolor {
        Some(Recolor::Clear) => {
            mask.clear("recolor");
            modified_fields.push("recolor");
        }
        Some(Recolor::Preset(name)) => {
            mask.set("recolor", json!({ "name": name }));
            modified_fields.push("recolor");
        }
        None => {}
    }

    if !mask.is_empty() {
        requests.push(Request::UpdateImageProperties(UpdateImageProperties::new(
            &element.object_id,
            &mask,
        )));
    }

    Ok(EditPlan {
        requests,
        modified_fields,
    })
}

/// Modify a video: transform update first, then property update.
pub fn modify_video(element: &PageElement, edit: &VideoEdit) -> Result<EditPlan, ToolError> {
    if element.as_video().is_none() {
        return Err(ToolError::InvalidObjectType(format!(
            "object '{}' is a {}, not a video",
            element.object_id,
            element.kind_name()
        )));
    }

    let mut requests = Vec::new();
    let mut modified_fields = geometry_fields(edit.position.as_ref(), edit.size.as_ref());

    if edit.touches_transform() {
        let transform = edited_transform(element, edit.position.as_ref(), edit.size.as_ref())?;
        requests.push(transform_request(&element.object_id, transform));
    }

    let mut mask = FieldMask::new();
    if let Some(start) = edit.start_ms {
        mask.set("start", start);
        modified_fields.push("start_time");
    }
    if let Some(end) = edit.end_ms {
        mask.set("end", end);
        modified_fields.push("end_time");
    }
    if let Some(autoplay) = edit.autoplay {
        mask.set("autoPlay", autoplay);
        modified_fields.push("autoplay");
    }
    if let Some(mute) = edit.mute {
        mask.set("mute", mute);
        modified_fields.push("mute");
    }

    if !mask.is_empty() {
        requests.push(Request::UpdateVideoProperties(UpdateVideoProperties::new(
            &element.object_id,
            &mask,
        )));
    }

    Ok(EditPlan {
        requests,
        modified_fields,
    })
}

/// One delete request per ID, in the given order.
pub fn delete_objects<S: AsRef<str>>(object_ids: &[S]) -> Vec<Request> {
    object_ids
        .iter()
        .map(|id| {
            Request::DeleteObject(DeleteObject {
                object_id: id.as_ref().to_string(),
            })
        })
        .collect()
}

/// A block of text that can be rewritten in place: a shape's text or one
/// table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TextTarget {
    pub object_id: String,
    pub cell: Option<TableCellLocation>,
    /// Text without the trailing paragraph break the API always appends.
    pub text: String,
}

/// Collect translatable text from elements, descending into groups and
/// table cells. Blank text is skipped, as is text holding auto text, since
/// rewriting it would freeze the field into plain characters.
pub fn collect_text_targets(elements: &[PageElement]) -> Vec<TextTarget> {
    let mut targets = Vec::new();
    collect_into(elements, &mut targets, 0);
    targets
}

fn collect_into(elements: &[PageElement], targets: &mut Vec<TextTarget>, depth: usize) {
    if depth > MAX_DEPTH {
        return;
    }
    for element in elements {
        match &element.kind {
            ElementKind::Shape(shape) => {
                if let Some(text) = &shape.text
                    && !text.has_auto_text()
                {
                    push_target(targets, &element.object_id, None, text.plain_text());
                }
            }
            ElementKind::Table(table) => {
                for (row_index, row) in table.table_rows.iter().enumerate() {
                    for (column_index, cell) in row.table_cells.iter().enumerate() {
                        if let Some(text) = &cell.text
                            && !text.has_auto_text()
                        {
                            let location = TableCellLocation {
                                row_index: row_index as u32,
                                column_index: column_index as u32,
                            };
                            push_target(
                                targets,
                                &element.object_id,
                                Some(location),
                                text.plain_text(),
                            );
                        }
                    }
                }
            }
            ElementKind::Group(group) => collect_into(&group.children, targets, depth + 1),
            ElementKind::Image(_) | ElementKind::Video(_) | ElementKind::Other(_) => {}
        }
    }
}

fn push_target(
    targets: &mut Vec<TextTarget>,
    object_id: &str,
    cell: Option<TableCellLocation>,
    raw: String,
) {
    let text = raw.strip_suffix('\n').unwrap_or(&raw);
    if text.trim().is_empty() {
        return;
    }
    targets.push(TextTarget {
        object_id: object_id.to_string(),
        cell,
        text: text.to_string(),
    });
}

/// Requests for a translation pass plus how many targets changed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranslationPlan {
    pub requests: Vec<Request>,
    pub translated_count: usize,
    pub skipped_count: usize,
}

/// Pair each target with its translation. A changed, non-empty translation
/// becomes a delete-all then insert-at-0 pair; anything else is skipped.
pub fn translation_requests(targets: &[TextTarget], translations: &[String]) -> TranslationPlan {
    let mut plan = TranslationPlan::default();
    for (target, translated) in targets.iter().zip(translations) {
        let translated = translated.strip_suffix('\n').unwrap_or(translated);
        if translated.trim().is_empty() || translated == target.text {
            plan.skipped_count += 1;
            continue;
        }
        plan.requests.push(Request::DeleteText(DeleteText {
            object_id: target.object_id.clone(),
            cell_location: target.cell,
            text_range: TextRange::ALL,
        }));
        plan.requests.push(Request::InsertText(InsertText {
            object_id: target.object_id.clone(),
            cell_location: target.cell,
            text: translated.to_string(),
            insertion_index: 0,
        }));
        plan.translated_count += 1;
    }
    plan.skipped_count += targets.len().saturating_sub(translations.len());
    plan
}
