//! Mutation requests sent in a `presentations.batchUpdate` call.
//!
//! [`Request`] serializes to the API's externally tagged form, e.g.
//! `{"deleteObject": {"objectId": "i1"}}`. Order inside a batch is
//! significant and is decided by `slides::builders`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::slides::model::{Size, Transform};

/// One atomic operation in a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    CreateImage(CreateImage),
    DeleteObject(DeleteObject),
    UpdateImageProperties(UpdateImageProperties),
    UpdatePageElementTransform(UpdatePageElementTransform),
    UpdateVideoProperties(UpdateVideoProperties),
    InsertText(InsertText),
    DeleteText(DeleteText),
}

impl Request {
    /// API name of the operation, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateImage(_) => "createImage",
            Self::DeleteObject(_) => "deleteObject",
            Self::UpdateImageProperties(_) => "updateImageProperties",
            Self::UpdatePageElementTransform(_) => "updatePageElementTransform",
            Self::UpdateVideoProperties(_) => "updateVideoProperties",
            Self::InsertText(_) => "insertText",
            Self::DeleteText(_) => "deleteText",
        }
    }

    /// The object this request acts on (or creates).
    pub fn object_id(&self) -> Option<&str> {
        match self {
            Self::CreateImage(r) => r.object_id.as_deref(),
            Self::DeleteObject(r) => Some(&r.object_id),
            Self::UpdateImageProperties(r) => Some(&r.object_id),
            Self::UpdatePageElementTransform(r) => Some(&r.object_id),
            Self::UpdateVideoProperties(r) => Some(&r.object_id),
            Self::InsertText(r) => Some(&r.object_id),
            Self::DeleteText(r) => Some(&r.object_id),
        }
    }
}

/// Where a new element goes and how big it is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElementProperties {
    pub page_object_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    pub url: String,
    pub element_properties: PageElementProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteObject {
    pub object_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplyMode {
    /// Replace the element's transform.
    Absolute,
    /// Multiply into the element's transform.
    Relative,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageElementTransform {
    pub object_id: String,
    pub transform: Transform,
    pub apply_mode: ApplyMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateImageProperties {
    pub object_id: String,
    pub image_properties: Value,
    pub fields: String,
}

impl UpdateImageProperties {
    pub fn new(object_id: impl Into<String>, mask: &FieldMask) -> Self {
        Self {
            object_id: object_id.into(),
            image_properties: mask.values(),
            fields: mask.paths(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideoProperties {
    pub object_id: String,
    pub video_properties: Value,
    pub fields: String,
}

impl UpdateVideoProperties {
    pub fn new(object_id: impl Into<String>, mask: &FieldMask) -> Self {
        Self {
            object_id: object_id.into(),
            video_properties: mask.values(),
            fields: mask.paths(),
        }
    }
}

/// Row/column address of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCellLocation {
    pub row_index: u32,
    pub column_index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertText {
    pub object_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_location: Option<TableCellLocation>,
    pub text: String,
    pub insertion_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RangeType {
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextRange {
    #[serde(rename = "type")]
    pub range_type: RangeType,
}

impl TextRange {
    pub const ALL: TextRange = TextRange {
        range_type: RangeType::All,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteText {
    pub object_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_location: Option<TableCellLocation>,
    pub text_range: TextRange,
}

/// An ordered list of `(field path, value)` pairs for a partial update.
///
/// A `None` value clears the field: the path is listed in the mask but no
/// value is sent, which the API reads as "reset to default". Paths not in
/// the list are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMask {
    entries: Vec<(String, Option<Value>)>,
}

impl FieldMask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a dotted path (e.g. `cropProperties.leftOffset`) to a value.
    pub fn set(&mut self, path: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.entries.push((path.into(), Some(value.into())));
        self
    }

    /// Mark a path as changed with no value.
    pub fn clear(&mut self, path: impl Into<String>) -> &mut Self {
        self.entries.push((path.into(), None));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, Option<Value>)] {
        &self.entries
    }

    /// Comma-separated mask for the request's `fields` member.
    pub fn paths(&self) -> String {
        self.entries
            .iter()
            .map(|(path, _)| path.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Nested object holding every set value. Cleared paths are omitted.
    pub fn values(&self) -> Value {
        let mut root = Map::new();
        for (path, value) in &self.entries {
            if let Some(value) = value {
                insert_path(&mut root, path, value.clone());
            }
        }
        Value::Object(root)
    }
}

fn insert_path(root: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            root.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = root
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                insert_path(map, rest, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slides::model::Dimension;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_requests_are_externally_tagged() {
        let request = Request::DeleteObject(DeleteObject {
            object_id: "i1".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"deleteObject": {"objectId": "i1"}})
        );
        assert_eq!(request.name(), "deleteObject");
    }

    #[test]
    fn test_create_image_omits_absent_geometry() {
        let request = Request::CreateImage(CreateImage {
            object_id: Some("img_1".to_string()),
            url: "https://example.com/a.png".to_string(),
            element_properties: PageElementProperties {
                page_object_id: "p1".to_string(),
                size: Some(Size {
                    width: Some(Dimension::emu(100.0)),
                    height: None,
                }),
                transform: None,
            },
        });
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"createImage": {
                "objectId": "img_1",
                "url": "https://example.com/a.png",
                "elementProperties": {
                    "pageObjectId": "p1",
                    "size": {"width": {"magnitude": 100.0, "unit": "EMU"}}
                }
            }})
        );
    }

    #[test]
    fn test_field_mask_clear_is_listed_without_value() {
        let mut mask = FieldMask::new();
        mask.set("brightness", 0.25)
            .set("cropProperties.leftOffset", 0.1)
            .set("cropProperties.topOffset", 0.2)
            .clear("recolor");

        assert_eq!(
            mask.paths(),
            "brightness,cropProperties.leftOffset,cropProperties.topOffset,recolor"
        );
        assert_eq!(
            mask.values(),
            json!({
                "brightness": 0.25,
                "cropProperties": {"leftOffset": 0.1, "topOffset": 0.2}
            })
        );
    }

    #[test]
    fn test_update_image_properties_shape() {
        let mut mask = FieldMask::new();
        mask.set("recolor", json!({"name": "SEPIA"}));
        let request = Request::UpdateImageProperties(UpdateImageProperties::new("i1", &mask));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"updateImageProperties": {
                "objectId": "i1",
                "imageProperties": {"recolor": {"name": "SEPIA"}},
                "fields": "recolor"
            }})
        );
    }

    #[test]
    fn test_text_requests_with_cell_location() {
        let delete = Request::DeleteText(DeleteText {
            object_id: "t1".to_string(),
            cell_location: Some(TableCellLocation {
                row_index: 1,
                column_index: 2,
            }),
            text_range: TextRange::ALL,
        });
        assert_eq!(
            serde_json::to_value(&delete).unwrap(),
            json!({"deleteText": {
                "objectId": "t1",
                "cellLocation": {"rowIndex": 1, "columnIndex": 2},
                "textRange": {"type": "ALL"}
            }})
        );

        let insert = Request::InsertText(InsertText {
            object_id: "s1".to_string(),
            cell_location: None,
            text: "Hola".to_string(),
            insertion_index: 0,
        });
        assert_eq!(
            serde_json::to_value(&insert).unwrap(),
            json!({"insertText": {"objectId": "s1", "text": "Hola", "insertionIndex": 0}})
        );
    }
}
