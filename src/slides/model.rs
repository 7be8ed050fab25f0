//! Presentation document model.
//!
//! Mirrors the subset of the Slides API `Presentation` resource the tools
//! read: pages, their elements, geometry, and text. Everything is
//! deserialized straight from the `presentations.get` response and dropped
//! at the end of the tool call.

use serde::{Deserialize, Serialize};

use crate::slides::units::pt_to_emu;

/// A presentation as returned by the Slides API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    #[serde(default)]
    pub presentation_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub revision_id: Option<String>,
    #[serde(default)]
    pub page_size: Option<Size>,
    #[serde(default)]
    pub slides: Vec<Page>,
    #[serde(default)]
    pub masters: Vec<Page>,
    #[serde(default)]
    pub layouts: Vec<Page>,
}

impl Presentation {
    /// Look up a slide by its object ID, returning its 0-based index too.
    pub fn slide_by_id(&self, slide_id: &str) -> Option<(usize, &Page)> {
        self.slides
            .iter()
            .enumerate()
            .find(|(_, slide)| slide.object_id == slide_id)
    }
}

/// Which part of the document a page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Slide,
    Notes,
    Master,
    Layout,
}

/// A slide, master, layout, or notes page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub object_id: String,
    #[serde(default)]
    pub page_type: Option<String>,
    #[serde(default)]
    pub page_elements: Vec<PageElement>,
    #[serde(default)]
    pub slide_properties: Option<SlideProperties>,
}

impl Page {
    /// The speaker-notes page attached to a slide, if any.
    pub fn notes_page(&self) -> Option<&Page> {
        self.slide_properties
            .as_ref()
            .and_then(|props| props.notes_page.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideProperties {
    #[serde(default)]
    pub layout_object_id: Option<String>,
    #[serde(default)]
    pub master_object_id: Option<String>,
    #[serde(default)]
    pub notes_page: Option<Box<Page>>,
}

/// Linear unit used by sizes and transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    #[serde(rename = "EMU")]
    Emu,
    #[serde(rename = "PT")]
    Pt,
    #[serde(rename = "UNIT_UNSPECIFIED", other)]
    Unspecified,
}

/// A magnitude in a given unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(default)]
    pub magnitude: f64,
    #[serde(default)]
    pub unit: Unit,
}

impl Dimension {
    /// A dimension expressed in EMU.
    pub fn emu(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: Unit::Emu,
        }
    }

    /// The magnitude converted to EMU. Unspecified units are read as EMU.
    pub fn to_emu(&self) -> f64 {
        match self.unit {
            Unit::Pt => pt_to_emu(self.magnitude),
            Unit::Emu | Unit::Unspecified => self.magnitude,
        }
    }
}

/// Width/height of an element. Either axis may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
}

impl Size {
    pub fn width_emu(&self) -> f64 {
        self.width.map(|d| d.to_emu()).unwrap_or(0.0)
    }

    pub fn height_emu(&self) -> f64 {
        self.height.map(|d| d.to_emu()).unwrap_or(0.0)
    }
}

/// 2D affine transform placing an element on its page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
    #[serde(default)]
    pub shear_x: f64,
    #[serde(default)]
    pub shear_y: f64,
    #[serde(default)]
    pub translate_x: f64,
    #[serde(default)]
    pub translate_y: f64,
    #[serde(default)]
    pub unit: Unit,
}

fn unit_scale() -> f64 {
    1.0
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            shear_x: 0.0,
            shear_y: 0.0,
            translate_x: 0.0,
            translate_y: 0.0,
            unit: Unit::Emu,
        }
    }

    /// An unscaled transform translated to the given EMU offsets.
    pub fn at(translate_x: f64, translate_y: f64) -> Self {
        Self {
            translate_x,
            translate_y,
            ..Self::identity()
        }
    }

    /// The same transform with its translation expressed in EMU.
    pub fn in_emu(&self) -> Self {
        match self.unit {
            Unit::Pt => Self {
                translate_x: pt_to_emu(self.translate_x),
                translate_y: pt_to_emu(self.translate_y),
                unit: Unit::Emu,
                ..*self
            },
            Unit::Emu | Unit::Unspecified => Self {
                unit: Unit::Emu,
                ..*self
            },
        }
    }
}

/// An element placed on a page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawPageElement")]
pub struct PageElement {
    pub object_id: String,
    pub size: Option<Size>,
    pub transform: Option<Transform>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: ElementKind,
}

/// The variant-specific payload of a page element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Shape(Shape),
    Image(Image),
    Video(Video),
    Table(Table),
    Group(Group),
    /// Lines, charts, word art and anything newer the API grows.
    Other(String),
}

impl PageElement {
    /// Short lowercase label for the element kind.
    pub fn kind_name(&self) -> &str {
        match &self.kind {
            ElementKind::Shape(_) => "shape",
            ElementKind::Image(_) => "image",
            ElementKind::Video(_) => "video",
            ElementKind::Table(_) => "table",
            ElementKind::Group(_) => "group",
            ElementKind::Other(name) => name,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match &self.kind {
            ElementKind::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn as_video(&self) -> Option<&Video> {
        match &self.kind {
            ElementKind::Video(video) => Some(video),
            _ => None,
        }
    }

    /// Size as it appears on the page: intrinsic size times transform scale.
    ///
    /// `None` when the element carries no size at all.
    pub fn rendered_size_emu(&self) -> Option<(f64, f64)> {
        let size = self.size?;
        let transform = self.transform.unwrap_or_default();
        Some((
            size.width_emu() * transform.scale_x.abs(),
            size.height_emu() * transform.scale_y.abs(),
        ))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPageElement {
    #[serde(default)]
    object_id: String,
    size: Option<Size>,
    transform: Option<Transform>,
    title: Option<String>,
    description: Option<String>,
    shape: Option<Shape>,
    image: Option<Image>,
    video: Option<Video>,
    table: Option<Table>,
    element_group: Option<Group>,
    line: Option<serde_json::Value>,
    sheets_chart: Option<serde_json::Value>,
    word_art: Option<serde_json::Value>,
}

impl From<RawPageElement> for PageElement {
    fn from(raw: RawPageElement) -> Self {
        let kind = if let Some(shape) = raw.shape {
            ElementKind::Shape(shape)
        } else if let Some(image) = raw.image {
            ElementKind::Image(image)
        } else if let Some(video) = raw.video {
            ElementKind::Video(video)
        } else if let Some(table) = raw.table {
            ElementKind::Table(table)
        } else if let Some(group) = raw.element_group {
            ElementKind::Group(group)
        } else if raw.line.is_some() {
            ElementKind::Other("line".to_string())
        } else if raw.sheets_chart.is_some() {
            ElementKind::Other("sheets_chart".to_string())
        } else if raw.word_art.is_some() {
            ElementKind::Other("word_art".to_string())
        } else {
            ElementKind::Other("unknown".to_string())
        };

        Self {
            object_id: raw.object_id,
            size: raw.size,
            transform: raw.transform,
            title: raw.title,
            description: raw.description,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    #[serde(default)]
    pub shape_type: Option<String>,
    #[serde(default)]
    pub text: Option<TextContent>,
    #[serde(default)]
    pub placeholder: Option<Placeholder>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    #[serde(rename = "type", default)]
    pub placeholder_type: Option<String>,
    #[serde(default)]
    pub parent_object_id: Option<String>,
}

/// Text held by a shape or table cell.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    #[serde(default)]
    pub text_elements: Vec<TextElement>,
}

impl TextContent {
    /// Concatenated run and auto-text content.
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for element in &self.text_elements {
            if let Some(run) = &element.text_run {
                text.push_str(&run.content);
            } else if let Some(auto) = &element.auto_text {
                text.push_str(&auto.content);
            }
        }
        text
    }

    /// Whether the text holds a live field such as a slide number.
    pub fn has_auto_text(&self) -> bool {
        self.text_elements.iter().any(|e| e.auto_text.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    #[serde(default)]
    pub start_index: Option<i64>,
    #[serde(default)]
    pub end_index: Option<i64>,
    #[serde(default)]
    pub text_run: Option<TextRun>,
    #[serde(default)]
    pub auto_text: Option<AutoText>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TextRun {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AutoText {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default)]
    pub content_url: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub image_properties: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub video_properties: Option<VideoProperties>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoProperties {
    #[serde(default)]
    pub auto_play: Option<bool>,
    #[serde(default)]
    pub start: Option<u64>,
    #[serde(default)]
    pub end: Option<u64>,
    #[serde(default)]
    pub mute: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub rows: u32,
    #[serde(default)]
    pub columns: u32,
    #[serde(default)]
    pub table_rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    #[serde(default)]
    pub table_cells: Vec<TableCell>,
}

/// A table cell. Cells have no object ID; they are addressed by row/column.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    #[serde(default)]
    pub text: Option<TextContent>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub children: Vec<PageElement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_variants_from_api_json() {
        let elements: Vec<PageElement> = serde_json::from_value(serde_json::json!([
            {"objectId": "s1", "shape": {"shapeType": "TEXT_BOX"}},
            {"objectId": "i1", "image": {"contentUrl": "https://x"}},
            {"objectId": "v1", "video": {"id": "abc", "source": "YOUTUBE"}},
            {"objectId": "t1", "table": {"rows": 1, "columns": 1}},
            {"objectId": "g1", "elementGroup": {"children": [
                {"objectId": "g1-a", "shape": {}}
            ]}},
            {"objectId": "l1", "line": {"lineType": "STRAIGHT_LINE"}},
        ]))
        .unwrap();

        let kinds: Vec<&str> = elements.iter().map(|e| e.kind_name()).collect();
        assert_eq!(kinds, vec!["shape", "image", "video", "table", "group", "line"]);

        match &elements[4].kind {
            ElementKind::Group(group) => assert_eq!(group.children[0].object_id, "g1-a"),
            other => panic!("expected group, got {:?}", other),
        }
        assert!(elements[1].as_image().is_some());
        assert!(elements[2].as_video().is_some());
        assert!(elements[0].as_image().is_none());
    }

    #[test]
    fn test_transform_defaults_and_units() {
        let t: Transform =
            serde_json::from_value(serde_json::json!({"translateX": 10.0, "unit": "PT"})).unwrap();
        assert_eq!(t.scale_x, 1.0);
        assert_eq!(t.scale_y, 1.0);
        assert_eq!(t.shear_x, 0.0);
        let emu = t.in_emu();
        assert_eq!(emu.translate_x, 127_000.0);
        assert_eq!(emu.unit, Unit::Emu);
    }

    #[test]
    fn test_unknown_unit_reads_as_unspecified() {
        let d: Dimension =
            serde_json::from_value(serde_json::json!({"magnitude": 5.0, "unit": "INCH"})).unwrap();
        assert_eq!(d.unit, Unit::Unspecified);
        assert_eq!(d.to_emu(), 5.0);
    }

    #[test]
    fn test_rendered_size_applies_scale() {
        let el: PageElement = serde_json::from_value(serde_json::json!({
            "objectId": "i1",
            "size": {
                "width": {"magnitude": 3000000, "unit": "EMU"},
                "height": {"magnitude": 100, "unit": "PT"}
            },
            "transform": {"scaleX": 0.5, "scaleY": 2.0, "unit": "EMU"},
            "image": {}
        }))
        .unwrap();
        let (w, h) = el.rendered_size_emu().unwrap();
        assert_eq!(w, 1_500_000.0);
        assert_eq!(h, 2_540_000.0);
    }

    #[test]
    fn test_size_serializes_only_present_axes() {
        let size = Size {
            width: Some(Dimension::emu(10.0)),
            height: None,
        };
        assert_eq!(
            serde_json::to_value(size).unwrap(),
            serde_json::json!({"width": {"magnitude": 10.0, "unit": "EMU"}})
        );
    }

    #[test]
    fn test_plain_text_concatenates_runs() {
        let text: TextContent = serde_json::from_value(serde_json::json!({
            "textElements": [
                {"endIndex": 6, "paragraphMarker": {}},
                {"endIndex": 6, "textRun": {"content": "Hello "}},
                {"startIndex": 6, "endIndex": 12, "textRun": {"content": "world\n"}},
                {"autoText": {"type": "SLIDE_NUMBER", "content": "3"}}
            ]
        }))
        .unwrap();
        assert_eq!(text.plain_text(), "Hello world\n3");
        assert!(text.has_auto_text());
    }
}
