//! Input contracts checked before any remote call.
//!
//! Every check returns the matching [`ToolError`] kind so a tool can fail
//! fast with `?` and no side effects.

use std::sync::OnceLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

use crate::error::ToolError;
use crate::slides::detect::{ImageFormat, detect_image_format};
use crate::slides::model::{Page, Presentation};
use crate::slides::props::{
    Crop, ImageChanges, ImageEdit, Position, Recolor, SizeInput, VideoChanges, VideoEdit,
};

/// Require a non-empty Drive/Slides file ID.
pub fn presentation_id(raw: &str) -> Result<&str, ToolError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(ToolError::InvalidPresentationId(
            "presentation_id is required".to_string(),
        ));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ToolError::InvalidPresentationId(format!(
            "'{}' contains characters not allowed in a file ID",
            id
        )));
    }
    Ok(id)
}

/// Require a non-empty page element or page object ID.
pub fn object_id(raw: &str) -> Result<&str, ToolError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(ToolError::InvalidObjectId("object_id is required".to_string()));
    }
    Ok(id)
}

/// A caller's reference to one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideRef {
    /// 1-based position in the deck.
    Index(usize),
    Id(String),
}

/// Build a slide reference from exactly one of a 1-based index or an ID.
pub fn slide_ref(index: Option<i64>, id: Option<&str>) -> Result<SlideRef, ToolError> {
    let id = id.map(str::trim);
    match (index, id) {
        (Some(_), Some(id)) if !id.is_empty() => Err(ToolError::InvalidSlideReference(
            "provide either slide_index or slide_id, not both".to_string(),
        )),
        (Some(index), _) if index < 1 => Err(ToolError::InvalidSlideReference(format!(
            "slide_index must be 1 or greater, got {}",
            index
        ))),
        (Some(index), _) => Ok(SlideRef::Index(index as usize)),
        (None, Some(id)) if !id.is_empty() => Ok(SlideRef::Id(id.to_string())),
        (None, _) => Err(ToolError::InvalidSlideReference(
            "slide_index (1-based) or slide_id is required".to_string(),
        )),
    }
}

/// Resolve a slide reference, returning the slide's 0-based index.
pub fn resolve_slide<'a>(
    presentation: &'a Presentation,
    slide: &SlideRef,
) -> Result<(usize, &'a Page), ToolError> {
    match slide {
        SlideRef::Index(index) => presentation
            .slides
            .get(index - 1)
            .map(|page| (index - 1, page))
            .ok_or_else(|| {
                ToolError::SlideNotFound(format!(
                    "slide index {} is out of range (presentation has {} slides)",
                    index,
                    presentation.slides.len()
                ))
            }),
        SlideRef::Id(id) => presentation
            .slide_by_id(id)
            .ok_or_else(|| ToolError::SlideNotFound(format!("no slide with ID '{}'", id))),
    }
}

/// Decoded and sniffed image payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

/// Decode base64 image data and confirm it is a supported image.
///
/// Accepts bare base64 or a `data:<mime>;base64,` URL. Empty input, bad
/// base64, and unrecognized bytes all fail as invalid image data.
pub fn image_data(raw: &str) -> Result<DecodedImage, ToolError> {
    let trimmed = raw.trim();
    let payload = match trimmed.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => trimmed,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(ToolError::InvalidImageData("image data is empty".to_string()));
    }

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ToolError::InvalidImageData(format!("image data is not valid base64: {}", e)))?;

    let format = detect_image_format(&bytes).ok_or_else(|| {
        ToolError::InvalidImageData(
            "unrecognized image format (expected PNG, JPEG, GIF, WebP, or BMP)".to_string(),
        )
    })?;

    Ok(DecodedImage { bytes, format })
}

/// Coordinates must be finite and non-negative.
pub fn position(position: &Position) -> Result<(), ToolError> {
    for (name, value) in [("x", position.x), ("y", position.y)] {
        if !value.is_finite() || value < 0.0 {
            return Err(ToolError::InvalidPosition(format!(
                "{} must be a non-negative number of points, got {}",
                name, value
            )));
        }
    }
    Ok(())
}

/// At least one dimension, and every given dimension strictly positive.
pub fn size(size: &SizeInput) -> Result<(), ToolError> {
    if size.is_empty() {
        return Err(ToolError::InvalidSize(
            "size must set width and/or height".to_string(),
        ));
    }
    for (name, value) in [("width", size.width), ("height", size.height)] {
        if let Some(value) = value
            && (!value.is_finite() || value <= 0.0)
        {
            return Err(ToolError::InvalidSize(format!(
                "{} must be greater than 0 points, got {}",
                name, value
            )));
        }
    }
    Ok(())
}

fn in_range(value: f64, min: f64, max: f64) -> bool {
    value.is_finite() && value >= min && value <= max
}

pub fn brightness(value: f64) -> Result<(), ToolError> {
    if !in_range(value, -1.0, 1.0) {
        return Err(ToolError::InvalidBrightness(format!(
            "brightness must be between -1 and 1, got {}",
            value
        )));
    }
    Ok(())
}

pub fn contrast(value: f64) -> Result<(), ToolError> {
    if !in_range(value, -1.0, 1.0) {
        return Err(ToolError::InvalidContrast(format!(
            "contrast must be between -1 and 1, got {}",
            value
        )));
    }
    Ok(())
}

pub fn transparency(value: f64) -> Result<(), ToolError> {
    if !in_range(value, 0.0, 1.0) {
        return Err(ToolError::InvalidTransparency(format!(
            "transparency must be between 0 and 1, got {}",
            value
        )));
    }
    Ok(())
}

/// Each edge in 0..=1 and opposite edges leaving some image visible.
pub fn crop(crop: &Crop) -> Result<(), ToolError> {
    if crop.is_empty() {
        return Err(ToolError::InvalidCrop(
            "crop must set at least one of left, right, top, bottom".to_string(),
        ));
    }
    for (name, value) in [
        ("left", crop.left),
        ("right", crop.right),
        ("top", crop.top),
        ("bottom", crop.bottom),
    ] {
        if let Some(value) = value
            && !in_range(value, 0.0, 1.0)
        {
            return Err(ToolError::InvalidCrop(format!(
                "{} offset must be between 0 and 1, got {}",
                name, value
            )));
        }
    }
    if crop.left.unwrap_or(0.0) + crop.right.unwrap_or(0.0) >= 1.0 {
        return Err(ToolError::InvalidCrop(
            "left + right offsets must leave part of the image visible".to_string(),
        ));
    }
    if crop.top.unwrap_or(0.0) + crop.bottom.unwrap_or(0.0) >= 1.0 {
        return Err(ToolError::InvalidCrop(
            "top + bottom offsets must leave part of the image visible".to_string(),
        ));
    }
    Ok(())
}

const RECOLOR_NAMED: &[&str] = &["GRAYSCALE", "SEPIA", "NEGATIVE"];

/// Parse a recolor value (case-insensitive). `none` clears the effect.
pub fn recolor(raw: &str) -> Result<Recolor, ToolError> {
    let upper = raw.trim().to_ascii_uppercase();
    if upper == "NONE" {
        return Ok(Recolor::Clear);
    }
    if RECOLOR_NAMED.contains(&upper.as_str()) || is_numbered_preset(&upper) {
        return Ok(Recolor::Preset(upper));
    }
    Err(ToolError::InvalidRecolor(format!(
        "'{}' is not a recolor preset (none, grayscale, sepia, negative, light1-light10, dark1-dark10)",
        raw
    )))
}

fn is_numbered_preset(upper: &str) -> bool {
    let digits = upper
        .strip_prefix("LIGHT")
        .or_else(|| upper.strip_prefix("DARK"));
    matches!(digits.and_then(|d| d.parse::<u8>().ok()), Some(1..=10))
        && digits.is_some_and(|d| !d.starts_with('0'))
}

/// Seconds to whole milliseconds.
fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds * 1000.0).round() as u64
}

/// Playback window in seconds: non-negative, end not before start.
pub fn time_range(start: Option<f64>, end: Option<f64>) -> Result<(), ToolError> {
    for (name, value) in [("start_time", start), ("end_time", end)] {
        if let Some(value) = value
            && (!value.is_finite() || value < 0.0)
        {
            return Err(ToolError::InvalidTimeRange(format!(
                "{} must be a non-negative number of seconds, got {}",
                name, value
            )));
        }
    }
    if let (Some(start), Some(end)) = (start, end)
        && end < start
    {
        return Err(ToolError::InvalidTimeRange(format!(
            "end_time ({}) must not be before start_time ({})",
            end, start
        )));
    }
    Ok(())
}

/// Validate requested image changes.
pub fn image_changes(changes: &ImageChanges) -> Result<ImageEdit, ToolError> {
    if let Some(p) = &changes.position {
        position(p)?;
    }
    if let Some(s) = &changes.size {
        size(s)?;
    }
    if let Some(b) = changes.brightness {
        brightness(b)?;
    }
    if let Some(c) = changes.contrast {
        contrast(c)?;
    }
    if let Some(t) = changes.transparency {
        transparency(t)?;
    }
    if let Some(c) = &changes.crop {
        crop(c)?;
    }
    let recolor = changes.recolor.as_deref().map(recolor).transpose()?;

    let edit = ImageEdit {
        position: changes.position,
        size: changes.size,
        brightness: changes.brightness,
        contrast: changes.contrast,
        transparency: changes.transparency,
        crop: changes.crop,
        recolor,
    };

    if !edit.touches_transform() && !edit.touches_properties() {
        return Err(ToolError::NoPropertiesToModify(
            "properties must set at least one of position, size, brightness, contrast, \
             transparency, crop, recolor"
                .to_string(),
        ));
    }
    Ok(edit)
}

/// Validate requested video changes, converting times to milliseconds.
pub fn video_changes(changes: &VideoChanges) -> Result<VideoEdit, ToolError> {
    if let Some(p) = &changes.position {
        position(p)?;
    }
    if let Some(s) = &changes.size {
        size(s)?;
    }
    time_range(changes.start_time, changes.end_time)?;

    let edit = VideoEdit {
        position: changes.position,
        size: changes.size,
        start_ms: changes.start_time.map(seconds_to_ms),
        end_ms: changes.end_time.map(seconds_to_ms),
        autoplay: changes.autoplay,
        mute: changes.mute,
    };

    if !edit.touches_transform() && !edit.touches_properties() {
        return Err(ToolError::NoPropertiesToModify(
            "properties must set at least one of position, size, start_time, end_time, \
             autoplay, mute"
                .to_string(),
        ));
    }
    Ok(edit)
}

/// Slide transition effects callers may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionType {
    None,
    Fade,
    SlideFromRight,
    SlideFromLeft,
    Flip,
    Cube,
    Gallery,
    Zoom,
    Dissolve,
}

impl TransitionType {
    pub const ALL: [TransitionType; 9] = [
        Self::None,
        Self::Fade,
        Self::SlideFromRight,
        Self::SlideFromLeft,
        Self::Flip,
        Self::Cube,
        Self::Gallery,
        Self::Zoom,
        Self::Dissolve,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Fade => "FADE",
            Self::SlideFromRight => "SLIDE_FROM_RIGHT",
            Self::SlideFromLeft => "SLIDE_FROM_LEFT",
            Self::Flip => "FLIP",
            Self::Cube => "CUBE",
            Self::Gallery => "GALLERY",
            Self::Zoom => "ZOOM",
            Self::Dissolve => "DISSOLVE",
        }
    }
}

/// Parse a transition type (case-insensitive).
pub fn transition_type(raw: &str) -> Result<TransitionType, ToolError> {
    let upper = raw.trim().to_ascii_uppercase();
    TransitionType::ALL
        .into_iter()
        .find(|t| t.as_str() == upper)
        .ok_or_else(|| {
            let allowed: Vec<&str> = TransitionType::ALL.iter().map(|t| t.as_str()).collect();
            ToolError::InvalidTransitionType(format!(
                "'{}' is not one of {}",
                raw,
                allowed.join(", ")
            ))
        })
}

/// Longest transition the tools accept, in seconds.
pub const MAX_TRANSITION_SECONDS: f64 = 5.0;

pub fn transition_duration(seconds: f64) -> Result<(), ToolError> {
    if !seconds.is_finite() || seconds <= 0.0 || seconds > MAX_TRANSITION_SECONDS {
        return Err(ToolError::InvalidTransitionDuration(format!(
            "duration must be greater than 0 and at most {} seconds, got {}",
            MAX_TRANSITION_SECONDS, seconds
        )));
    }
    Ok(())
}

static LANGUAGE_CODE: OnceLock<Regex> = OnceLock::new();

/// BCP-47-ish language code: `en`, `pt-BR`, `zh-Hant`.
pub fn language(raw: &str) -> Result<String, ToolError> {
    let code = raw.trim();
    let re =
        LANGUAGE_CODE.get_or_init(|| Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,4})?$").unwrap());
    if !re.is_match(code) {
        return Err(ToolError::InvalidLanguage(format!(
            "'{}' is not a language code (e.g. 'es', 'pt-BR')",
            raw
        )));
    }
    Ok(code.to_string())
}

/// Longest title accepted for a new or copied presentation.
pub const MAX_TITLE_CHARS: usize = 255;

pub fn title(raw: &str) -> Result<&str, ToolError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ToolError::InvalidTitle("title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ToolError::InvalidTitle(format!(
            "title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }
    Ok(title)
}
