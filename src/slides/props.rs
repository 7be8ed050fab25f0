//! Caller-facing geometry and property inputs.
//!
//! The `*Changes` types are what tools deserialize from parameters; the
//! `*Edit` types are their validated forms, produced by
//! `slides::validate` and consumed by `slides::builders`.

use serde::Deserialize;

/// Top-left corner in points.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Target size in points. Each axis is independently optional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct SizeInput {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl SizeInput {
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }
}

/// Crop offsets as fractions of the image edge, 0..=1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Crop {
    #[serde(default)]
    pub left: Option<f64>,
    #[serde(default)]
    pub right: Option<f64>,
    #[serde(default)]
    pub top: Option<f64>,
    #[serde(default)]
    pub bottom: Option<f64>,
}

impl Crop {
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.top.is_none() && self.bottom.is_none()
    }
}

/// Recolor effect for an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recolor {
    /// Remove any recolor effect.
    Clear,
    /// A named preset, upper-cased as the API expects (e.g. `GRAYSCALE`).
    Preset(String),
}

/// Requested image changes, as supplied by the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageChanges {
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub size: Option<SizeInput>,
    #[serde(default)]
    pub brightness: Option<f64>,
    #[serde(default)]
    pub contrast: Option<f64>,
    #[serde(default)]
    pub transparency: Option<f64>,
    #[serde(default)]
    pub crop: Option<Crop>,
    #[serde(default)]
    pub recolor: Option<String>,
}

/// Validated image changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageEdit {
    pub position: Option<Position>,
    pub size: Option<SizeInput>,
    pub brightness: Option<f64>,
    pub contrast: Option<f64>,
    pub transparency: Option<f64>,
    pub crop: Option<Crop>,
    pub recolor: Option<Recolor>,
}

impl ImageEdit {
    pub fn touches_transform(&self) -> bool {
        self.position.is_some() || self.size.is_some()
    }

    pub fn touches_properties(&self) -> bool {
        self.brightness.is_some()
            || self.contrast.is_some()
            || self.transparency.is_some()
            || self.crop.is_some()
            || self.recolor.is_some()
    }
}

/// Requested video changes, as supplied by the caller. Times are seconds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoChanges {
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub size: Option<SizeInput>,
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub autoplay: Option<bool>,
    #[serde(default)]
    pub mute: Option<bool>,
}

/// Validated video changes. Times are milliseconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoEdit {
    pub position: Option<Position>,
    pub size: Option<SizeInput>,
    pub start_ms: Option<u64>,
    pub end_ms: Option<u64>,
    pub autoplay: Option<bool>,
    pub mute: Option<bool>,
}

impl VideoEdit {
    pub fn touches_transform(&self) -> bool {
        self.position.is_some() || self.size.is_some()
    }

    pub fn touches_properties(&self) -> bool {
        self.start_ms.is_some()
            || self.end_ms.is_some()
            || self.autoplay.is_some()
            || self.mute.is_some()
    }
}
