//! Point/EMU conversion and size-driven scale factors.
//!
//! Positions and sizes are authored in points (1 inch = 72 points).
//! The Slides API measures geometry in EMU (English Metric Units).

/// EMU per point.
pub const EMU_PER_POINT: f64 = 12_700.0;

/// Points to EMU.
pub fn pt_to_emu(pt: f64) -> f64 {
    pt * EMU_PER_POINT
}

/// EMU to points.
pub fn emu_to_pt(emu: f64) -> f64 {
    emu / EMU_PER_POINT
}

/// Why a size-driven scale could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ScaleError {
    #[error("element has no measurable width")]
    ZeroWidth,

    #[error("element has no measurable height")]
    ZeroHeight,

    #[error("no target width or height given")]
    NoTarget,
}

/// Compute the scale factors that bring an element currently rendered at
/// `current_width` x `current_height` EMU to the target size in points.
///
/// With only one target dimension the other factor copies it, so the
/// element keeps its aspect ratio. The factors are relative: callers
/// multiply them into the transform's existing scale.
pub fn scale_for_target_size(
    current_width: f64,
    current_height: f64,
    target_width_pt: Option<f64>,
    target_height_pt: Option<f64>,
) -> Result<(f64, f64), ScaleError> {
    if target_width_pt.is_none() && target_height_pt.is_none() {
        return Err(ScaleError::NoTarget);
    }
    if target_width_pt.is_some() && !is_measurable(current_width) {
        return Err(ScaleError::ZeroWidth);
    }
    if target_height_pt.is_some() && !is_measurable(current_height) {
        return Err(ScaleError::ZeroHeight);
    }

    let factor_x = target_width_pt.map(|w| pt_to_emu(w) / current_width);
    let factor_y = target_height_pt.map(|h| pt_to_emu(h) / current_height);

    match (factor_x, factor_y) {
        (Some(x), Some(y)) => Ok((x, y)),
        (Some(x), None) => Ok((x, x)),
        (None, Some(y)) => Ok((y, y)),
        (None, None) => Err(ScaleError::NoTarget),
    }
}

fn is_measurable(value: f64) -> bool {
    value.is_finite() && value.abs() > f64::EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pt_to_emu_is_linear() {
        for pt in [0.0, 1.0, 72.0, 100.0, 150.5, 720.0] {
            assert_eq!(pt_to_emu(pt), pt * 12_700.0);
        }
        assert_eq!(pt_to_emu(100.0), 1_270_000.0);
        assert_eq!(pt_to_emu(50.0), 635_000.0);
    }

    #[test]
    fn test_emu_to_pt_inverts() {
        assert_eq!(emu_to_pt(pt_to_emu(200.0)), 200.0);
    }

    #[test]
    fn test_scale_both_axes_independent() {
        // 100pt x 50pt element scaled to 200pt x 200pt
        let (sx, sy) =
            scale_for_target_size(pt_to_emu(100.0), pt_to_emu(50.0), Some(200.0), Some(200.0))
                .unwrap();
        assert!((sx - 2.0).abs() < 1e-9);
        assert!((sy - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_scale_width_only_keeps_aspect() {
        let (sx, sy) =
            scale_for_target_size(pt_to_emu(100.0), pt_to_emu(50.0), Some(50.0), None).unwrap();
        assert!((sx - 0.5).abs() < 1e-9);
        assert_eq!(sx, sy);
    }

    #[test]
    fn test_scale_height_only_keeps_aspect() {
        let (sx, sy) =
            scale_for_target_size(pt_to_emu(100.0), pt_to_emu(50.0), None, Some(150.0)).unwrap();
        assert!((sy - 3.0).abs() < 1e-9);
        assert_eq!(sx, sy);
    }

    #[test]
    fn test_scale_never_divides_by_zero() {
        assert_eq!(
            scale_for_target_size(0.0, 100.0, Some(10.0), None),
            Err(ScaleError::ZeroWidth)
        );
        assert_eq!(
            scale_for_target_size(100.0, 0.0, None, Some(10.0)),
            Err(ScaleError::ZeroHeight)
        );
        assert_eq!(
            scale_for_target_size(100.0, 100.0, None, None),
            Err(ScaleError::NoTarget)
        );
    }

    #[test]
    fn test_zero_height_ignored_when_only_width_targeted() {
        // Only the targeted axis must be measurable.
        let (sx, sy) = scale_for_target_size(100.0, 0.0, Some(1.0), None).unwrap();
        assert_eq!(sx, sy);
    }
}
