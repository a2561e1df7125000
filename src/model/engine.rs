//! Display-local window geometry.
//!
//! All functions here are total: inputs are clamped rather than rejected.
//! Only the display's width and height are read; its origin is ignored since
//! rects are display-local.

use super::ratio::AspectRatio;
use crate::sys::geometry::{Rect, clamp};

/// Smallest size [`fit`] will produce.
pub const FIT_MIN_WIDTH: f64 = 120.0;
pub const FIT_MIN_HEIGHT: f64 = 100.0;

/// Smallest size a user resize will produce.
pub const RESIZE_MIN_WIDTH: f64 = 160.0;
pub const RESIZE_MIN_HEIGHT: f64 = 120.0;

pub const DEFAULT_PREVIEW_MAX_HEIGHT: f64 = 260.0;

/// Normalizes `rect` to fit inside `display`, applying `ratio` if given.
///
/// With a ratio the width is kept and the height derived from it; if that
/// makes the rect taller than the display the height is capped and the
/// width derived instead.
pub fn fit(rect: &Rect, display: &Rect, ratio: Option<AspectRatio>) -> Rect {
    let mut width = rect.width;
    let mut height = rect.height;

    if let Some(ratio) = ratio.map(AspectRatio::get) {
        height = width / ratio;
        if height > display.height {
            height = display.height;
            width = height * ratio;
        }
    }

    let width = clamp(width, FIT_MIN_WIDTH, display.width);
    let height = clamp(height, FIT_MIN_HEIGHT, display.height);

    Rect {
        left: clamp(rect.left, 0.0, display.width - width),
        top: clamp(rect.top, 0.0, display.height - height),
        width,
        height,
    }
}

/// Grows `start` from its top-left corner by a pointer delta in display units.
///
/// Under a ratio the axis with the larger delta drives the resize (width wins
/// ties), so the driving axis can switch mid-drag as the pointer direction
/// changes.
pub fn resize_by(
    start: &Rect,
    dx: f64,
    dy: f64,
    ratio: Option<AspectRatio>,
    display: &Rect,
) -> Rect {
    let avail_width = display.width - start.left;
    let avail_height = display.height - start.top;

    let mut width = start.width + dx;
    let mut height = start.height + dy;

    if let Some(ratio) = ratio.map(AspectRatio::get) {
        if dx.abs() >= dy.abs() {
            width = clamp(start.width + dx, RESIZE_MIN_WIDTH, avail_width);
            height = width / ratio;
        } else {
            height = clamp(start.height + dy, RESIZE_MIN_HEIGHT, avail_height);
            width = height * ratio;
        }

        if width > avail_width {
            width = avail_width;
            height = width / ratio;
        }
        if height > avail_height {
            height = avail_height;
            width = height * ratio;
        }
    }

    Rect {
        width: clamp(width, RESIZE_MIN_WIDTH, avail_width),
        height: clamp(height, RESIZE_MIN_HEIGHT, avail_height),
        ..*start
    }
}

/// Translates `start`, keeping it fully inside `display`.
pub fn move_by(start: &Rect, dx: f64, dy: f64, display: &Rect) -> Rect {
    Rect {
        left: clamp(start.left + dx, 0.0, display.width - start.width),
        top: clamp(start.top + dy, 0.0, display.height - start.height),
        ..*start
    }
}

/// Scale that makes a `system` sized preview fit in the container.
///
/// Without a system rect or a measured container this is 1. Pointer deltas
/// are divided by the result, so it is always positive and finite.
pub fn preview_scale(system: Option<&Rect>, container_width: f64, max_height: f64) -> f64 {
    let Some(system) = system else { return 1.0 };
    if container_width == 0.0 || !container_width.is_finite() || !system.has_area() {
        return 1.0;
    }
    let scale = f64::min(container_width / system.width, max_height / system.height);
    if scale.is_finite() && scale > 0.0 { scale } else { 1.0 }
}
