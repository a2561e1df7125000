use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle, either display-local or absolute depending on
/// who holds it.
///
/// Fields missing from serialized input are read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f64 { self.left + self.width }

    pub fn bottom(&self) -> f64 { self.top + self.height }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect { left: self.left + dx, top: self.top + dy, ..*self }
    }

    /// Expresses `self` relative to the origin of `origin`.
    pub fn relative_to(&self, origin: &Rect) -> Rect { self.translate(-origin.left, -origin.top) }

    /// Expresses a rect that is relative to `origin` in absolute coordinates.
    pub fn absolute_from(&self, origin: &Rect) -> Rect { self.translate(origin.left, origin.top) }

    pub fn scale(&self, factor: f64) -> Rect {
        Rect {
            left: self.left * factor,
            top: self.top * factor,
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    pub fn round(&self) -> IntRect {
        IntRect {
            left: self.left.round() as i32,
            top: self.top.round() as i32,
            width: self.width.round() as i32,
            height: self.height.round() as i32,
        }
    }

    pub fn has_area(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Integer pixel geometry, the unit host window APIs operate in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl From<IntRect> for Rect {
    fn from(r: IntRect) -> Self {
        Rect::new(r.left as f64, r.top as f64, r.width as f64, r.height as f64)
    }
}

/// Clamps `value` into `[min, max]`.
///
/// Unlike [`f64::clamp`] this never panics: when `min > max` the result is
/// `max`, so a floor larger than the available space yields the available
/// space.
#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 { value.max(min).min(max) }
