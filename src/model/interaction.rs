use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use super::engine::{move_by, resize_by};
use super::ratio::AspectRatio;
use crate::sys::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InteractionMode {
    /// Pointer went down on the window body.
    Drag,
    /// Pointer went down on the corner handle.
    Resize,
}

/// Pointer position and rect at the moment an interaction began.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub start_x: f64,
    pub start_y: f64,
    pub start_rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging(Anchor),
    Resizing(Anchor),
}

impl Interaction {
    pub fn is_active(&self) -> bool { !matches!(self, Interaction::Idle) }

    pub fn mode(&self) -> Option<InteractionMode> {
        match self {
            Interaction::Idle => None,
            Interaction::Dragging(_) => Some(InteractionMode::Drag),
            Interaction::Resizing(_) => Some(InteractionMode::Resize),
        }
    }

    /// Starts an interaction from `current`.
    ///
    /// Returns false, leaving the state alone, if either rect is missing or
    /// an interaction is already in progress.
    pub fn begin(
        &mut self,
        mode: InteractionMode,
        x: f64,
        y: f64,
        current: Option<&Rect>,
        system: Option<&Rect>,
    ) -> bool {
        let (Some(current), Some(_)) = (current, system) else { return false };
        if self.is_active() {
            return false;
        }
        let anchor = Anchor { start_x: x, start_y: y, start_rect: *current };
        *self = match mode {
            InteractionMode::Drag => Interaction::Dragging(anchor),
            InteractionMode::Resize => Interaction::Resizing(anchor),
        };
        true
    }

    /// Rect for the pointer at `(x, y)`, or `None` when idle.
    ///
    /// Always computed from the anchor and the total delta since `begin`, so
    /// repeated or reordered events within one interaction give the same
    /// result for the same pointer position.
    pub fn update(
        &self,
        x: f64,
        y: f64,
        scale: f64,
        ratio: Option<AspectRatio>,
        display: &Rect,
    ) -> Option<Rect> {
        let (anchor, resizing) = match self {
            Interaction::Idle => return None,
            Interaction::Dragging(anchor) => (anchor, false),
            Interaction::Resizing(anchor) => (anchor, true),
        };
        let dx = (x - anchor.start_x) / scale;
        let dy = (y - anchor.start_y) / scale;
        Some(if resizing {
            resize_by(&anchor.start_rect, dx, dy, ratio, display)
        } else {
            move_by(&anchor.start_rect, dx, dy, display)
        })
    }

    /// Ends the interaction. Returns whether one was active.
    pub fn end(&mut self) -> bool { std::mem::take(self).is_active() }
}
