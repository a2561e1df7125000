//! The host windowing API the resizer drives.
//!
//! Everything platform-specific lives behind [`WindowHost`]. The session only
//! ever talks to the host through this trait, so tests substitute a stub and
//! the CLI substitutes a JSON snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;

use super::geometry::{IntRect, Rect};
use super::screen::DisplayInfo;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(i64);

impl WindowId {
    pub fn new(id: i64) -> WindowId { WindowId(id) }

    pub fn get(&self) -> i64 { self.0 }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl std::str::FromStr for WindowId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { s.trim().parse().map(WindowId) }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(i64);

impl TabId {
    pub fn new(id: i64) -> TabId { TabId(id) }

    pub fn get(&self) -> i64 { self.0 }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WindowKind {
    #[default]
    Normal,
    Popup,
    Panel,
    App,
    Devtools,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostWindow {
    pub id: WindowId,
    #[serde(default, rename = "type")]
    pub kind: WindowKind,
    #[serde(flatten)]
    pub rect: Rect,
}

/// Geometry and focus request for [`WindowHost::update_window`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowUpdate {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub focused: bool,
}

impl WindowUpdate {
    pub fn focused(rect: IntRect) -> Self {
        Self {
            left: rect.left,
            top: rect.top,
            width: rect.width,
            height: rect.height,
            focused: true,
        }
    }

    pub fn rect(&self) -> IntRect {
        IntRect {
            left: self.left,
            top: self.top,
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("no window with id {0}")]
    NoSuchWindow(WindowId),
    #[error("no tab with id {0:?}")]
    NoSuchTab(TabId),
    #[error("host does not support {0}")]
    Unsupported(&'static str),
    #[error("host rejected request: {0}")]
    Rejected(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[allow(async_fn_in_trait)]
pub trait WindowHost {
    async fn get_window(&self, id: WindowId) -> Result<HostWindow, HostError>;

    /// The window hosting the resizer itself.
    async fn current_window(&self) -> Result<HostWindow, HostError>;

    /// All attached displays. Empty when the host cannot enumerate them.
    async fn list_displays(&self) -> Result<Vec<DisplayInfo>, HostError>;

    async fn update_window(&self, id: WindowId, update: WindowUpdate) -> Result<(), HostError>;

    /// The tab hosting the resizer, if it runs inside one.
    async fn current_tab(&self) -> Result<Option<TabId>, HostError>;

    async fn close_tab(&self, tab: TabId) -> Result<(), HostError>;

    async fn close_window(&self, id: WindowId) -> Result<(), HostError>;

    /// Asks the resizer page to close itself.
    async fn close_self(&self) -> Result<(), HostError>;

    /// Size of the screen, used when no displays are reported.
    fn screen_size(&self) -> (f64, f64);
}
