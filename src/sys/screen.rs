use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::geometry::Rect;
use super::host::{HostError, WindowHost, WindowId};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayId(String);

impl DisplayId {
    pub fn new(id: impl Into<String>) -> Self { DisplayId(id.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInfo {
    pub id: DisplayId,
    pub bounds: Rect,
    #[serde(default)]
    pub work_area: Rect,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
    #[serde(default)]
    pub is_primary: bool,
}

fn default_scale_factor() -> f64 { 1.0 }

/// Where the target window sits, resolved once per session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Located {
    pub window: WindowId,
    /// Bounds of the chosen display, absolute.
    pub system_rect: Rect,
    /// The window rect relative to `system_rect`'s origin.
    pub window_rect: Rect,
    /// `None` when the host reported no usable displays and the screen
    /// size was used instead.
    pub display: Option<DisplayId>,
}

/// Picks the display whose bounds contain the window's top-left corner,
/// falling back to the primary display and then to the first one.
///
/// Displays without a positive area are never picked.
pub fn pick_display_for_window<'a>(
    displays: &'a [DisplayInfo],
    window: Option<&Rect>,
) -> Option<&'a DisplayInfo> {
    let candidates: Vec<&DisplayInfo> = displays
        .iter()
        .filter(|d| {
            let ok = d.bounds.has_area();
            if !ok {
                warn!("Skipping display {} with degenerate bounds {:?}", d.id, d.bounds);
            }
            ok
        })
        .collect();

    if let Some(window) = window {
        if let Some(hit) = candidates
            .iter()
            .find(|d| d.bounds.contains_point(window.left, window.top))
        {
            return Some(*hit);
        }
    }
    candidates
        .iter()
        .find(|d| d.is_primary)
        .or_else(|| candidates.first())
        .copied()
}

/// Resolves the display for an absolute window rect.
///
/// With no usable display, a synthetic display of `screen` size at the origin
/// is used and the window rect is taken as already display-local.
pub fn locate_in(
    window: WindowId,
    window_rect: Rect,
    displays: &[DisplayInfo],
    screen: (f64, f64),
) -> Result<Located> {
    if let Some(picked) = pick_display_for_window(displays, Some(&window_rect)) {
        debug!(display = %picked.id, bounds = ?picked.bounds, "picked display");
        return Ok(Located {
            window,
            system_rect: picked.bounds,
            window_rect: window_rect.relative_to(&picked.bounds),
            display: Some(picked.id.clone()),
        });
    }

    let (width, height) = screen;
    let fallback = Rect::new(0.0, 0.0, width, height);
    if !fallback.has_area() {
        return Err(Error::NoUsableDisplay { width, height });
    }
    debug!(?fallback, "no displays reported, using screen size");
    Ok(Located {
        window,
        system_rect: fallback,
        window_rect,
        display: None,
    })
}

/// Looks up `window` (or the current window) and the display it lives on.
#[instrument(skip(host))]
pub async fn locate<H: WindowHost>(host: &H, window: Option<WindowId>) -> Result<Located> {
    let info = match window {
        Some(id) => host.get_window(id).await.map_err(|err| match err {
            HostError::NoSuchWindow(id) => Error::WindowNotFound(id),
            other => Error::Host(other),
        })?,
        None => host.current_window().await?,
    };
    let displays = host.list_displays().await?;
    locate_in(info.id, info.rect, &displays, host.screen_size())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sys::host::WindowKind;
    use crate::sys::host::stub::StubHost;

    fn display(id: &str, left: f64, width: f64, primary: bool) -> DisplayInfo {
        let bounds = Rect::new(left, 0.0, width, 1080.0);
        DisplayInfo {
            id: DisplayId::new(id),
            bounds,
            work_area: bounds,
            scale_factor: 1.0,
            is_primary: primary,
        }
    }

    #[test]
    fn picks_display_containing_top_left() {
        let displays = vec![display("a", 0.0, 1920.0, true), display("b", 1920.0, 1920.0, false)];
        let window = Rect::new(2000.0, 10.0, 800.0, 600.0);
        let picked = pick_display_for_window(&displays, Some(&window)).unwrap();
        assert_eq!(picked.id.as_str(), "b");
    }

    #[test]
    fn falls_back_to_primary_then_first() {
        let displays = vec![display("a", 0.0, 1920.0, false), display("b", 1920.0, 1920.0, true)];
        let offscreen = Rect::new(-500.0, -500.0, 100.0, 100.0);
        assert_eq!(pick_display_for_window(&displays, Some(&offscreen)).unwrap().id.as_str(), "b");

        let displays = vec![display("a", 0.0, 1920.0, false), display("b", 1920.0, 1920.0, false)];
        assert_eq!(pick_display_for_window(&displays, Some(&offscreen)).unwrap().id.as_str(), "a");
        assert!(pick_display_for_window(&[], Some(&offscreen)).is_none());
    }

    #[test]
    fn overlapping_displays_resolve_by_list_order() {
        let displays = vec![display("a", 0.0, 1920.0, false), display("b", 0.0, 1920.0, true)];
        let window = Rect::new(10.0, 10.0, 100.0, 100.0);
        assert_eq!(pick_display_for_window(&displays, Some(&window)).unwrap().id.as_str(), "a");
    }

    #[test]
    fn skips_degenerate_displays() {
        let displays = vec![display("gone", 0.0, 0.0, true), display("b", 1920.0, 1920.0, false)];
        let window = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(pick_display_for_window(&displays, Some(&window)).unwrap().id.as_str(), "b");
    }

    #[test]
    fn translates_window_into_display_coordinates() {
        let displays = vec![display("a", 0.0, 1920.0, true), display("b", 1920.0, 1920.0, false)];
        let located = locate_in(
            WindowId::new(7),
            Rect::new(2000.0, 10.0, 800.0, 600.0),
            &displays,
            (0.0, 0.0),
        )
        .unwrap();
        assert_eq!(located.system_rect, Rect::new(1920.0, 0.0, 1920.0, 1080.0));
        assert_eq!(located.window_rect, Rect::new(80.0, 10.0, 800.0, 600.0));
        assert_eq!(located.display, Some(DisplayId::new("b")));
    }

    #[test]
    fn uses_screen_size_without_displays() {
        let rect = Rect::new(30.0, 40.0, 800.0, 600.0);
        let located = locate_in(WindowId::new(1), rect, &[], (1440.0, 900.0)).unwrap();
        assert_eq!(located.system_rect, Rect::new(0.0, 0.0, 1440.0, 900.0));
        assert_eq!(located.window_rect, rect);
        assert_eq!(located.display, None);

        let err = locate_in(WindowId::new(1), rect, &[], (0.0, 900.0)).unwrap_err();
        assert!(matches!(err, Error::NoUsableDisplay { .. }));
    }

    #[tokio::test]
    async fn missing_window_is_reported() {
        let host = StubHost::default();
        let err = locate(&host, Some(WindowId::new(42))).await.unwrap_err();
        assert!(matches!(err, Error::WindowNotFound(id) if id == WindowId::new(42)));
    }

    #[tokio::test]
    async fn falls_back_to_current_window() {
        let host = StubHost {
            windows: vec![StubHost::window(3, WindowKind::Normal, Rect::new(
                100.0, 100.0, 640.0, 480.0,
            ))],
            current: Some(WindowId::new(3)),
            displays: vec![display("a", 0.0, 1920.0, true)],
            ..Default::default()
        };
        let located = locate(&host, None).await.unwrap();
        assert_eq!(located.window, WindowId::new(3));
        assert_eq!(located.window_rect, Rect::new(100.0, 100.0, 640.0, 480.0));
    }
}
