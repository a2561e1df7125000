use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::engine::{self, DEFAULT_PREVIEW_MAX_HEIGHT};
use super::interaction::{Interaction, InteractionMode};
use super::prefs::{CLOSE_ON_APPLY_KEY, PreferenceStore, TARGET_WINDOW_KEY};
use super::ratio::{AspectRatio, CustomRatio, RatioSelection};
use super::status::Status;
use crate::sys::geometry::Rect;
use crate::sys::host::{HostError, WindowHost, WindowId, WindowKind, WindowUpdate};
use crate::sys::screen::{self, Located};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Window to resize. When absent, the stored target is used.
    pub target: Option<WindowId>,
    pub selection: RatioSelection,
    pub custom: CustomRatio,
    pub container_width: f64,
    pub max_preview_height: f64,
    /// Used when no preference has been stored yet.
    pub close_on_apply: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            target: None,
            selection: RatioSelection::Free,
            custom: CustomRatio::default(),
            container_width: 0.0,
            max_preview_height: DEFAULT_PREVIEW_MAX_HEIGHT,
            close_on_apply: true,
        }
    }
}

/// Scaled rects for drawing the preview.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub scale: f64,
    pub screen_width: f64,
    pub screen_height: f64,
    pub window: Option<Rect>,
}

/// One resizer window's worth of state.
pub struct ResizerSession<H, P> {
    host: H,
    prefs: P,
    target: Option<WindowId>,
    located: Option<Located>,
    system_rect: Option<Rect>,
    virtual_rect: Option<Rect>,
    interaction: Interaction,
    selection: RatioSelection,
    custom: CustomRatio,
    close_on_apply: bool,
    status: Option<Status>,
    container_width: f64,
    max_preview_height: f64,
}

impl<H: WindowHost, P: PreferenceStore> ResizerSession<H, P> {
    pub fn new(host: H, prefs: P, options: SessionOptions) -> Self {
        let close_on_apply = prefs.get_bool(CLOSE_ON_APPLY_KEY).unwrap_or(options.close_on_apply);
        let target = options
            .target
            .or_else(|| prefs.get_i64(TARGET_WINDOW_KEY).map(WindowId::new));
        debug!(?target, close_on_apply, "starting resizer session");
        Self {
            host,
            prefs,
            target,
            located: None,
            system_rect: None,
            virtual_rect: None,
            interaction: Interaction::Idle,
            selection: options.selection,
            custom: options.custom,
            close_on_apply,
            status: None,
            container_width: options.container_width,
            max_preview_height: options.max_preview_height,
        }
    }

    pub fn host(&self) -> &H { &self.host }

    pub fn target(&self) -> Option<WindowId> { self.target }

    pub fn located(&self) -> Option<&Located> { self.located.as_ref() }

    pub fn system_rect(&self) -> Option<&Rect> { self.system_rect.as_ref() }

    pub fn virtual_rect(&self) -> Option<&Rect> { self.virtual_rect.as_ref() }

    pub fn interaction(&self) -> &Interaction { &self.interaction }

    pub fn status(&self) -> Option<&Status> { self.status.as_ref() }

    pub fn close_on_apply(&self) -> bool { self.close_on_apply }

    pub fn selection(&self) -> RatioSelection { self.selection }

    pub fn custom(&self) -> CustomRatio { self.custom }

    pub fn ratio(&self) -> Option<AspectRatio> { self.selection.resolve(&self.custom) }

    pub fn ratio_label(&self) -> String { self.selection.chip_label(&self.custom) }

    /// Whether apply can be attempted at all.
    pub fn can_apply(&self) -> bool { self.virtual_rect.is_some() && self.system_rect.is_some() }

    /// Locates the window and performs the initial fit.
    ///
    /// Looks up the target window, or the current window if there is none.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<&Located> {
        let located = screen::locate(&self.host, self.target).await?;
        let system = located.system_rect;
        let fitted = engine::fit(&located.window_rect, &system, None);
        info!(?system, ?fitted, "loaded window geometry");
        self.system_rect = Some(system);
        self.virtual_rect = Some(fitted);
        self.refit_for_ratio();
        Ok(self.located.insert(located))
    }

    pub fn set_selection(&mut self, selection: RatioSelection) {
        let before = self.ratio();
        self.selection = selection;
        self.refit_if_ratio_changed(before);
    }

    pub fn set_custom_ratio(&mut self, custom: CustomRatio) {
        let before = self.ratio();
        self.custom = custom;
        self.refit_if_ratio_changed(before);
    }

    /// Only a change in the resolved ratio moves the rect. Touching the
    /// inputs without changing it leaves the geometry alone.
    fn refit_if_ratio_changed(&mut self, before: Option<AspectRatio>) {
        if self.ratio() != before {
            self.refit_for_ratio();
        }
    }

    fn refit_for_ratio(&mut self) {
        let (Some(system), Some(ratio)) = (self.system_rect, self.ratio()) else { return };
        let Some(current) = self.virtual_rect else { return };
        let next = Rect { height: current.width / ratio.get(), ..current };
        self.virtual_rect = Some(engine::fit(&next, &system, Some(ratio)));
    }

    pub fn set_container_width(&mut self, width: f64) { self.container_width = width; }

    pub fn scale(&self) -> f64 {
        engine::preview_scale(
            self.system_rect.as_ref(),
            self.container_width,
            self.max_preview_height,
        )
    }

    pub fn preview(&self) -> Preview {
        let scale = self.scale();
        let system = self.system_rect.unwrap_or_default();
        Preview {
            scale,
            screen_width: system.width * scale,
            screen_height: system.height * scale,
            window: self.virtual_rect.map(|r| r.scale(scale)),
        }
    }

    pub fn pointer_down(&mut self, mode: InteractionMode, x: f64, y: f64) -> bool {
        let began = self.interaction.begin(
            mode,
            x,
            y,
            self.virtual_rect.as_ref(),
            self.system_rect.as_ref(),
        );
        if began {
            debug!(%mode, x, y, "interaction started");
        }
        began
    }

    /// Returns the updated rect, or `None` when no interaction is active.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<Rect> {
        let system = self.system_rect?;
        let next = self.interaction.update(x, y, self.scale(), self.ratio(), &system)?;
        self.virtual_rect = Some(next);
        Some(next)
    }

    pub fn pointer_up(&mut self) -> bool { self.interaction.end() }

    pub fn set_close_on_apply(&mut self, enabled: bool) {
        self.close_on_apply = enabled;
        if let Err(err) = self.prefs.set(CLOSE_ON_APPLY_KEY, Value::Bool(enabled)) {
            warn!(?err, "Failed to persist close-on-apply config");
        }
    }

    /// Changes close-on-apply for this session only, without storing it.
    pub fn override_close_on_apply(&mut self, enabled: bool) { self.close_on_apply = enabled; }

    /// Commits the virtual rect to the target window.
    ///
    /// The status slot is overwritten with the outcome. Closing the resizer
    /// afterwards is best-effort and never changes the result.
    #[instrument(skip(self))]
    pub async fn apply(&mut self) -> Result<WindowUpdate> {
        let (Some(virtual_rect), Some(system)) = (self.virtual_rect, self.system_rect) else {
            return Err(Error::NotLoaded);
        };
        let Some(target) = self.target else {
            self.status = Some(Status::MissingWindow);
            return Err(Error::MissingWindowTarget);
        };

        self.status = None;
        let update = WindowUpdate::focused(virtual_rect.absolute_from(&system).round());
        if let Err(err) = self.host.update_window(target, update).await {
            warn!(?err, %target, "Failed to apply window size");
            self.status = Some(Status::ApplyFailed);
            return Err(match err {
                HostError::NoSuchWindow(id) => Error::WindowNotFound(id),
                other => Error::ApplyFailed(other),
            });
        }

        info!(%target, ?update, "applied window geometry");
        self.status = Some(Status::applied(self.virtual_rect.as_ref(), self.system_rect.as_ref()));
        if let Err(err) = self.prefs.set(TARGET_WINDOW_KEY, Value::from(target.get())) {
            warn!(?err, "Failed to persist target window");
        }
        if self.close_on_apply {
            self.close_resizer(target).await;
        }
        Ok(update)
    }

    /// Tries the tab, then the resizer's own non-normal window, then the page.
    async fn close_resizer(&self, target: WindowId) {
        match self.host.current_tab().await {
            Ok(Some(tab)) => match self.host.close_tab(tab).await {
                Ok(()) => return,
                Err(err) => warn!(?err, "Failed to close current tab"),
            },
            Ok(None) => {}
            Err(err) => warn!(?err, "Failed to close current tab"),
        }

        match self.host.current_window().await {
            Ok(window) if window.id != target && window.kind != WindowKind::Normal => {
                match self.host.close_window(window.id).await {
                    Ok(()) => return,
                    Err(err) => warn!(?err, "Failed to close current window"),
                }
            }
            Ok(_) => {}
            Err(err) => warn!(?err, "Failed to close current window"),
        }

        if let Err(err) = self.host.close_self().await {
            warn!(?err, "Failed to close popup");
        }
    }
}
