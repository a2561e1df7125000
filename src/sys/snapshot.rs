//! A [`WindowHost`] backed by a JSON description of the desktop.
//!
//! The CLI uses this to drive a resizer session without a real window
//! system. Window updates and closes are written back to the file, so a
//! sequence of invocations sees each other's effects.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::host::{HostError, HostWindow, TabId, WindowHost, WindowId, WindowUpdate};
use super::screen::DisplayInfo;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Screen {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub screen: Screen,
    pub displays: Vec<DisplayInfo>,
    pub windows: Vec<HostWindow>,
    pub current_window: Option<WindowId>,
    pub current_tab: Option<TabId>,
    /// Set once the resizer page has closed itself.
    pub self_closed: bool,
}

pub struct SnapshotHost {
    path: Option<PathBuf>,
    state: Mutex<Snapshot>,
}

impl SnapshotHost {
    pub fn new(snapshot: Snapshot) -> Self { Self { path: None, state: Mutex::new(snapshot) } }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let path = path.as_ref();
        let snapshot: Snapshot = serde_json::from_str(&fs::read_to_string(path)?)?;
        debug!(path = %path.display(), windows = snapshot.windows.len(), "loaded host snapshot");
        Ok(Self {
            path: Some(path.to_path_buf()),
            state: Mutex::new(snapshot),
        })
    }

    pub fn snapshot(&self) -> Snapshot { self.state.lock().clone() }

    fn save(&self, snapshot: &Snapshot) -> Result<(), HostError> {
        let Some(path) = &self.path else { return Ok(()) };
        fs::write(path, serde_json::to_string_pretty(snapshot)?)?;
        Ok(())
    }
}

impl WindowHost for SnapshotHost {
    async fn get_window(&self, id: WindowId) -> Result<HostWindow, HostError> {
        let state = self.state.lock();
        state
            .windows
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or(HostError::NoSuchWindow(id))
    }

    async fn current_window(&self) -> Result<HostWindow, HostError> {
        let id = self
            .state
            .lock()
            .current_window
            .ok_or(HostError::Unsupported("current window"))?;
        self.get_window(id).await
    }

    async fn list_displays(&self) -> Result<Vec<DisplayInfo>, HostError> {
        Ok(self.state.lock().displays.clone())
    }

    async fn update_window(&self, id: WindowId, update: WindowUpdate) -> Result<(), HostError> {
        let mut state = self.state.lock();
        let window = state
            .windows
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or(HostError::NoSuchWindow(id))?;
        window.rect = update.rect().into();
        info!(%id, ?update, "updated window");
        self.save(&state)
    }

    async fn current_tab(&self) -> Result<Option<TabId>, HostError> {
        Ok(self.state.lock().current_tab)
    }

    async fn close_tab(&self, tab: TabId) -> Result<(), HostError> {
        let mut state = self.state.lock();
        if state.current_tab != Some(tab) {
            return Err(HostError::NoSuchTab(tab));
        }
        state.current_tab = None;
        state.self_closed = true;
        self.save(&state)
    }

    async fn close_window(&self, id: WindowId) -> Result<(), HostError> {
        let mut state = self.state.lock();
        let before = state.windows.len();
        state.windows.retain(|w| w.id != id);
        if state.windows.len() == before {
            return Err(HostError::NoSuchWindow(id));
        }
        if state.current_window == Some(id) {
            state.current_window = None;
            state.self_closed = true;
        }
        self.save(&state)
    }

    async fn close_self(&self) -> Result<(), HostError> {
        let mut state = self.state.lock();
        state.self_closed = true;
        self.save(&state)
    }

    fn screen_size(&self) -> (f64, f64) {
        let state = self.state.lock();
        (state.screen.width, state.screen.height)
    }
}
