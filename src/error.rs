use thiserror::Error;

use crate::model::prefs::PersistError;
use crate::sys::host::{HostError, WindowId};

#[derive(Debug, Error)]
pub enum Error {
    /// The target id no longer resolves to an open window.
    #[error("window {0} not found")]
    WindowNotFound(WindowId),

    /// No target window was ever resolved for the session.
    #[error("no target window to apply geometry to")]
    MissingWindowTarget,

    /// `apply` was called before the locator produced both rectangles.
    #[error("window geometry has not been loaded")]
    NotLoaded,

    #[error("no usable display (screen reported as {width}x{height})")]
    NoUsableDisplay { width: f64, height: f64 },

    /// The host rejected the window update.
    #[error("failed to apply window geometry")]
    ApplyFailed(#[source] HostError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
