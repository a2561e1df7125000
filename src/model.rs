pub mod engine;
pub mod interaction;
pub mod prefs;
pub mod ratio;
pub mod session;
pub mod status;

pub use interaction::{Interaction, InteractionMode};
pub use ratio::{AspectRatio, CustomRatio, NamedRatio, RatioSelection};
pub use session::{ResizerSession, SessionOptions};
pub use status::Status;
