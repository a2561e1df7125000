pub mod geometry;
pub mod host;
pub mod screen;
pub mod snapshot;
