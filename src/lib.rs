pub mod actor;
pub mod common;
pub mod error;
pub mod model;
pub mod sys;

pub use error::{Error, Result};
