//! Data models for the client

mod selection;
mod style;

pub use selection::*;
pub use style::*;
