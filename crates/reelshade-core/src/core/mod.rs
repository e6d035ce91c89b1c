//! Core engine modules.
//!
//! Everything here is UI-agnostic: catalog construction, blend-mode
//! registration, shader composition, plugin probing, and the background
//! discovery pipeline that ties them together.

pub mod blend;
pub mod discovery;
pub mod effects;
#[cfg(feature = "frei0r")]
pub mod frei0r;
pub mod settings;

mod error;
pub use error::*;
