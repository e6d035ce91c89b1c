//! Core error types.

use thiserror::Error;

/// Errors surfaced by the core engine.
///
/// Discovery itself is deliberately forgiving: a bad descriptor file or an
/// unloadable plugin is logged and skipped, not propagated. These variants
/// cover the operations that do fail hard, such as settings persistence and
/// worker startup.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    XmlError(String),

    #[error("Settings error: {0}")]
    SettingsError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
