//! Native plugin probing.
//!
//! Probing loads a candidate library just long enough to read its
//! descriptor. The handle is dropped before returning, success or failure;
//! descriptor strings are copied out while the library is still mapped.

use std::path::Path;

use libloading::Library;
use thiserror::Error;

use super::descriptor::{
    Frei0rPluginInfo, Frei0rPluginInfoRaw, GetPluginInfoFn, PLUGIN_INFO_SYMBOL,
};

/// Why a candidate file did not yield a usable descriptor.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to load library: {0}")]
    LibraryLoad(libloading::Error),

    #[error("entry symbol missing: {0}")]
    MissingSymbol(libloading::Error),

    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(&'static str),
}

/// Probes one candidate file for the frei0r entry point and returns its
/// validated descriptor.
pub fn probe_plugin(path: &Path) -> Result<Frei0rPluginInfo, ProbeError> {
    // SAFETY: loading a foreign library runs its initializers; that is the
    // point of a plugin probe. Candidates come from the configured search
    // roots.
    let library = unsafe { Library::new(path) }.map_err(ProbeError::LibraryLoad)?;

    // SAFETY: the symbol type matches the frei0r 1.x signature for
    // f0r_get_plugin_info.
    let get_plugin_info = unsafe { library.get::<GetPluginInfoFn>(PLUGIN_INFO_SYMBOL) }
        .map_err(ProbeError::MissingSymbol)?;

    let mut raw = Frei0rPluginInfoRaw::zeroed();
    // SAFETY: the out-parameter is a valid, writable descriptor struct.
    unsafe { get_plugin_info(&mut raw) };

    // SAFETY: `library` is still loaded, so the descriptor's string pointers
    // are live; from_raw validates and copies them.
    let info = unsafe { Frei0rPluginInfo::from_raw(&raw) }.map_err(ProbeError::InvalidDescriptor)?;

    Ok(info)
}
