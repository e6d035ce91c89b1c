//! frei0r plugin descriptor contract.
//!
//! Mirrors `f0r_plugin_info_t` from the frei0r 1.x ABI. A plugin fills the
//! raw struct through an out-parameter; every string pointer is validated
//! and copied before anything else trusts the descriptor.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};

/// Plugin type code for filters (one video input, one output).
pub const F0R_PLUGIN_TYPE_FILTER: c_int = 0;
/// Color model code for 8-bit-per-channel RGBA.
pub const F0R_COLOR_MODEL_RGBA8888: c_int = 1;

/// Entry symbol every frei0r plugin exports.
pub const PLUGIN_INFO_SYMBOL: &[u8] = b"f0r_get_plugin_info\0";

/// Signature of `f0r_get_plugin_info`.
pub type GetPluginInfoFn = unsafe extern "C" fn(info: *mut Frei0rPluginInfoRaw);

/// Raw `f0r_plugin_info_t` layout. Field order is ABI; do not reorder.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Frei0rPluginInfoRaw {
    pub name: *const c_char,
    pub author: *const c_char,
    pub plugin_type: c_int,
    pub color_model: c_int,
    pub frei0r_version: c_int,
    pub major_version: c_int,
    pub minor_version: c_int,
    pub num_params: c_int,
    pub explanation: *const c_char,
}

impl Frei0rPluginInfoRaw {
    /// A zeroed descriptor for the plugin to fill. All-zero bits are valid
    /// here (null pointers, zero integers), and validation rejects the name
    /// pointer if the plugin leaves it unset.
    pub fn zeroed() -> Self {
        // SAFETY: every field of this struct is valid when zeroed.
        unsafe { std::mem::zeroed() }
    }
}

/// Owned, validated view of a plugin descriptor. Safe to keep after the
/// plugin library is unloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Frei0rPluginInfo {
    pub name: String,
    pub author: String,
    pub explanation: String,
    pub plugin_type: c_int,
    pub color_model: c_int,
    pub frei0r_version: c_int,
    pub major_version: c_int,
    pub minor_version: c_int,
    pub num_params: c_int,
}

impl Frei0rPluginInfo {
    /// Builds an owned descriptor from the raw struct.
    ///
    /// A null or empty name is an error; null author/explanation pointers
    /// degrade to empty strings since only the name is load-bearing.
    ///
    /// # Safety
    ///
    /// Every non-null string pointer in `raw` must point to a NUL-terminated
    /// string that stays valid for the duration of this call, which in
    /// practice means the plugin library is still loaded.
    pub unsafe fn from_raw(raw: &Frei0rPluginInfoRaw) -> Result<Self, &'static str> {
        if raw.name.is_null() {
            return Err("descriptor has a null name pointer");
        }
        let name = cstr_to_string(raw.name);
        if name.is_empty() {
            return Err("descriptor has an empty name");
        }
        Ok(Self {
            name,
            author: opt_cstr_to_string(raw.author),
            explanation: opt_cstr_to_string(raw.explanation),
            plugin_type: raw.plugin_type,
            color_model: raw.color_model,
            frei0r_version: raw.frei0r_version,
            major_version: raw.major_version,
            minor_version: raw.minor_version,
            num_params: raw.num_params,
        })
    }

    pub fn is_filter(&self) -> bool {
        self.plugin_type == F0R_PLUGIN_TYPE_FILTER
    }

    pub fn is_rgba8888(&self) -> bool {
        self.color_model == F0R_COLOR_MODEL_RGBA8888
    }
}

/// # Safety
///
/// `ptr` must be non-null, NUL-terminated, and live.
unsafe fn cstr_to_string(ptr: *const c_char) -> String {
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated, live string.
unsafe fn opt_cstr_to_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        cstr_to_string(ptr)
    }
}
