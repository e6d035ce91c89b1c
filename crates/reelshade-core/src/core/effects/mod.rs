//! Effect catalog types and construction.
//!
//! The catalog is the single ordered list of every effect and transition the
//! editor can offer: built-in implementations, XML-described shader effects,
//! and native frei0r plugins. Each discovery pass rebuilds it wholesale;
//! entries are appended in source order (built-ins, then XML, then plugins)
//! and the catalog is never mutated afterwards.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

mod internal;
pub mod xml;

pub use internal::load_internal_effects;
pub use xml::load_shader_effects;

/// Marker path for catalog entries that ship inside the application rather
/// than on disk.
pub const INTERNAL_SHADER_PATH: &str = "internal://shaders";

// ============================================================================
// Types
// ============================================================================

/// Whether an entry is applied to a single clip or between two clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectType {
    Effect,
    Transition,
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectType::Effect => write!(f, "effect"),
            EffectType::Transition => write!(f, "transition"),
        }
    }
}

/// Media domain an entry operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectSubtype {
    Video,
    Audio,
}

impl fmt::Display for EffectSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectSubtype::Video => write!(f, "video"),
            EffectSubtype::Audio => write!(f, "audio"),
        }
    }
}

/// Dispatch identifier for entries backed by built-in code.
///
/// XML shader effects carry no identifier; frei0r entries all share
/// [`InternalEffect::Frei0r`] and are told apart by their plugin file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InternalEffect {
    Transform,
    Text,
    Solid,
    Noise,
    Volume,
    Pan,
    Tone,
    Shake,
    Timecode,
    FillLeftRight,
    Vst,
    CornerPin,
    Frei0r,
    CrossDissolve,
    LinearFade,
    ExponentialFade,
    LogarithmicFade,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectMeta {
    /// Display name shown in effect menus.
    pub name: String,
    /// Menu grouping; empty means uncategorized.
    pub category: String,
    pub effect_type: EffectType,
    pub subtype: EffectSubtype,
    /// `None` for XML shader effects, which dispatch through their
    /// descriptor file instead of built-in code.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub internal: Option<InternalEffect>,
    /// Directory the entry was discovered in, or [`INTERNAL_SHADER_PATH`]
    /// for built-ins.
    pub path: PathBuf,
    /// Descriptor file for XML effects, bare library file name for plugins,
    /// empty for built-ins.
    pub filename: PathBuf,
    /// Hover text; only plugins provide one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tooltip: Option<String>,
}

// ============================================================================
// Catalog
// ============================================================================

/// Ordered collection of discovered effects.
#[derive(Debug, Clone, Default)]
pub struct EffectCatalog {
    entries: Vec<EffectMeta>,
}

impl EffectCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, meta: EffectMeta) {
        self.entries.push(meta);
    }

    pub fn entries(&self) -> &[EffectMeta] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry with the given display name, in catalog order.
    pub fn find_by_name(&self, name: &str) -> Option<&EffectMeta> {
        self.entries.iter().find(|meta| meta.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str) -> EffectMeta {
        EffectMeta {
            name: name.to_string(),
            category: String::new(),
            effect_type: EffectType::Effect,
            subtype: EffectSubtype::Video,
            internal: None,
            path: PathBuf::from("/effects"),
            filename: PathBuf::from(format!("{name}.xml")),
            tooltip: None,
        }
    }

    #[test]
    fn catalog_preserves_insertion_order() {
        let mut catalog = EffectCatalog::new();
        assert!(catalog.is_empty());

        catalog.push(meta("Blur"));
        catalog.push(meta("Sharpen"));

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries()[0].name, "Blur");
        assert_eq!(catalog.entries()[1].name, "Sharpen");
    }

    #[test]
    fn find_by_name_returns_first_match() {
        let mut catalog = EffectCatalog::new();
        catalog.push(meta("Blur"));
        let mut duplicate = meta("Blur");
        duplicate.category = "Later".to_string();
        catalog.push(duplicate);

        let found = catalog.find_by_name("Blur").unwrap();
        assert_eq!(found.category, "");
        assert!(catalog.find_by_name("Missing").is_none());
    }

    #[test]
    fn effect_meta_serializes_camel_case() {
        let json = serde_json::to_string(&meta("Blur")).unwrap();
        assert!(json.contains("\"effectType\":\"effect\""));
        assert!(json.contains("\"subtype\":\"video\""));
        // Absent options are omitted entirely.
        assert!(!json.contains("tooltip"));
        assert!(!json.contains("internal"));
    }

    #[test]
    fn internal_effect_serializes_camel_case() {
        let json = serde_json::to_string(&InternalEffect::FillLeftRight).unwrap();
        assert_eq!(json, "\"fillLeftRight\"");
        let json = serde_json::to_string(&InternalEffect::Frei0r).unwrap();
        assert_eq!(json, "\"frei0r\"");
    }

    #[test]
    fn display_names_are_lowercase() {
        assert_eq!(EffectType::Transition.to_string(), "transition");
        assert_eq!(EffectSubtype::Audio.to_string(), "audio");
    }
}
