//! Built-in effect and transition definitions.
//!
//! These ship with the application and need no files on disk. The table is
//! declarative: catalog order is table order, and every row names its own
//! category instead of inheriting one from a neighboring entry.

use std::path::PathBuf;

use super::EffectSubtype::{Audio, Video};
use super::EffectType::{Effect, Transition};
use super::{
    EffectCatalog, EffectMeta, EffectSubtype, EffectType, InternalEffect, INTERNAL_SHADER_PATH,
};

struct InternalEffectDef {
    name: &'static str,
    category: &'static str,
    effect_type: EffectType,
    subtype: EffectSubtype,
    internal: InternalEffect,
}

impl InternalEffectDef {
    const fn new(
        name: &'static str,
        category: &'static str,
        effect_type: EffectType,
        subtype: EffectSubtype,
        internal: InternalEffect,
    ) -> Self {
        Self {
            name,
            category,
            effect_type,
            subtype,
            internal,
        }
    }
}

const INTERNAL_EFFECTS: &[InternalEffectDef] = &[
    InternalEffectDef::new("Volume", "", Effect, Audio, InternalEffect::Volume),
    InternalEffectDef::new("Pan", "", Effect, Audio, InternalEffect::Pan),
    InternalEffectDef::new("VST Plugin 2.x", "", Effect, Audio, InternalEffect::Vst),
    InternalEffectDef::new("Tone", "", Effect, Audio, InternalEffect::Tone),
    InternalEffectDef::new("Noise", "", Effect, Audio, InternalEffect::Noise),
    InternalEffectDef::new("Fill Left/Right", "", Effect, Audio, InternalEffect::FillLeftRight),
    InternalEffectDef::new("Transform", "Distort", Effect, Video, InternalEffect::Transform),
    InternalEffectDef::new("Corner Pin", "Distort", Effect, Video, InternalEffect::CornerPin),
    InternalEffectDef::new("Shake", "Distort", Effect, Video, InternalEffect::Shake),
    InternalEffectDef::new("Text", "Render", Effect, Video, InternalEffect::Text),
    InternalEffectDef::new("Timecode", "Render", Effect, Video, InternalEffect::Timecode),
    InternalEffectDef::new("Solid", "Render", Effect, Video, InternalEffect::Solid),
    InternalEffectDef::new("Cross Dissolve", "", Transition, Video, InternalEffect::CrossDissolve),
    InternalEffectDef::new("Linear Fade", "", Transition, Audio, InternalEffect::LinearFade),
    InternalEffectDef::new("Exponential Fade", "", Transition, Audio, InternalEffect::ExponentialFade),
    InternalEffectDef::new("Logarithmic Fade", "", Transition, Audio, InternalEffect::LogarithmicFade),
];

/// Appends every built-in definition to the catalog, in table order.
pub fn load_internal_effects(catalog: &mut EffectCatalog) {
    for def in INTERNAL_EFFECTS {
        catalog.push(EffectMeta {
            name: def.name.to_string(),
            category: def.category.to_string(),
            effect_type: def.effect_type,
            subtype: def.subtype,
            internal: Some(def.internal),
            path: PathBuf::from(INTERNAL_SHADER_PATH),
            filename: PathBuf::new(),
            tooltip: None,
        });
    }
}
