//! Reelshade Core Library
//!
//! Discovery engine for a non-linear video editor's effects system. Builds
//! the unified effect/transition catalog from three sources (built-in
//! definitions, XML shader descriptors, native frei0r plugins) and composes
//! the monolithic blending shader from per-mode GLSL fragment files.
//!
//! Discovery runs once per application start on a background worker; callers
//! wait on a readiness latch and then receive an immutable
//! [`EffectsContext`](crate::core::discovery::EffectsContext).

pub mod core;

pub use crate::core::blend::{BlendMode, BlendRegistry};
pub use crate::core::discovery::{
    run_discovery, DiscoveryConfig, DiscoveryService, EffectsContext, ReadyLatch,
};
pub use crate::core::effects::{
    EffectCatalog, EffectMeta, EffectSubtype, EffectType, InternalEffect,
};
pub use crate::core::settings::{AppSettings, EffectsSettings, SettingsManager};
pub use crate::core::{CoreError, CoreResult};
