//! One-shot effects discovery.
//!
//! A discovery pass builds everything the editor needs to offer effects:
//! built-in definitions, XML shader effects, native plugins, and the
//! composed blending shader. The pass never propagates per-source errors;
//! failures are logged, the pass always completes, and its result is
//! published as an immutable [`EffectsContext`].
//!
//! [`DiscoveryService`] runs the pass on a dedicated worker thread so
//! application startup is not blocked on directory walks and plugin probes.
//! Callers either block on [`DiscoveryService::wait`] or poll
//! [`DiscoveryService::try_context`].

use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{error, info};

use crate::core::blend::{compose_blending_shader, BlendRegistry};
use crate::core::effects::{load_internal_effects, load_shader_effects, EffectCatalog};
use crate::core::settings::AppSettings;
use crate::core::CoreResult;

// ============================================================================
// Configuration
// ============================================================================

/// Inputs for one discovery pass.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Ordered directories scanned for XML descriptors, blend fragments, and
    /// native plugins.
    pub effect_dirs: Vec<PathBuf>,
    /// Also scan the platform's well-known frei0r directories.
    pub include_system_plugin_dirs: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            effect_dirs: Vec::new(),
            include_system_plugin_dirs: true,
        }
    }
}

impl DiscoveryConfig {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            effect_dirs: settings.effects.search_dirs.clone(),
            include_system_plugin_dirs: settings.effects.include_system_plugin_dirs,
        }
    }
}

// ============================================================================
// Discovery pass
// ============================================================================

/// Everything one discovery pass produces. Immutable once published.
#[derive(Debug, Clone, Default)]
pub struct EffectsContext {
    pub catalog: EffectCatalog,
    pub blend_modes: BlendRegistry,
    pub blending_shader: String,
}

/// Runs a full discovery pass synchronously on the calling thread.
pub fn run_discovery(config: &DiscoveryConfig) -> EffectsContext {
    info!("Initializing effects");

    let mut catalog = EffectCatalog::new();
    let mut blend_modes = BlendRegistry::new();

    load_internal_effects(&mut catalog);
    load_shader_effects(&config.effect_dirs, &mut catalog, &mut blend_modes);
    #[cfg(feature = "frei0r")]
    crate::core::frei0r::load_frei0r_effects(
        &config.effect_dirs,
        config.include_system_plugin_dirs,
        &mut catalog,
    );

    let blending_shader = compose_blending_shader(&mut blend_modes);

    info!(
        effects = catalog.len(),
        blend_modes = blend_modes.len(),
        "Finished initializing effects"
    );

    EffectsContext {
        catalog,
        blend_modes,
        blending_shader,
    }
}

// ============================================================================
// Readiness latch
// ============================================================================

/// One-shot readiness signal.
///
/// Starts unreleased. [`release`](ReadyLatch::release) is idempotent and
/// wakes every current and future waiter; the latch never goes back.
#[derive(Debug, Clone, Default)]
pub struct ReadyLatch {
    inner: Arc<LatchInner>,
}

#[derive(Debug, Default)]
struct LatchInner {
    released: Mutex<bool>,
    ready: Condvar,
}

impl ReadyLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn release(&self) {
        let mut released = self.inner.released.lock().unwrap();
        *released = true;
        self.inner.ready.notify_all();
    }

    /// Blocks until the latch is released. Returns immediately if it already
    /// was.
    pub fn wait(&self) {
        let mut released = self.inner.released.lock().unwrap();
        while !*released {
            released = self.inner.ready.wait(released).unwrap();
        }
    }

    /// Waits up to `timeout`; returns whether the latch was released.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let released = self.inner.released.lock().unwrap();
        let (released, _) = self
            .inner
            .ready
            .wait_timeout_while(released, timeout, |released| !*released)
            .unwrap();
        *released
    }

    pub fn is_released(&self) -> bool {
        *self.inner.released.lock().unwrap()
    }
}

// ============================================================================
// Background service
// ============================================================================

#[derive(Debug, Default)]
struct ContextSlot {
    slot: Mutex<Option<Arc<EffectsContext>>>,
    published: Condvar,
}

/// Handle to a discovery pass running on its own worker thread.
///
/// Dropping the handle detaches the worker; the pass still runs to
/// completion.
#[derive(Debug)]
pub struct DiscoveryService {
    shared: Arc<ContextSlot>,
    latch: ReadyLatch,
    worker: Option<JoinHandle<()>>,
}

impl DiscoveryService {
    /// Starts a discovery pass on a dedicated worker thread.
    pub fn spawn(config: DiscoveryConfig) -> CoreResult<Self> {
        let shared = Arc::new(ContextSlot::default());
        let latch = ReadyLatch::new();

        let worker_shared = Arc::clone(&shared);
        let worker_latch = latch.clone();
        let worker = thread::Builder::new()
            .name("effects-discovery".to_string())
            .spawn(move || {
                let context = Arc::new(run_discovery(&config));
                {
                    let mut slot = worker_shared.slot.lock().unwrap();
                    *slot = Some(context);
                    worker_shared.published.notify_all();
                }
                // Publish before releasing so a released latch always means
                // the context is observable.
                worker_latch.release();
            })?;

        Ok(Self {
            shared,
            latch,
            worker: Some(worker),
        })
    }

    /// Blocks until the pass completes and returns the published context.
    pub fn wait(&self) -> Arc<EffectsContext> {
        let mut slot = self.shared.slot.lock().unwrap();
        loop {
            if let Some(context) = slot.as_ref() {
                return Arc::clone(context);
            }
            slot = self.shared.published.wait(slot).unwrap();
        }
    }

    /// Returns the context if the pass has already completed.
    pub fn try_context(&self) -> Option<Arc<EffectsContext>> {
        self.shared.slot.lock().unwrap().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.latch.is_released()
    }

    /// The latch released when the pass completes, for callers that gate on
    /// readiness alone.
    pub fn latch(&self) -> &ReadyLatch {
        &self.latch
    }

    /// Waits for the pass, joins the worker thread, and returns the context.
    pub fn join(mut self) -> Arc<EffectsContext> {
        let context = self.wait();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Effects discovery worker panicked");
            }
        }
        context
    }
}
