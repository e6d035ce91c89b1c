//! Application settings.
//!
//! Settings persist as pretty-printed JSON with camelCase keys. Unknown or
//! missing fields fall back to defaults so older files keep loading across
//! upgrades. Saves are atomic (temp file + rename) and serialized through an
//! advisory file lock so concurrent instances don't clobber each other.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{CoreError, CoreResult};

fn default_true() -> bool {
    true
}

/// Effect discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EffectsSettings {
    /// Ordered directories scanned for XML descriptors, blend fragments, and
    /// native plugins.
    #[serde(default)]
    pub search_dirs: Vec<PathBuf>,
    /// Also scan the platform's well-known frei0r directories.
    #[serde(default = "default_true")]
    pub include_system_plugin_dirs: bool,
}

impl Default for EffectsSettings {
    fn default() -> Self {
        Self {
            search_dirs: Vec::new(),
            include_system_plugin_dirs: true,
        }
    }
}

/// Top-level application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default)]
    pub effects: EffectsSettings,
}

impl AppSettings {
    /// Drops unusable values while preserving order: empty search paths are
    /// removed.
    pub fn normalize(&mut self) {
        self.effects
            .search_dirs
            .retain(|dir| !dir.as_os_str().is_empty());
    }
}

/// Loads and persists [`AppSettings`] at a fixed path.
pub struct SettingsManager {
    path: PathBuf,
}

impl SettingsManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default settings location under the platform config directory.
    pub fn default_path() -> CoreResult<PathBuf> {
        let base = dirs::config_dir().ok_or_else(|| {
            CoreError::SettingsError("could not determine config directory".to_string())
        })?;
        Ok(base.join("reelshade").join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads settings. A missing file yields defaults; a corrupt file is an
    /// error rather than silent data loss.
    pub fn load(&self) -> CoreResult<AppSettings> {
        if !self.path.exists() {
            debug!(
                "Settings file {} not found, using defaults",
                self.path.display()
            );
            return Ok(AppSettings::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        let mut settings: AppSettings = serde_json::from_str(&contents)?;
        settings.normalize();
        Ok(settings)
    }

    /// Saves settings atomically under an exclusive advisory lock.
    pub fn save(&self, settings: &AppSettings) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lock_path = self.path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)?;
        lock_file.lock_exclusive()?;

        let json = serde_json::to_string_pretty(settings)?;
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(json.as_bytes())?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        lock_file.unlock()?;
        Ok(())
    }
}
