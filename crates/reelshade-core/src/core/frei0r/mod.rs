//! frei0r plugin discovery.
//!
//! Scans the configured effect directories plus the platform's well-known
//! frei0r locations for filter plugins, and appends accepted ones to the
//! effect catalog. The scan is defensive: any probe failure skips that
//! candidate and the walk continues.

mod descriptor;
mod loader;

pub use descriptor::{
    Frei0rPluginInfo, Frei0rPluginInfoRaw, GetPluginInfoFn, F0R_COLOR_MODEL_RGBA8888,
    F0R_PLUGIN_TYPE_FILTER, PLUGIN_INFO_SYMBOL,
};
pub use loader::{probe_plugin, ProbeError};

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::core::effects::{EffectCatalog, EffectMeta, EffectSubtype, EffectType, InternalEffect};

/// Environment variable naming one extra plugin search root.
pub const FREI0R_PATH_ENV: &str = "FREI0R_PATH";

/// Category assigned to every frei0r catalog entry.
pub const FREI0R_CATEGORY: &str = "Frei0r";

/// Ordered plugin search roots: configured effect directories, then the
/// platform's well-known frei0r directories, then `FREI0R_PATH` if set.
pub fn plugin_search_roots(effect_dirs: &[PathBuf], include_system_dirs: bool) -> Vec<PathBuf> {
    search_roots(
        effect_dirs,
        include_system_dirs,
        std::env::var(FREI0R_PATH_ENV).ok().as_deref(),
    )
}

fn search_roots(
    effect_dirs: &[PathBuf],
    include_system_dirs: bool,
    env_root: Option<&str>,
) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = effect_dirs.to_vec();

    if cfg!(unix) && include_system_dirs {
        roots.push(PathBuf::from("/usr/lib/frei0r-1"));
        roots.push(PathBuf::from("/usr/local/lib/frei0r-1"));
        if let Some(home) = dirs::home_dir() {
            roots.push(home.join(".frei0r-1").join("lib"));
        }
    }

    // The whole value is one root; it is not split on path separators.
    if let Some(env_root) = env_root.filter(|root| !root.is_empty()) {
        roots.push(PathBuf::from(env_root));
    }

    roots
}

/// Scans every search root and appends accepted filter plugins to the
/// catalog. Plugin names are deduplicated across all roots; the first
/// occurrence wins.
pub fn load_frei0r_effects(
    effect_dirs: &[PathBuf],
    include_system_dirs: bool,
    catalog: &mut EffectCatalog,
) {
    let roots = plugin_search_roots(effect_dirs, include_system_dirs);
    let mut loaded_names: HashSet<String> = HashSet::new();

    for root in &roots {
        scan_plugin_dir(root, catalog, &mut loaded_names);
    }
}

/// Recursively scans one root, subdirectories ahead of their sibling files,
/// file names in order.
pub fn scan_plugin_dir(
    root: &Path,
    catalog: &mut EffectCatalog,
    loaded_names: &mut HashSet<String>,
) {
    if !root.is_dir() {
        debug!("Skipping missing plugin directory {}", root.display());
        return;
    }

    let walker = WalkDir::new(root).follow_links(true).sort_by(|a, b| {
        b.file_type()
            .is_dir()
            .cmp(&a.file_type().is_dir())
            .then_with(|| a.file_name().cmp(b.file_name()))
    });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!("Skipping plugin scan entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_native_library(entry.path()) {
            continue;
        }
        probe_candidate(entry.path(), catalog, loaded_names);
    }
}

/// True if the path carries the platform's dynamic library extension.
fn is_native_library(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(std::env::consts::DLL_EXTENSION))
}

fn probe_candidate(path: &Path, catalog: &mut EffectCatalog, loaded_names: &mut HashSet<String>) {
    let info = match probe_plugin(path) {
        Ok(info) => info,
        Err(err) => {
            debug!("Skipping plugin candidate {}: {}", path.display(), err);
            return;
        }
    };
    if let Err(reason) = accept_plugin(&info, loaded_names) {
        debug!("Rejecting plugin {} at {}: {}", info.name, path.display(), reason);
        return;
    }

    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let file_name = path.file_name().map(PathBuf::from).unwrap_or_default();
    let tooltip = format!(
        "{}\n{}\n{}\n{}",
        info.name,
        info.author,
        info.explanation,
        file_name.display()
    );

    loaded_names.insert(info.name.clone());
    catalog.push(EffectMeta {
        name: info.name,
        category: FREI0R_CATEGORY.to_string(),
        effect_type: EffectType::Effect,
        subtype: EffectSubtype::Video,
        internal: Some(InternalEffect::Frei0r),
        path: dir,
        filename: file_name,
        tooltip: Some(tooltip),
    });
}

/// Acceptance policy for a probed descriptor, separated from probing so it
/// can be tested without loading libraries.
pub fn accept_plugin(
    info: &Frei0rPluginInfo,
    loaded_names: &HashSet<String>,
) -> Result<(), &'static str> {
    if loaded_names.contains(&info.name) {
        return Err("duplicate plugin name");
    }
    if !info.is_filter() {
        return Err("not a filter plugin");
    }
    if !info.is_rgba8888() {
        return Err("unsupported color model");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn info(name: &str) -> Frei0rPluginInfo {
        Frei0rPluginInfo {
            name: name.to_string(),
            author: "Author".to_string(),
            explanation: "Explanation".to_string(),
            plugin_type: F0R_PLUGIN_TYPE_FILTER,
            color_model: F0R_COLOR_MODEL_RGBA8888,
            frei0r_version: 1,
            major_version: 1,
            minor_version: 0,
            num_params: 0,
        }
    }

    #[test]
    fn configured_directories_come_first() {
        let dirs = vec![PathBuf::from("/a/effects"), PathBuf::from("/b/effects")];
        let roots = search_roots(&dirs, true, None);
        assert_eq!(&roots[..2], &dirs[..]);
    }

    #[cfg(unix)]
    #[test]
    fn system_directories_follow_configured_ones() {
        let dirs = vec![PathBuf::from("/a/effects")];
        let roots = search_roots(&dirs, true, None);

        let usr = roots
            .iter()
            .position(|r| r == Path::new("/usr/lib/frei0r-1"))
            .unwrap();
        let local = roots
            .iter()
            .position(|r| r == Path::new("/usr/local/lib/frei0r-1"))
            .unwrap();
        assert_eq!(usr, 1);
        assert_eq!(local, 2);
        assert!(roots.iter().any(|r| r.ends_with(".frei0r-1/lib")));
    }

    #[cfg(unix)]
    #[test]
    fn system_directories_can_be_excluded() {
        let dirs = vec![PathBuf::from("/a/effects")];
        let roots = search_roots(&dirs, false, None);

        assert_eq!(roots, dirs);
    }

    #[test]
    fn env_root_is_appended_last_and_unsplit() {
        let dirs = vec![PathBuf::from("/a/effects")];
        let roots = search_roots(&dirs, false, Some("/opt/f0r:/extra/f0r"));

        // The colon-joined value stays one root.
        assert_eq!(
            roots,
            vec![
                PathBuf::from("/a/effects"),
                PathBuf::from("/opt/f0r:/extra/f0r")
            ]
        );
    }

    #[test]
    fn empty_env_root_is_ignored() {
        let roots = search_roots(&[], false, Some(""));
        assert!(roots.is_empty());
    }

    #[test]
    fn accepts_filter_plugins_once() {
        let mut loaded = HashSet::new();
        assert!(accept_plugin(&info("Pixelize"), &loaded).is_ok());

        loaded.insert("Pixelize".to_string());
        assert_eq!(
            accept_plugin(&info("Pixelize"), &loaded),
            Err("duplicate plugin name")
        );
    }

    #[test]
    fn rejects_non_filter_types_and_other_color_models() {
        let loaded = HashSet::new();

        let mut source = info("Clock");
        source.plugin_type = 1;
        assert_eq!(accept_plugin(&source, &loaded), Err("not a filter plugin"));

        let mut bgra = info("Swizzle");
        bgra.color_model = 0;
        assert_eq!(
            accept_plugin(&bgra, &loaded),
            Err("unsupported color model")
        );
    }

    #[test]
    fn garbage_candidates_are_skipped() {
        let dir = TempDir::new().unwrap();
        let lib_name = format!("fake.{}", std::env::consts::DLL_EXTENSION);
        std::fs::write(dir.path().join(lib_name), b"not a library").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"ignored").unwrap();

        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        let nested_lib = format!("deep.{}", std::env::consts::DLL_EXTENSION);
        std::fs::write(nested.join(nested_lib), b"also not a library").unwrap();

        let mut catalog = EffectCatalog::new();
        let mut loaded_names = HashSet::new();
        scan_plugin_dir(dir.path(), &mut catalog, &mut loaded_names);

        assert!(catalog.is_empty());
        assert!(loaded_names.is_empty());
    }

    #[test]
    fn missing_root_is_skipped() {
        let dir = TempDir::new().unwrap();
        let mut catalog = EffectCatalog::new();
        let mut loaded_names = HashSet::new();
        scan_plugin_dir(&dir.path().join("ghost"), &mut catalog, &mut loaded_names);
        assert!(catalog.is_empty());
    }
}
