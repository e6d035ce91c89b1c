//! XML shader-effect discovery.
//!
//! Each effect directory is scanned flat for `*.xml` descriptors and
//! `*.blend` fragment files. Descriptors are parsed only far enough to find
//! the first `effect` element and its `name`/`category` attributes; the
//! parameter schema inside the element belongs to the effect runtime, not to
//! discovery.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use quick_xml::events::attributes::Attribute;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, error, warn};

use super::{EffectCatalog, EffectMeta, EffectSubtype, EffectType};
use crate::core::blend::{BlendMode, BlendRegistry, FRAGMENT_EXTENSION};
use crate::core::{CoreError, CoreResult};

/// `name`/`category` attributes of the first `effect` element in a file.
#[derive(Debug, Default, PartialEq)]
struct EffectHeader {
    name: String,
    category: String,
}

/// Scans every directory for XML effects and blend fragments.
///
/// Directories that do not exist are skipped. Within a directory,
/// descriptors and fragments are both processed in file-name order so the
/// catalog and registry come out deterministic.
///
/// A descriptor that cannot be opened abandons the whole file-based scan:
/// remaining descriptors, that directory's fragments, and every later
/// directory are left unprocessed. Directories already scanned keep their
/// entries.
pub fn load_shader_effects(
    dirs: &[PathBuf],
    catalog: &mut EffectCatalog,
    blend_modes: &mut BlendRegistry,
) {
    for dir in dirs {
        if dir.is_dir() {
            if scan_effects_dir(dir, catalog, blend_modes).is_err() {
                return;
            }
        } else {
            debug!("Skipping missing effects directory {}", dir.display());
        }
    }
}

fn scan_effects_dir(
    dir: &Path,
    catalog: &mut EffectCatalog,
    blend_modes: &mut BlendRegistry,
) -> CoreResult<()> {
    for file_path in files_with_extension(dir, "xml") {
        let file = match File::open(&file_path) {
            Ok(file) => file,
            Err(err) => {
                // An unreadable descriptor is fatal to the file-based scan.
                error!("Could not open {}: {}", file_path.display(), err);
                return Err(err.into());
            }
        };
        match read_effect_header(file) {
            Ok(Some(header)) if !header.name.is_empty() => {
                catalog.push(EffectMeta {
                    name: header.name,
                    category: header.category,
                    effect_type: EffectType::Effect,
                    subtype: EffectSubtype::Video,
                    internal: None,
                    path: dir.to_path_buf(),
                    filename: file_path,
                    tooltip: None,
                });
            }
            Ok(Some(_)) => {
                error!("Invalid effect found in {}", file_path.display());
            }
            Ok(None) => {
                debug!("No effect element in {}", file_path.display());
            }
            Err(err) => {
                warn!("Skipping malformed descriptor {}: {}", file_path.display(), err);
            }
        }
    }

    for url in files_with_extension(dir, FRAGMENT_EXTENSION) {
        blend_modes.register(BlendMode::from_file(url));
    }
    Ok(())
}

/// Non-directory entries in `dir` with the given extension, sorted by file
/// name.
fn files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let matches = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
            if matches && !path.is_dir() {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

/// Streams to the first `effect` element and returns its header attributes,
/// or `None` if the document has no such element.
fn read_effect_header(file: File) -> CoreResult<Option<EffectHeader>> {
    let mut reader = Reader::from_reader(BufReader::new(file));
    let mut buf = Vec::new();
    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|err| CoreError::XmlError(err.to_string()))?;
        match event {
            Event::Start(element) | Event::Empty(element)
                if element.name().as_ref() == b"effect" =>
            {
                let mut header = EffectHeader::default();
                for attr in element.attributes() {
                    let attr = attr.map_err(|err| CoreError::XmlError(err.to_string()))?;
                    match attr.key.as_ref() {
                        b"name" => header.name = attr_value(&attr)?,
                        b"category" => header.category = attr_value(&attr)?,
                        _ => {}
                    }
                }
                return Ok(Some(header));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

fn attr_value(attr: &Attribute<'_>) -> CoreResult<String> {
    attr.unescape_value()
        .map(|value| value.into_owned())
        .map_err(|err| CoreError::XmlError(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn scan(dirs: &[PathBuf]) -> (EffectCatalog, BlendRegistry) {
        let mut catalog = EffectCatalog::new();
        let mut blend_modes = BlendRegistry::new();
        load_shader_effects(dirs, &mut catalog, &mut blend_modes);
        (catalog, blend_modes)
    }

    #[test]
    fn valid_descriptor_becomes_a_video_effect() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "boxblur.xml",
            r#"<?xml version="1.0"?>
<effect name="Box Blur" category="Blur">
  <field type="double" id="radius" name="Radius" default="10"/>
</effect>
"#,
        );

        let (catalog, _) = scan(&[dir.path().to_path_buf()]);

        assert_eq!(catalog.len(), 1);
        let meta = &catalog.entries()[0];
        assert_eq!(meta.name, "Box Blur");
        assert_eq!(meta.category, "Blur");
        assert_eq!(meta.effect_type, EffectType::Effect);
        assert_eq!(meta.subtype, EffectSubtype::Video);
        assert_eq!(meta.internal, None);
        assert_eq!(meta.path, dir.path());
        assert_eq!(meta.filename, path);
    }

    #[test]
    fn descriptors_are_cataloged_in_file_name_order() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "waves.xml", r#"<effect name="Waves"/>"#);
        write_file(dir.path(), "invert.xml", r#"<effect name="Invert"/>"#);

        let (catalog, _) = scan(&[dir.path().to_path_buf()]);

        let names: Vec<&str> = catalog.entries().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Invert", "Waves"]);
    }

    #[test]
    fn only_the_first_effect_element_counts() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "pack.xml",
            r#"<effects>
  <effect name="First" category="Alpha"/>
  <effect name="Second" category="Beta"/>
</effects>
"#,
        );

        let (catalog, _) = scan(&[dir.path().to_path_buf()]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].name, "First");
        assert_eq!(catalog.entries()[0].category, "Alpha");
    }

    #[test]
    fn nameless_effect_is_rejected_and_siblings_survive() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "bad.xml", r#"<effect category="Blur"/>"#);
        write_file(dir.path(), "empty.xml", r#"<effect name="" category="Blur"/>"#);
        write_file(dir.path(), "good.xml", r#"<effect name="Good"/>"#);

        let (catalog, _) = scan(&[dir.path().to_path_buf()]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].name, "Good");
    }

    #[test]
    fn descriptor_without_effect_element_is_skipped_silently() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "other.xml", "<preset><name>Nope</name></preset>");
        write_file(dir.path(), "real.xml", r#"<effect name="Real"/>"#);

        let (catalog, _) = scan(&[dir.path().to_path_buf()]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].name, "Real");
    }

    #[test]
    fn malformed_xml_is_skipped_and_scan_continues() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "broken.xml", "<effect name=oops <<");
        write_file(dir.path(), "fine.xml", r#"<effect name="Fine"/>"#);

        let (catalog, _) = scan(&[dir.path().to_path_buf()]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].name, "Fine");
    }

    #[test]
    fn entity_references_in_attributes_are_decoded() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "mix.xml", r#"<effect name="Salt &amp; Pepper"/>"#);

        let (catalog, _) = scan(&[dir.path().to_path_buf()]);

        assert_eq!(catalog.entries()[0].name, "Salt & Pepper");
    }

    #[test]
    fn blend_fragments_register_unloaded_with_stem_names() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "screen.blend", "code\n");
        write_file(dir.path(), "multiply.blend", "code\n");
        write_file(dir.path(), "notes.txt", "not a fragment\n");

        let (catalog, blend_modes) = scan(&[dir.path().to_path_buf()]);

        assert!(catalog.is_empty());
        let names: Vec<&str> = blend_modes.modes().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["multiply", "screen"]);
        assert!(blend_modes.modes().iter().all(|m| !m.loaded));
        assert_eq!(
            blend_modes.modes()[0].url,
            dir.path().join("multiply.blend")
        );
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_descriptor_abandons_the_whole_scan() {
        let first = TempDir::new().unwrap();
        write_file(first.path(), "a.xml", r#"<effect name="A"/>"#);
        // Dangling symlink: listed by the scan, fails on open.
        std::os::unix::fs::symlink(
            first.path().join("nowhere"),
            first.path().join("b.xml"),
        )
        .unwrap();
        write_file(first.path(), "c.xml", r#"<effect name="C"/>"#);
        write_file(first.path(), "screen.blend", "code\n");

        let second = TempDir::new().unwrap();
        write_file(second.path(), "d.xml", r#"<effect name="D"/>"#);
        write_file(second.path(), "mult.blend", "code\n");

        let (catalog, blend_modes) = scan(&[
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);

        // Everything past the failed open is abandoned: c, both
        // directories' fragments, and the second directory entirely.
        let names: Vec<&str> = catalog.entries().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["A"]);
        assert!(blend_modes.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn directories_scanned_before_the_failure_keep_their_entries() {
        let first = TempDir::new().unwrap();
        write_file(first.path(), "x.xml", r#"<effect name="X"/>"#);
        write_file(first.path(), "keep.blend", "code\n");

        let second = TempDir::new().unwrap();
        std::os::unix::fs::symlink(
            second.path().join("nowhere"),
            second.path().join("broken.xml"),
        )
        .unwrap();
        write_file(second.path(), "lost.blend", "code\n");

        let (catalog, blend_modes) = scan(&[
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].name, "X");
        let names: Vec<&str> = blend_modes.modes().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["keep"]);
    }

    #[test]
    fn missing_directories_are_skipped() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "real.xml", r#"<effect name="Real"/>"#);
        let ghost = dir.path().join("ghost");

        let (catalog, _) = scan(&[ghost, dir.path().to_path_buf()]);

        assert_eq!(catalog.len(), 1);
    }
}
