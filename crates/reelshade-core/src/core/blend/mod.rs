//! Blend-mode registry and fragment directive parsing.
//!
//! A blend mode is one GLSL fragment file (`*.blend`) exporting one blend
//! function. Fragments use a small directive vocabulary on `#`-prefixed
//! lines; everything else in a fragment is shader code and is woven verbatim
//! into the composed program.

use std::path::{Path, PathBuf};

mod shader;
pub use shader::compose_blending_shader;

/// Directive that overrides a mode's display name.
pub const NAME_DIRECTIVE: &str = "#reelshade name ";
/// Directive that declares the fragment's exported blend function.
pub const EXPORT_DIRECTIVE: &str = "#pragma glslify: export(";
/// Keyword that marks a directive line as an include request.
pub const REQUIRE_KEYWORD: &str = "require";
/// File extension shared by all fragment files.
pub const FRAGMENT_EXTENSION: &str = "blend";

// ============================================================================
// Types
// ============================================================================

/// One registered blend mode.
///
/// `name` and `function_name` hold registration-time placeholders until the
/// fragment is woven; `loaded` tracks whether that has happened in the
/// current composition pass.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendMode {
    /// Fragment file backing this mode.
    pub url: PathBuf,
    /// Display name; defaults to the file stem until a name directive
    /// overrides it.
    pub name: String,
    /// GLSL function the dispatch table calls; filled by the export
    /// directive.
    pub function_name: String,
    pub loaded: bool,
}

impl BlendMode {
    /// An unloaded mode for a fragment file, named after its stem.
    pub fn from_file(url: PathBuf) -> Self {
        let name = url
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            url,
            name,
            function_name: String::new(),
            loaded: false,
        }
    }
}

/// Ordered blend-mode collection; a mode's registry index is its dispatch
/// value in the composed shader.
#[derive(Debug, Clone, Default)]
pub struct BlendRegistry {
    pub(crate) modes: Vec<BlendMode>,
}

impl BlendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, mode: BlendMode) {
        self.modes.push(mode);
    }

    pub fn modes(&self) -> &[BlendMode] {
        &self.modes
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Index of the mode backed by `path`, if registered.
    pub fn position_of_path(&self, path: &Path) -> Option<usize> {
        self.modes.iter().position(|mode| mode.url == path)
    }

    /// Clears every mode's `loaded` flag so the registry can feed a fresh
    /// composition pass.
    pub fn reset(&mut self) {
        for mode in &mut self.modes {
            mode.loaded = false;
        }
    }
}

// ============================================================================
// Directive parsing
// ============================================================================

/// Classification of one fragment line that starts with `#`.
#[derive(Debug, PartialEq)]
pub(crate) enum DirectiveLine<'a> {
    /// Display-name override.
    Name(&'a str),
    /// Exported blend function name.
    Export(&'a str),
    /// Include request naming another fragment (extension not included).
    Require(&'a str),
    /// Any other `#` line; dropped from the composed shader.
    Ignored,
}

/// Classifies a fragment line. Returns `None` for plain shader code.
pub(crate) fn classify_line(line: &str) -> Option<DirectiveLine<'_>> {
    if !line.starts_with('#') {
        return None;
    }
    if let Some(rest) = line.strip_prefix(NAME_DIRECTIVE) {
        return Some(DirectiveLine::Name(rest));
    }
    if let Some(rest) = line.strip_prefix(EXPORT_DIRECTIVE) {
        return Some(DirectiveLine::Export(export_function_name(rest)));
    }
    if line.contains(REQUIRE_KEYWORD) {
        if let Some(ident) = require_identifier(line) {
            return Some(DirectiveLine::Require(ident));
        }
    }
    Some(DirectiveLine::Ignored)
}

fn export_function_name(rest: &str) -> &str {
    let trimmed = rest.trim_end();
    trimmed.strip_suffix(')').unwrap_or(trimmed)
}

/// Identifier inside the last parenthesis pair on a require line.
fn require_identifier(line: &str) -> Option<&str> {
    let after = &line[line.rfind('(')? + 1..];
    let inner = match after.find(')') {
        Some(close) => &after[..close],
        None => after,
    };
    let inner = inner.trim();
    (!inner.is_empty()).then_some(inner)
}
