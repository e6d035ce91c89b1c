//! Monolithic blending-shader composition.
//!
//! Every registered blend mode contributes one fragment file. Composition
//! weaves all fragment code into a single GLSL 1.10 program, then generates
//! a `blend()` dispatch function keyed by registry index and a `main()` that
//! converts between the pipeline's premultiplied alpha and the straight
//! alpha the blend functions expect.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::warn;

use super::{classify_line, BlendRegistry, DirectiveLine, FRAGMENT_EXTENSION};

const SHADER_HEADER: &str = r#"#version 110

uniform sampler2D background;
uniform sampler2D foreground;
varying vec2 vTexCoord;
uniform float opacity;
uniform int blendmode;


"#;

const DISPATCH_OPEN: &str = "vec3 blend(vec3 base, vec3 blend, float opacity) {\n";

const SHADER_MAIN: &str = r#"
  return blend;
}

void main() {
  vec4 bg_color = texture2D(background, vTexCoord);
  vec4 fg_color = texture2D(foreground, vTexCoord);
  if (fg_color.a > 0.0) {
    float true_opacity = opacity * fg_color.a;
    vec3 unmultiplied_fg = max(vec3(0.0), min(vec3(1.0), fg_color.rgb / fg_color.a));
    vec3 blended_rgb = blend(bg_color.rgb, unmultiplied_fg, true_opacity);
    vec4 composite = vec4(blended_rgb, bg_color.a + true_opacity);
    gl_FragColor = composite;
  } else {
    gl_FragColor = bg_color;
  }
}
"#;

/// Name and export overrides collected from one fragment's directives.
#[derive(Debug, Default)]
struct FragmentHeader {
    name: Option<String>,
    function_name: Option<String>,
}

/// Composes the blending shader from every registered fragment.
///
/// Fragment code is woven in registry order, dependencies before dependents.
/// Modes whose fragment cannot be opened stay unloaded but still get a
/// dispatch branch; at runtime an unresolved branch falls through to the
/// pass-through return.
pub fn compose_blending_shader(registry: &mut BlendRegistry) -> String {
    let mut shader = String::from(SHADER_HEADER);

    for index in 0..registry.modes.len() {
        weave_fragment(registry, index, &mut shader);
    }

    shader.push_str(DISPATCH_OPEN);
    for (index, mode) in registry.modes.iter().enumerate() {
        if index == 0 {
            shader.push_str("  if (blendmode == 0) {\n");
        } else {
            shader.push_str(&format!(" else if (blendmode == {index}) {{\n"));
        }
        shader.push_str(&format!(
            "    return {}(base, blend, opacity);\n",
            mode.function_name
        ));
        shader.push_str("  }");
    }
    shader.push_str(SHADER_MAIN);

    shader
}

/// Weaves one registered fragment into the shader, recursing through its
/// requires first.
fn weave_fragment(registry: &mut BlendRegistry, index: usize, shader: &mut String) {
    if registry.modes[index].loaded {
        return;
    }

    let url = registry.modes[index].url.clone();
    let file = match File::open(&url) {
        Ok(file) => file,
        Err(err) => {
            warn!("Failed to open blending shader {}: {}", url.display(), err);
            return;
        }
    };

    // Mark before weaving so a require cycle short-circuits on the second
    // visit instead of recursing forever.
    registry.modes[index].loaded = true;

    let header = weave_lines(registry, file, &url, shader);
    let mode = &mut registry.modes[index];
    if let Some(name) = header.name {
        mode.name = name;
    }
    if let Some(function_name) = header.function_name {
        mode.function_name = function_name;
    }
}

/// Weaves a dependency with no registry entry: its code is included but it
/// never appears in the dispatch table, and nothing remembers it was woven.
fn weave_unregistered(registry: &mut BlendRegistry, url: PathBuf, shader: &mut String) {
    let file = match File::open(&url) {
        Ok(file) => file,
        Err(err) => {
            warn!("Failed to open blending shader {}: {}", url.display(), err);
            return;
        }
    };
    let _ = weave_lines(registry, file, &url, shader);
}

/// Streams one fragment's lines into the shader, resolving require
/// directives in place, and returns its header overrides.
fn weave_lines(
    registry: &mut BlendRegistry,
    file: File,
    url: &Path,
    shader: &mut String,
) -> FragmentHeader {
    let mut header = FragmentHeader::default();

    for line in BufReader::new(file).lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("Error reading blending shader {}: {}", url.display(), err);
                break;
            }
        };
        let line = line.strip_suffix('\r').unwrap_or(&line);

        match classify_line(line) {
            Some(DirectiveLine::Name(name)) => {
                header.name = Some(name.to_string());
            }
            Some(DirectiveLine::Export(function_name)) => {
                header.function_name = Some(function_name.to_string());
            }
            Some(DirectiveLine::Require(ident)) => {
                let include_url = resolve_include(url, ident);
                match registry.position_of_path(&include_url) {
                    Some(index) => weave_fragment(registry, index, shader),
                    None => weave_unregistered(registry, include_url, shader),
                }
            }
            Some(DirectiveLine::Ignored) => {}
            None => {
                shader.push_str(line);
                shader.push('\n');
            }
        }
    }

    header
}

/// Resolves a require identifier against the requiring fragment's directory.
fn resolve_include(fragment_url: &Path, ident: &str) -> PathBuf {
    let file_name = format!("{ident}.{FRAGMENT_EXTENSION}");
    match fragment_url.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}
