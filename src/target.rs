//! Build target resolution: what artifact the build produces and which source is the main document.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub const DEFAULT_EXTENSION: &str = "pdf";

static TARGET_LINE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^\s*TARGET\s*[:?]?=\s*(.*)$").expect("valid TARGET regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
  /// Artifact path relative to the snapshot root, e.g. `paper.pdf`.
  pub file: PathBuf,
  /// Extension of `file` without the dot; empty when it has none.
  pub extension: String,
  /// Main document source, `file` with its extension swapped for `tex`.
  pub main_source: PathBuf,
}

impl Target {
  pub fn new(name: &str) -> Self {
    let file = PathBuf::from(name);
    let extension = file
      .extension()
      .map(|e| e.to_string_lossy().to_string())
      .unwrap_or_default();
    let main_source = file.with_extension("tex");
    Self { file, extension, main_source }
  }
}

/// `<raw>.<ext>`, where `ext` is the raw value's own last extension, or `pdf` when it has none.
///
/// `paper` becomes `paper.pdf` and `paper.tex` becomes `paper.tex.tex`.
pub fn with_default_extension(raw: &str) -> String {
  match raw.rsplit_once('.') {
    Some((_, ext)) => format!("{}.{}", raw, ext),
    None => format!("{}.{}", raw, DEFAULT_EXTENSION),
  }
}

/// First `TARGET=` value in `contents`, trimmed.
pub fn parse_target_decl(contents: &str) -> Option<String> {
  contents
    .lines()
    .find_map(|line| TARGET_LINE.captures(line))
    .map(|caps| caps[1].trim().to_string())
}

/// Read `build_config` under `root` and derive the target name from its `TARGET=` line.
pub fn infer(root: &Path, build_config: &Path) -> Result<String> {
  let path = root.join(build_config);
  if !path.is_file() {
    bail!(
      "Cannot infer the target: {} not found (pass --target)",
      path.display()
    );
  }
  let contents =
    std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;

  match parse_target_decl(&contents) {
    None => bail!(
      "Cannot infer the target: TARGET is not declared in {} (pass --target)",
      path.display()
    ),
    Some(v) if v.is_empty() => bail!(
      "Cannot infer the target: TARGET is empty in {} (pass --target)",
      path.display()
    ),
    Some(v) => Ok(with_default_extension(&v)),
  }
}
