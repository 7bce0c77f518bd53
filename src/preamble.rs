//! Inject the latexdiff preamble into the main document source, at most once.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::diff::latexdiff_options;
use crate::util::run_cmd;

/// First line of every preamble block latexdiff emits.
pub const SENTINEL: &str = "%DIF PREAMBLE EXTENSION ADDED BY LATEXDIFF";

const INTRO: &str = "Preamble commands:";

pub fn has_sentinel(source: &str) -> bool {
  source.contains(SENTINEL)
}

/// Strip the introductory line (and blank lines around it) from `--show-preamble` output.
pub fn extract_preamble(raw: &str) -> String {
  let body: Vec<&str> = raw
    .lines()
    .skip_while(|l| l.trim().is_empty() || l.trim() == INTRO)
    .collect();
  let mut out = body.join("\n");
  let trimmed = out.trim_end().len();
  out.truncate(trimmed);
  out.push('\n');
  out
}

/// Run `latexdiff --show-preamble` with the same options the diff step uses.
pub fn render_preamble(latexdiff: &str, dir: &Path) -> Result<String> {
  let mut args = latexdiff_options();
  args.push("--show-preamble".into());
  let raw = run_cmd(latexdiff, dir, &args).context("rendering the latexdiff preamble")?;
  let preamble = extract_preamble(&raw);
  if !has_sentinel(&preamble) {
    bail!("`{} --show-preamble` output lacks the {:?} marker", latexdiff, SENTINEL);
  }
  Ok(preamble)
}

/// Prepend the preamble to `main_source` unless it is already there. Returns whether the file changed.
pub fn ensure_preamble(latexdiff: &str, main_source: &Path) -> Result<bool> {
  let original = std::fs::read_to_string(main_source)
    .with_context(|| format!("reading main source {}", main_source.display()))?;
  if has_sentinel(&original) {
    info!(file = %main_source.display(), "preamble already present");
    return Ok(false);
  }

  let dir = main_source.parent().unwrap_or_else(|| Path::new("."));
  let preamble = render_preamble(latexdiff, dir)?;
  std::fs::write(main_source, format!("{}{}", preamble, original))
    .with_context(|| format!("writing {}", main_source.display()))?;
  info!(file = %main_source.display(), "preamble injected");
  Ok(true)
}
