use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// `<root>/delta.<from>-<to_short>.<ext>`; slashes in `from` become dashes.
pub fn default_output_path(root: &Path, rev_from: &str, to_short: &str, extension: &str) -> PathBuf {
  let from = rev_from.replace('/', "-");
  let name = if extension.is_empty() {
    format!("delta.{}-{}", from, to_short)
  } else {
    format!("delta.{}-{}.{}", from, to_short, extension)
  };
  root.join(name)
}

/// Copy the built artifact to `output`. Fails, copying nothing, when the artifact is missing.
pub fn collect(artifact: &Path, output: &Path) -> Result<u64> {
  if !artifact.is_file() {
    bail!(
      "Build artifact {} not found; no output written",
      artifact.display()
    );
  }
  if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  std::fs::copy(artifact, output)
    .with_context(|| format!("copying {} to {}", artifact.display(), output.display()))
}
