// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Walk the new snapshot's .tex sources and replace each confirmed one with latexdiff output
// role: processing/diff-driver
// inputs: latexdiff program; old (A) and new (B) snapshot roots; a Confirm implementation
// outputs: DiffSummary listing diffed, declined, and new-only files
// side_effects: Renames B/<file> to B/<file>.orig and writes annotated B/<file>; prompts the operator
// invariants:
// - declined files keep the new revision's content byte for byte
// - files are processed one at a time in file-name order
// - a failed latexdiff run restores the original file before the error propagates
// errors: latexdiff failures abort with the command line and stderr
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::prompt::Confirm;
use crate::util::run_to_file;

/// Fixed latexdiff configuration: picture-like and author wrappers are copied without markup,
/// and sectioning/author commands never receive inline markup.
pub fn latexdiff_options() -> Vec<String> {
  vec![
    r"--config=PICTUREENV=(?:picture|DIFnomarkup|authors)[\w\d*@]*".into(),
    "--exclude-textcmd=section,subsection,subsubsection,author".into(),
  ]
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiffSummary {
  pub diffed: Vec<PathBuf>,
  pub declined: Vec<PathBuf>,
  /// Present only in the new snapshot; left untouched.
  pub new_files: Vec<PathBuf>,
}

/// Every `.tex` file under `root`, relative to it, in file-name order.
pub fn source_files(root: &Path) -> Result<Vec<PathBuf>> {
  let mut files = Vec::new();
  for entry in WalkDir::new(root).sort_by_file_name() {
    let entry = entry.with_context(|| format!("walking {}", root.display()))?;
    if !entry.file_type().is_file() {
      continue;
    }
    let is_tex = entry.path().extension().map(|e| e == "tex").unwrap_or(false);
    if !is_tex {
      continue;
    }
    let rel = entry
      .path()
      .strip_prefix(root)
      .with_context(|| format!("{} escapes {}", entry.path().display(), root.display()))?;
    files.push(rel.to_path_buf());
  }
  Ok(files)
}

fn aside_path(path: &Path) -> PathBuf {
  let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
  name.push(".orig");
  path.with_file_name(name)
}

/// Replace `new_root/rel` with `latexdiff old_root/rel <original new content>`.
pub fn diff_one(latexdiff: &str, old_root: &Path, new_root: &Path, rel: &Path) -> Result<()> {
  let target = new_root.join(rel);
  let aside = aside_path(&target);
  std::fs::rename(&target, &aside)
    .with_context(|| format!("moving {} aside", target.display()))?;

  let mut args = latexdiff_options();
  args.push(old_root.join(rel).to_string_lossy().to_string());
  args.push(aside.to_string_lossy().to_string());

  if let Err(e) = run_to_file(latexdiff, new_root, &args, &target) {
    let _ = std::fs::rename(&aside, &target);
    return Err(e).with_context(|| format!("diffing {}", rel.display()));
  }
  Ok(())
}

/// Ask about every source file of `new_root` and diff the accepted ones against `old_root`.
pub fn diff_sources(
  latexdiff: &str,
  old_root: &Path,
  new_root: &Path,
  prompt: &mut dyn Confirm,
) -> Result<DiffSummary> {
  let mut summary = DiffSummary::default();

  for rel in source_files(new_root)? {
    if !old_root.join(&rel).is_file() {
      warn!(file = %rel.display(), "no counterpart in the old revision; left unmarked");
      eprintln!("[diff] {} is new; left unmarked", rel.display());
      summary.new_files.push(rel);
      continue;
    }

    if !prompt.confirm(&format!("Diff {}?", rel.display()))? {
      info!(file = %rel.display(), "declined");
      summary.declined.push(rel);
      continue;
    }

    diff_one(latexdiff, old_root, new_root, &rel)?;
    info!(file = %rel.display(), "diffed");
    summary.diffed.push(rel);
  }

  Ok(summary)
}
