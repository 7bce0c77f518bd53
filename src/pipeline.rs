// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate one delta run: resolve, export, diff, patch, build, collect
// role: processing/orchestrator
// inputs: EffectiveConfig, invocation directory, Confirm implementation
// outputs: Plan (for --dry-run) or the path of the copied artifact
// side_effects: Temporary workspace; subprocesses; prompts; writes the output file
// invariants:
// - the plan (backend, revisions, target, output) is fully resolved before the workspace exists
// - steps run strictly in order; each completes before the next begins
// - the workspace is gone when run returns, whether Ok or Err
// - no output file is written unless the artifact exists after the build step
// errors: Any export/diff/preamble/collect failure aborts; build failure is recovered interactively
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::build::{build_or_recover, BuildOutcome};
use crate::cli::EffectiveConfig;
use crate::collect::{collect, default_output_path};
use crate::diff::diff_sources;
use crate::preamble::ensure_preamble;
use crate::prompt::Confirm;
use crate::target::{self, Target};
use crate::vcs::Repository;
use crate::workspace::Workspace;

#[derive(Debug, Clone, Serialize)]
pub struct Plan {
  pub repository: Repository,
  pub rev_from: String,
  pub rev_to: String,
  pub rev_to_short: String,
  pub target: Target,
  pub output: PathBuf,
}

/// Resolve everything that does not need a snapshot.
pub fn plan(cfg: &EffectiveConfig, cwd: &Path) -> Result<Plan> {
  let repository = Repository::detect(cwd)?;

  let rev_to = cfg
    .rev_to
    .clone()
    .unwrap_or_else(|| repository.current_marker().to_string());

  let target_name = match &cfg.target {
    Some(t) => t.clone(),
    None => target::infer(&repository.root, &cfg.build_config)?,
  };
  let target = Target::new(&target_name);

  let rev_to_short = repository.short_id(&rev_to)?;

  let output = match &cfg.output {
    Some(o) if o.is_absolute() => o.clone(),
    Some(o) => cwd.join(o),
    None => default_output_path(&repository.root, &cfg.rev_from, &rev_to_short, &target.extension),
  };

  Ok(Plan {
    repository,
    rev_from: cfg.rev_from.clone(),
    rev_to,
    rev_to_short,
    target,
    output,
  })
}

/// Execute a full run and return where the artifact was copied.
pub fn run(cfg: &EffectiveConfig, cwd: &Path, prompt: &mut dyn Confirm) -> Result<PathBuf> {
  let plan = plan(cfg, cwd)?;
  let ws = Workspace::create()?;
  let old_tree = ws.old_tree();
  let new_tree = ws.new_tree();

  eprintln!("[vcs] exporting {} and {} into {}", plan.rev_from, plan.rev_to, ws.path().display());
  plan.repository.export(&plan.rev_from, &old_tree)?;
  plan.repository.export(&plan.rev_to, &new_tree)?;

  let summary = diff_sources(&cfg.latexdiff, &old_tree, &new_tree, prompt)?;
  eprintln!(
    "[diff] {} diffed, {} declined, {} new",
    summary.diffed.len(),
    summary.declined.len(),
    summary.new_files.len()
  );

  if ensure_preamble(&cfg.latexdiff, &new_tree.join(&plan.target.main_source))? {
    eprintln!("[diff] added latexdiff preamble to {}", plan.target.main_source.display());
  }

  let outcome = build_or_recover(&cfg.build_cmd, &cfg.shell, &new_tree, ws.gate())?;
  info!(?outcome, "build step finished");
  if outcome == BuildOutcome::Recovered {
    eprintln!("[build] continuing after recovery shell");
  }

  let bytes = collect(&new_tree.join(&plan.target.file), &plan.output)?;
  info!(bytes, output = %plan.output.display(), "artifact collected");
  Ok(plan.output)
}
