use anyhow::{Result, bail};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tex-delta",
    version,
    about = "Build a latexdiff document between two revisions of a LaTeX repository",
    long_about = "Exports REVISION_FROM and --to into a temporary workspace, runs latexdiff over \
                  every .tex file you confirm, builds the result, and copies the artifact next \
                  to the repository (delta.<REV1>-<REV2>.<ext> unless -o is given)."
)]
pub struct Cli {
  /// Revision to diff from (old side)
  #[arg(value_name = "REVISION_FROM")]
  pub rev_from: Option<String>,

  /// Revision to diff to (default: current tip, HEAD for git or "." for Mercurial)
  #[arg(long = "to", value_name = "REV2")]
  pub rev_to: Option<String>,

  /// Output file (default: <repo>/delta.<REV1>-<REV2>.<ext>)
  #[arg(short = 'o', long, value_name = "FILE")]
  pub output: Option<PathBuf>,

  /// Build artifact to collect (default: TARGET from the build config, .pdf appended when bare)
  #[arg(long, value_name = "TGT")]
  pub target: Option<String>,

  /// Build command run inside the patched snapshot
  #[arg(short = 'c', long = "cmd", value_name = "CMD", default_value = "make")]
  pub build_cmd: String,

  /// latexdiff executable
  #[arg(long, value_name = "PROG", env = "TEX_DELTA_LATEXDIFF", default_value = "latexdiff")]
  pub latexdiff: String,

  /// Build configuration file scanned for TARGET=, relative to the repository root
  #[arg(long, value_name = "FILE", env = "TEX_DELTA_BUILD_CONFIG", default_value = "Makefile")]
  pub build_config: PathBuf,

  /// Diff every file without asking
  #[arg(short = 'y', long = "yes")]
  pub assume_yes: bool,

  /// Shell spawned in the snapshot when the build fails
  #[arg(long, value_name = "PROG", env = "SHELL", default_value = "/bin/sh", hide_env_values = true)]
  pub shell: String,

  /// Resolve revisions, target and output, print them as JSON, and stop
  #[arg(long)]
  pub dry_run: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub rev_from: String,
  pub rev_to: Option<String>,
  pub output: Option<PathBuf>,
  pub target: Option<String>,
  pub build_cmd: String,
  pub latexdiff: String,
  pub build_config: PathBuf,
  pub assume_yes: bool,
  pub shell: String,
  pub dry_run: bool,
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let rev_from = match cli.rev_from {
    Some(r) if !r.trim().is_empty() => r,
    Some(_) => bail!("REVISION_FROM must not be empty"),
    None => bail!("Missing REVISION_FROM: name the revision to diff from (see --help)"),
  };

  if cli.build_cmd.trim().is_empty() {
    bail!("--cmd must not be empty");
  }

  let rev_to = cli.rev_to.filter(|r| !r.trim().is_empty());
  let target = cli.target.filter(|t| !t.trim().is_empty());

  Ok(EffectiveConfig {
    rev_from,
    rev_to,
    output: cli.output,
    target,
    build_cmd: cli.build_cmd,
    latexdiff: cli.latexdiff,
    build_config: cli.build_config,
    assume_yes: cli.assume_yes,
    shell: cli.shell,
    dry_run: cli.dry_run,
  })
}
