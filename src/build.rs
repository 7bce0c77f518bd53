//! Build invocation with an interactive fallback shell.

use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::workspace::InterruptGate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
  /// The build command exited successfully.
  Built,
  /// The build failed and the operator was handed a shell; the artifact may or may not exist.
  Recovered,
}

/// Run `cmd` through `sh -c` in `dir`; returns whether it succeeded.
///
/// The build's stdout is sent to stderr; stdout carries only the output path.
pub fn run_build(cmd: &str, dir: &Path) -> Result<bool> {
  info!(cmd, dir = %dir.display(), "building");
  let status = Command::new("sh")
    .arg("-c")
    .arg(cmd)
    .current_dir(dir)
    .stdout(Stdio::from(std::io::stderr()))
    .status()
    .with_context(|| format!("spawning build command `{}`", cmd))?;
  Ok(status.success())
}

/// Spawn `shell` in `dir` and block until the operator leaves it. Its exit status is ignored.
pub fn recovery_shell(shell: &str, dir: &Path, gate: &InterruptGate) -> Result<()> {
  let _held = gate.hold();
  let status = Command::new(shell)
    .current_dir(dir)
    .status()
    .with_context(|| format!("spawning recovery shell {}", shell))?;
  info!(%status, "recovery shell exited");
  Ok(())
}

pub fn build_or_recover(cmd: &str, shell: &str, dir: &Path, gate: &InterruptGate) -> Result<BuildOutcome> {
  if run_build(cmd, dir)? {
    return Ok(BuildOutcome::Built);
  }

  warn!(cmd, "build failed");
  eprintln!("[build] `{}` failed in {}", cmd, dir.display());
  eprintln!("[build] Starting {} there; fix the document, rerun the build, then exit to continue.", shell);
  recovery_shell(shell, dir, gate)?;
  Ok(BuildOutcome::Recovered)
}
