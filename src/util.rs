// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Subprocess helpers, logging setup, and man page rendering
// role: utilities/helpers
// inputs: Program names + args; working directories; clap CommandFactory
// outputs: Captured stdout, command lines for diagnostics, man page text
// side_effects: run_cmd/run_to_file invoke subprocesses; run_to_file writes the destination file
// invariants:
// - run_cmd never returns Ok for a non-zero exit status
// - run_to_file leaves no partial destination behind on failure
// - init_logging is safe to call more than once
// errors: Subprocess failures carry the full command line and stderr; IO errors bubble with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use clap::CommandFactory;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

/// Human readable command line used in diagnostics.
pub fn display_cmd(program: &str, args: &[String]) -> String {
  let mut s = program.to_string();
  for a in args {
    s.push(' ');
    if a.is_empty() || a.contains(char::is_whitespace) {
      s.push_str(&format!("{:?}", a));
    } else {
      s.push_str(a);
    }
  }
  s
}

/// Run `program args` in `dir` and return its stdout.
pub fn run_cmd(program: &str, dir: &Path, args: &[String]) -> Result<String> {
  let shown = display_cmd(program, args);
  debug!(cmd = %shown, dir = %dir.display(), "running");
  let out = Command::new(program)
    .args(args)
    .current_dir(dir)
    .stdin(Stdio::null())
    .output()
    .with_context(|| format!("spawning {}", shown))?;

  if out.status.success() {
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
  } else {
    let stderr = String::from_utf8_lossy(&out.stderr);
    bail!("`{}` failed ({}): {}", shown, out.status, stderr.trim())
  }
}

/// Like `run_cmd` but only reports whether the command succeeded; spawn errors count as failure.
pub fn probe_cmd(program: &str, dir: &Path, args: &[String]) -> Option<String> {
  let out = Command::new(program)
    .args(args)
    .current_dir(dir)
    .stdin(Stdio::null())
    .stderr(Stdio::null())
    .output()
    .ok()?;
  if out.status.success() {
    Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
  } else {
    None
  }
}

/// Run `program args` in `dir`, streaming its stdout into `dest`.
pub fn run_to_file(program: &str, dir: &Path, args: &[String], dest: &Path) -> Result<()> {
  let shown = display_cmd(program, args);
  debug!(cmd = %shown, dest = %dest.display(), "running");
  let file = File::create(dest).with_context(|| format!("creating {}", dest.display()))?;
  let out = Command::new(program)
    .args(args)
    .current_dir(dir)
    .stdin(Stdio::null())
    .stdout(Stdio::from(file))
    .stderr(Stdio::piped())
    .output();

  let out = match out {
    Ok(o) => o,
    Err(e) => {
      let _ = std::fs::remove_file(dest);
      return Err(e).with_context(|| format!("spawning {}", shown));
    }
  };

  if !out.status.success() {
    let _ = std::fs::remove_file(dest);
    let stderr = String::from_utf8_lossy(&out.stderr);
    bail!("`{}` failed ({}): {}", shown, out.status, stderr.trim());
  }
  Ok(())
}

/// Install the stderr `tracing` subscriber.
///
/// The filter comes from `TEX_DELTA_LOG`, then `RUST_LOG`, and defaults to `warn`.
pub fn init_logging() {
  let filter = EnvFilter::try_from_env("TEX_DELTA_LOG")
    .or_else(|_| EnvFilter::try_from_default_env())
    .unwrap_or_else(|_| EnvFilter::new("warn"));
  let _ = fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init();
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
