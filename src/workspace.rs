// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Own the temporary directory holding the A (old) and B (new) snapshots for one run
// role: resources/workspace
// inputs: none (location follows TMPDIR)
// outputs: Workspace with old_tree()/new_tree() paths and an InterruptGate
// side_effects: Creates a temp directory; installs SIGINT/SIGTERM/SIGHUP watchers for its lifetime
// invariants:
// - the directory is removed on drop (normal return and error propagation)
// - an interrupt removes the directory and exits with 128 + signal, unless the gate is held
// - the gate is held only while an interactive child owns the terminal
// errors: Creation failures surface with context; cleanup failures are ignored
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use tempfile::TempDir;
use tracing::debug;

/// While held, interrupts are left to the foreground child (the recovery shell).
#[derive(Debug, Default, Clone)]
pub struct InterruptGate {
  held: Arc<AtomicBool>,
}

impl InterruptGate {
  pub fn hold(&self) -> GateHold<'_> {
    self.held.store(true, Ordering::SeqCst);
    GateHold { gate: self }
  }

  pub fn is_held(&self) -> bool {
    self.held.load(Ordering::SeqCst)
  }
}

pub struct GateHold<'a> {
  gate: &'a InterruptGate,
}

impl Drop for GateHold<'_> {
  fn drop(&mut self) {
    self.gate.held.store(false, Ordering::SeqCst);
  }
}

pub struct Workspace {
  dir: TempDir,
  gate: InterruptGate,
  signals: Handle,
  watcher: Option<JoinHandle<()>>,
}

impl Workspace {
  pub fn create() -> Result<Self> {
    let dir = tempfile::Builder::new()
      .prefix("tex-delta.")
      .tempdir()
      .context("creating temporary workspace")?;
    let gate = InterruptGate::default();

    let mut signals =
      Signals::new([SIGINT, SIGTERM, SIGHUP]).context("installing interrupt handlers")?;
    let signals_handle = signals.handle();
    let path = dir.path().to_path_buf();
    let watch_gate = gate.clone();
    let watcher = std::thread::spawn(move || {
      for sig in signals.forever() {
        if watch_gate.is_held() {
          continue;
        }
        let _ = std::fs::remove_dir_all(&path);
        eprintln!("\n[workspace] interrupted; removed {}", path.display());
        std::process::exit(128 + sig);
      }
    });

    debug!(dir = %dir.path().display(), "workspace created");
    Ok(Self {
      dir,
      gate,
      signals: signals_handle,
      watcher: Some(watcher),
    })
  }

  pub fn path(&self) -> &Path {
    self.dir.path()
  }

  /// Snapshot of the "from" revision.
  pub fn old_tree(&self) -> PathBuf {
    self.dir.path().join("A")
  }

  /// Snapshot of the "to" revision; diffed and built in place.
  pub fn new_tree(&self) -> PathBuf {
    self.dir.path().join("B")
  }

  pub fn gate(&self) -> &InterruptGate {
    &self.gate
  }
}

impl Drop for Workspace {
  fn drop(&mut self) {
    self.signals.close();
    if let Some(w) = self.watcher.take() {
      let _ = w.join();
    }
    debug!(dir = %self.dir.path().display(), "removing workspace");
  }
}
