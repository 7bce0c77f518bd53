// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Detect the version-control backend of the working directory and export revisions as plain trees
// role: adapters/vcs
// inputs: Working directory; revision identifiers; destination directories
// outputs: Repository {backend, root}; exported snapshot trees; short revision ids
// side_effects: Spawns git/tar/hg subprocesses; writes snapshot trees
// invariants:
// - git is preferred whenever `git rev-parse --git-dir` succeeds
// - Mercurial is only selected after `hg root` succeeds; otherwise detection fails
// - export never reuses a non-empty destination
// errors: Any non-zero subprocess exit aborts with the command line and stderr
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::util::{display_cmd, probe_cmd, run_cmd};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  Git,
  Mercurial,
}

impl Backend {
  fn program(self) -> &'static str {
    match self {
      Backend::Git => "git",
      Backend::Mercurial => "hg",
    }
  }

  /// Revision naming the current tip of the working copy.
  pub fn current_marker(self) -> &'static str {
    match self {
      Backend::Git => "HEAD",
      Backend::Mercurial => ".",
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct Repository {
  pub backend: Backend,
  pub root: PathBuf,
}

impl Repository {
  /// Find the repository containing `cwd`, preferring git over Mercurial.
  pub fn detect(cwd: &Path) -> Result<Self> {
    let git_dir = probe_cmd("git", cwd, &["rev-parse".into(), "--git-dir".into()]);
    if git_dir.is_some() {
      let top = run_cmd("git", cwd, &["rev-parse".into(), "--show-toplevel".into()])
        .context("resolving git work tree root")?;
      let root = PathBuf::from(top.trim());
      debug!(root = %root.display(), "detected git repository");
      return Ok(Self { backend: Backend::Git, root });
    }

    if let Some(top) = probe_cmd("hg", cwd, &["root".into()]) {
      let root = PathBuf::from(top);
      debug!(root = %root.display(), "detected mercurial repository");
      return Ok(Self { backend: Backend::Mercurial, root });
    }

    bail!("{} is not inside a git or mercurial repository", cwd.display())
  }

  pub fn current_marker(&self) -> &'static str {
    self.backend.current_marker()
  }

  /// Abbreviated, stable identifier for `rev` (used in default output names).
  pub fn short_id(&self, rev: &str) -> Result<String> {
    let args: Vec<String> = match self.backend {
      Backend::Git => vec!["rev-parse".into(), "--short".into(), "--verify".into(), format!("{}^{{commit}}", rev)],
      Backend::Mercurial => vec!["log".into(), "-r".into(), rev.into(), "--template".into(), "{node|short}".into()],
    };
    let out = run_cmd(self.backend.program(), &self.root, &args)
      .with_context(|| format!("resolving revision {}", rev))?;
    let id = out.trim().to_string();
    if id.is_empty() {
      bail!("revision {} did not resolve to an id", rev);
    }
    Ok(id)
  }

  /// Materialize `rev` as a plain directory tree at `dest`.
  pub fn export(&self, rev: &str, dest: &Path) -> Result<()> {
    if dest.exists() && std::fs::read_dir(dest)?.next().is_some() {
      bail!("export destination {} is not empty", dest.display());
    }
    info!(rev, dest = %dest.display(), backend = ?self.backend, "exporting revision");
    match self.backend {
      Backend::Git => self.git_archive(rev, dest),
      Backend::Mercurial => {
        let args: Vec<String> = vec![
          "clone".into(),
          "-q".into(),
          "-r".into(),
          rev.into(),
          self.root.to_string_lossy().to_string(),
          dest.to_string_lossy().to_string(),
        ];
        run_cmd("hg", &self.root, &args).map(|_| ())
      }
    }
  }

  /// `git archive --format=tar <rev> | tar -x -C <dest>`
  fn git_archive(&self, rev: &str, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest).with_context(|| format!("creating {}", dest.display()))?;

    let archive_args: Vec<String> = vec!["archive".into(), "--format=tar".into(), rev.into()];
    let shown = display_cmd("git", &archive_args);
    // stderr is spooled to a file and read back only on failure
    let mut errors = tempfile::tempfile().context("creating git archive stderr spool")?;
    let mut archive = Command::new("git")
      .args(&archive_args)
      .current_dir(&self.root)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::from(errors.try_clone()?))
      .spawn()
      .with_context(|| format!("spawning {}", shown))?;

    let tar_stream = archive.stdout.take().context("git archive produced no stdout")?;
    let untar = Command::new("tar")
      .arg("-x")
      .arg("-C")
      .arg(dest)
      .stdin(Stdio::from(tar_stream))
      .stderr(Stdio::piped())
      .output()
      .context("spawning tar -x")?;

    let status = archive.wait().with_context(|| format!("waiting for {}", shown))?;
    if !status.success() {
      let mut stderr = String::new();
      errors.seek(SeekFrom::Start(0))?;
      errors.read_to_string(&mut stderr)?;
      bail!("`{}` failed ({}): {}", shown, status, stderr.trim());
    }
    if !untar.status.success() {
      let stderr = String::from_utf8_lossy(&untar.stderr);
      bail!("`tar -x -C {}` failed ({}): {}", dest.display(), untar.status, stderr.trim());
    }
    Ok(())
  }
}
