use predicates::prelude::*;
use std::path::{Path, PathBuf};

const SENTINEL: &str = "%DIF PREAMBLE EXTENSION ADDED BY LATEXDIFF";

struct Run {
  status: std::process::ExitStatus,
  stdout: String,
  stderr: String,
}

fn run_delta(repo: &Path, tools: &Path, tmp: &Path, stdin: &str, extra: &[&str]) -> Run {
  let latexdiff = test_support::fake_latexdiff(tools);
  let mut cmd = test_support::cmd_bin("tex-delta");
  cmd
    .current_dir(repo)
    .env("TMPDIR", tmp)
    .args(["--latexdiff", latexdiff.to_str().unwrap(), "-c", test_support::FAKE_BUILD, "--shell", "true"])
    .args(extra)
    .arg("v1")
    .write_stdin(stdin);
  let out = cmd.output().unwrap();
  Run {
    status: out.status,
    stdout: String::from_utf8_lossy(&out.stdout).to_string(),
    stderr: String::from_utf8_lossy(&out.stderr).to_string(),
  }
}

fn default_output(repo: &Path) -> PathBuf {
  let short = test_support::git_output(repo, &["rev-parse", "--short", "HEAD"]);
  repo.join(format!("delta.v1-{}.pdf", short))
}

#[test]
fn accepted_files_are_diffed_and_artifact_copied() {
  let repo = test_support::init_fixture_repo();
  let tools = test_support::tempdir();
  let tmp = test_support::tempdir();

  let run = run_delta(repo.path(), tools.path(), tmp.path(), "\n\n", &[]);
  assert!(run.status.success(), "stderr: {}", run.stderr);

  let out = default_output(repo.path());
  assert_eq!(
    std::fs::canonicalize(run.stdout.trim()).unwrap(),
    std::fs::canonicalize(&out).unwrap()
  );
  let pdf = std::fs::read_to_string(&out).unwrap();
  assert!(pdf.starts_with(SENTINEL));
  assert!(pdf.contains(test_support::FAKE_DIFF_HEADER));
  assert!(pdf.contains(test_support::V2_MARKER));
  assert!(!pdf.contains(test_support::V1_MARKER));

  // paper.tex and sections/intro.tex are diffed; results.tex is new
  let log = test_support::latexdiff_log(tools.path());
  assert!(log.contains("A/paper.tex"));
  assert!(log.contains("A/sections/intro.tex"));
  assert!(!log.contains("results.tex"));
  assert!(run.stderr.contains("sections/results.tex is new"));

  assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0, "workspace left behind");
}

#[test]
fn answering_no_keeps_new_revision_content() {
  let repo = test_support::init_fixture_repo();
  let tools = test_support::tempdir();
  let tmp = test_support::tempdir();

  let run = run_delta(repo.path(), tools.path(), tmp.path(), "No\ny\n", &[]);
  assert!(run.status.success(), "stderr: {}", run.stderr);

  let pdf = std::fs::read_to_string(default_output(repo.path())).unwrap();
  // preamble still added, but paper.tex itself carries no diff markup
  assert!(pdf.starts_with(SENTINEL));
  assert!(!pdf.contains(test_support::FAKE_DIFF_HEADER));
  let head_paper = test_support::git_output(repo.path(), &["show", "HEAD:paper.tex"]);
  assert!(pdf.contains(&head_paper));

  let log = test_support::latexdiff_log(tools.path());
  assert!(!log.contains("A/paper.tex"));
  assert!(log.contains("A/sections/intro.tex"));
}

#[test]
fn yes_flag_skips_prompts_and_output_flag_is_honored() {
  let repo = test_support::init_fixture_repo();
  let tools = test_support::tempdir();
  let tmp = test_support::tempdir();
  let dest = test_support::tempdir();
  let target = dest.path().join("review/diff.pdf");

  let run = run_delta(repo.path(), tools.path(), tmp.path(), "n\nn\n", &["-y", "-o", target.to_str().unwrap()]);
  assert!(run.status.success(), "stderr: {}", run.stderr);
  assert!(!run.stderr.contains("[Y/n]"));

  let pdf = std::fs::read_to_string(&target).unwrap();
  assert!(pdf.contains(test_support::FAKE_DIFF_HEADER));
  assert!(!default_output(repo.path()).exists());
}

#[test]
fn missing_artifact_writes_no_output() {
  let repo = test_support::init_fixture_repo();
  let tools = test_support::tempdir();
  let tmp = test_support::tempdir();

  let run = run_delta(repo.path(), tools.path(), tmp.path(), "", &["--target", "paper.dvi"]);
  assert!(!run.status.success());
  assert!(run.stderr.contains("not found"), "stderr: {}", run.stderr);
  assert!(!repo.path().join(format!(
    "delta.v1-{}.dvi",
    test_support::git_output(repo.path(), &["rev-parse", "--short", "HEAD"])
  )).exists());
  assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0, "workspace left behind");
}

#[test]
fn latexdiff_failure_aborts_the_run() {
  let repo = test_support::init_fixture_repo();
  let tmp = test_support::tempdir();
  test_support::cmd_bin("tex-delta")
    .current_dir(repo.path())
    .env("TMPDIR", tmp.path())
    .args(["--latexdiff", "false", "-y", "-c", test_support::FAKE_BUILD, "v1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("diffing paper.tex"));
  assert!(!default_output(repo.path()).exists());
  assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0, "workspace left behind");
}

#[test]
fn build_chatter_stays_off_stdout() {
  let repo = test_support::init_fixture_repo();
  let tools = test_support::tempdir();
  let tmp = test_support::tempdir();
  let latexdiff = test_support::fake_latexdiff(tools.path());

  let out = test_support::cmd_bin("tex-delta")
    .current_dir(repo.path())
    .env("TMPDIR", tmp.path())
    .args(["--latexdiff", latexdiff.to_str().unwrap(), "--shell", "true", "-y"])
    .args(["-c", "echo BUILD-NOISE; cp paper.tex paper.pdf"])
    .arg("v1")
    .output()
    .unwrap();
  let stdout = String::from_utf8_lossy(&out.stdout);
  let stderr = String::from_utf8_lossy(&out.stderr);
  assert!(out.status.success(), "stderr: {}", stderr);

  assert!(!stdout.contains("BUILD-NOISE"), "stdout: {}", stdout);
  assert!(stderr.contains("BUILD-NOISE"));
  // stdout is exactly the output path
  assert_eq!(stdout.lines().count(), 1);
  assert_eq!(
    std::fs::canonicalize(stdout.trim()).unwrap(),
    std::fs::canonicalize(default_output(repo.path())).unwrap()
  );
}
