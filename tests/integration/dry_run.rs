use predicates::prelude::*;

fn plan_json(repo: &std::path::Path, extra: &[&str]) -> serde_json::Value {
  let mut cmd = test_support::cmd_bin("tex-delta");
  cmd.current_dir(repo).arg("--dry-run").args(extra).arg("v1");
  let out = cmd.output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn dry_run_reports_inferred_target_and_default_output() {
  let repo = test_support::init_fixture_repo();
  let v = plan_json(repo.path(), &[]);
  let short = test_support::git_output(repo.path(), &["rev-parse", "--short", "HEAD"]);

  assert_eq!(v["plan"]["repository"]["backend"], "git");
  assert_eq!(v["plan"]["rev_from"], "v1");
  assert_eq!(v["plan"]["rev_to"], "HEAD");
  assert_eq!(v["plan"]["rev_to_short"], short.as_str());
  assert_eq!(v["plan"]["target"]["file"], "paper.pdf");
  assert_eq!(v["plan"]["target"]["main_source"], "paper.tex");
  let output = v["plan"]["output"].as_str().unwrap();
  assert!(output.ends_with(&format!("delta.v1-{}.pdf", short)), "output was {}", output);
  assert_eq!(v["config"]["build_cmd"], "make");
}

#[test]
fn explicit_target_and_to_override_inference() {
  let repo = test_support::init_fixture_repo();
  let v = plan_json(repo.path(), &["--target", "slides.ps", "--to", "v1"]);
  let short = test_support::git_output(repo.path(), &["rev-parse", "--short", "v1"]);
  assert_eq!(v["plan"]["target"]["file"], "slides.ps");
  assert_eq!(v["plan"]["target"]["main_source"], "slides.tex");
  assert!(v["plan"]["output"].as_str().unwrap().ends_with(&format!("delta.v1-{}.ps", short)));
}

#[test]
fn missing_build_config_without_target_fails() {
  let repo = test_support::init_fixture_repo();
  test_support::cmd_bin("tex-delta")
    .current_dir(repo.path())
    .args(["--dry-run", "--build-config", "GNUmakefile", "v1"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("Cannot infer the target"));
}

#[test]
fn unknown_to_revision_fails() {
  let repo = test_support::init_fixture_repo();
  test_support::cmd_bin("tex-delta")
    .current_dir(repo.path())
    .args(["--dry-run", "--to", "no-such-rev", "v1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("no-such-rev"));
}

#[test]
fn dry_run_in_mercurial_checkout_defaults_to_working_parent() {
  let Some(repo) = test_support::init_hg_fixture_repo() else {
    eprintln!("hg not installed; skipping");
    return;
  };
  let v = plan_json(repo.path(), &[]);
  let short = test_support::hg_output(repo.path(), &["log", "-r", ".", "--template", "{node|short}"]);

  assert_eq!(v["plan"]["repository"]["backend"], "mercurial");
  assert_eq!(v["plan"]["rev_to"], ".");
  assert_eq!(v["plan"]["rev_to_short"], short.as_str());
  assert!(v["plan"]["output"].as_str().unwrap().ends_with(&format!("delta.v1-{}.pdf", short)));
}
