use anyhow::{Context, Result};
use clap::Parser;

mod build;
mod cli;
mod collect;
mod diff;
mod pipeline;
mod preamble;
mod prompt;
mod target;
mod util;
mod vcs;
mod workspace;

use crate::cli::{Cli, normalize};
use crate::prompt::{AssumeYes, LinePrompt, PromptKind, TermPrompt};


fn main() -> Result<()> {
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(e) => {
      // usage errors exit 1; --help/--version exit 0
      let code = if e.use_stderr() { 1 } else { 0 };
      let _ = e.print();
      std::process::exit(code);
    }
  };

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  util::init_logging();

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;
  let cwd = std::env::current_dir().context("resolving the current directory")?;

  // Phase 2: resolve repository, revisions, target, and output
  if cfg.dry_run {
    let plan = pipeline::plan(&cfg, &cwd)?;
    let doc = serde_json::json!({ "config": cfg, "plan": plan });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    return Ok(());
  }

  // Phase 3: export, diff, build, collect
  let output = match PromptKind::detect(cfg.assume_yes) {
    PromptKind::AssumeYes => pipeline::run(&cfg, &cwd, &mut AssumeYes)?,
    PromptKind::Terminal => pipeline::run(&cfg, &cwd, &mut TermPrompt::new())?,
    PromptKind::Lines => {
      let stdin = std::io::stdin();
      let mut prompt = LinePrompt::new(stdin.lock(), std::io::stderr());
      pipeline::run(&cfg, &cwd, &mut prompt)?
    }
  };

  eprintln!("[delta] wrote {}", output.display());
  println!("{}", output.display());
  Ok(())
}
