//! Operator confirmation prompts.

use std::io::{BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use console::Term;
use dialoguer::Input;

/// Source of yes/no answers for the per-file diff loop.
pub trait Confirm {
  fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Only an explicit `n`/`no` (any case) declines; everything else, EOF included, accepts.
pub fn is_negative(answer: &str) -> bool {
  let a = answer.trim();
  a.eq_ignore_ascii_case("n") || a.eq_ignore_ascii_case("no")
}

/// Line editing prompt on the controlling terminal (stderr), used when a person is attached.
pub struct TermPrompt {
  term: Term,
}

impl TermPrompt {
  pub fn new() -> Self {
    Self { term: Term::stderr() }
  }
}

impl Default for TermPrompt {
  fn default() -> Self {
    Self::new()
  }
}

impl Confirm for TermPrompt {
  fn confirm(&mut self, question: &str) -> Result<bool> {
    let answer = Input::<String>::new()
      .with_prompt(format!("{} [Y/n]", question))
      .allow_empty(true)
      .interact_text_on(&self.term)
      .context("reading answer")?;
    Ok(!is_negative(&answer))
  }
}

/// Which answer source a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
  AssumeYes,
  /// stdin and stderr are both terminals.
  Terminal,
  /// Answers piped on stdin, one per line.
  Lines,
}

impl PromptKind {
  pub fn choose(assume_yes: bool, attended: bool) -> Self {
    match (assume_yes, attended) {
      (true, _) => PromptKind::AssumeYes,
      (false, true) => PromptKind::Terminal,
      (false, false) => PromptKind::Lines,
    }
  }

  /// Decide from `--yes` and whether this process talks to a terminal.
  pub fn detect(assume_yes: bool) -> Self {
    let attended = std::io::stdin().is_terminal() && Term::stderr().is_term();
    Self::choose(assume_yes, attended)
  }
}

/// Asks on `output` and reads one line per question from `input`.
///
/// dialoguer refuses to run without a terminal, so piped answers come through here.
pub struct LinePrompt<R, W> {
  input: R,
  output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
  pub fn new(input: R, output: W) -> Self {
    Self { input, output }
  }
}

impl<R: BufRead, W: Write> Confirm for LinePrompt<R, W> {
  fn confirm(&mut self, question: &str) -> Result<bool> {
    write!(self.output, "{} [Y/n] ", question)?;
    self.output.flush()?;
    let mut line = String::new();
    let n = self.input.read_line(&mut line).context("reading answer")?;
    if n == 0 {
      // keep the next prompt on its own line when stdin is exhausted
      writeln!(self.output)?;
    }
    Ok(!is_negative(&line))
  }
}

/// `--yes`: accept every question without reading anything.
pub struct AssumeYes;

impl Confirm for AssumeYes {
  fn confirm(&mut self, _question: &str) -> Result<bool> {
    Ok(true)
  }
}
