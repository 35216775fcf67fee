use crate::utils::Session;
use crate::{Cli, Commands};
use clap::Parser;
use colored::Colorize;
use std::io::{BufRead, IsTerminal, Write};

const PROMPT: &str = "minicloud> ";

/// Split a shell line into words; `#` starts a comment
fn words(line: &str) -> Vec<&str> {
    let line = line.split('#').next().unwrap_or_default();
    line.split_whitespace().collect()
}

/// Run commands read from stdin against one session
///
/// Caches and stub clouds live as long as the shell. Failed lines are
/// reported and counted; the shell fails when any line did.
pub fn handle(session: &Session) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();
    let mut failures = 0usize;

    if interactive {
        print!("{}", PROMPT);
        std::io::stdout().flush()?;
    }
    for line in stdin.lock().lines() {
        let line = line?;
        let words = words(&line);
        match words.first() {
            None => {}
            Some(&"exit") | Some(&"quit") => break,
            Some(_) => {
                if let Err(e) = run_line(session, &words) {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                    failures += 1;
                }
            }
        }
        if interactive {
            print!("{}", PROMPT);
            std::io::stdout().flush()?;
        }
    }

    if failures > 0 {
        anyhow::bail!("{} shell command(s) failed", failures);
    }
    Ok(())
}

fn run_line(session: &Session, words: &[&str]) -> anyhow::Result<()> {
    tracing::debug!("shell: {}", words.join(" "));
    let cli = Cli::try_parse_from(std::iter::once("minicloud").chain(words.iter().copied()))?;
    if matches!(cli.command, Commands::Shell) {
        anyhow::bail!("already in a shell");
    }
    super::dispatch(session, cli.command)
}
