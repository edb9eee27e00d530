use crate::control::Controller;

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};

pub const PROMPT: &str = "Pktgen> ";

#[derive(Debug, Parser)]
#[command(multicall = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Exit program
    Quit,
    /// Start packet generation
    Start,
    /// Stop packet generation
    Stop,
    /// Show stats
    Stats,
    /// Reset stats
    Reset,
    /// Set rate in Mbps
    Rate { rate: u32 },
    /// Set churn in fpm
    Churn { churn: u32 },
}

/// Tokenize and parse one line. Blank lines give `None`.
pub fn parse(line: &str) -> Result<Option<ShellCommand>, clap::Error> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(None);
    }
    ShellLine::try_parse_from(tokens).map(|l| Some(l.command))
}

/// Run one command. Breaks when the session must end.
pub fn execute(
    controller: &mut Controller,
    command: ShellCommand,
    out: &mut impl Write,
) -> io::Result<ControlFlow<()>> {
    match command {
        ShellCommand::Quit => {
            controller.quit();
            return Ok(ControlFlow::Break(()));
        }
        ShellCommand::Start => controller.start(),
        ShellCommand::Stop => controller.stop(),
        ShellCommand::Stats => controller.display_stats(out)?,
        ShellCommand::Reset => controller.reset_stats(),
        ShellCommand::Rate { rate } => controller.set_rate(rate as f64 / 1000.),
        ShellCommand::Churn { churn } => controller.set_churn(churn as f64),
    }
    Ok(ControlFlow::Continue(()))
}

/// Read commands from `input` until `quit`, the end of the input, or `shutdown` is raised.
pub fn interact(
    controller: &mut Controller,
    input: impl BufRead,
    out: &mut impl Write,
    shutdown: &AtomicBool,
) -> io::Result<()> {
    let mut lines = input.lines();
    while !shutdown.load(Ordering::Relaxed) {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            writeln!(out)?;
            controller.quit();
            break;
        };
        match parse(&line?) {
            Ok(None) => (),
            Ok(Some(command)) => {
                if execute(controller, command, out)?.is_break() {
                    break;
                }
            }
            Err(e) => write!(out, "{}", e.render())?,
        }
    }
    Ok(())
}
