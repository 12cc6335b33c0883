//! Command-line interface for blinkmorse.
//!
//! This module provides the CLI structure for the `blinkm` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{parse_gesture, ConfigCommand, DecodeCommand, RunCommand, SimulateCommand};

/// blinkm - Blink in Morse code
///
/// Detects blinks from a face-tracking feed, turns short blinks into dots and
/// long blinks into dashes, and transcribes the result into letters.
#[derive(Debug, Parser)]
#[command(name = "blinkm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay a face trace through the blink detector
    Run(RunCommand),

    /// Decode a list of blink durations without timing
    Simulate(SimulateCommand),

    /// Translate Morse sequences to letters
    Decode(DecodeCommand),

    /// Print the Morse table
    Table,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
