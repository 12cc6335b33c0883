//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};

use crate::decoder::Gesture;

/// Run command arguments.
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Face trace to replay (`<seconds> <face_height|->` per line)
    #[arg(short, long, value_name = "FILE")]
    pub trace: PathBuf,

    /// Print snapshots as JSON lines
    #[arg(short, long)]
    pub json: bool,

    /// Only print the final transcription
    #[arg(long)]
    pub no_follow: bool,
}

/// Simulate command arguments.
#[derive(Debug, Args)]
pub struct SimulateCommand {
    /// Blink durations in seconds; `/` ends a letter, `//` ends a word
    #[arg(required = true, value_parser = parse_gesture)]
    pub gestures: Vec<Gesture>,

    /// Open-eye time between blinks, in milliseconds
    #[arg(long, default_value = "200")]
    pub spacing_ms: u64,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Decode command arguments.
#[derive(Debug, Args)]
pub struct DecodeCommand {
    /// Morse sequences such as `.-` or `-...`
    #[arg(required = true, allow_hyphen_values = true)]
    pub sequences: Vec<String>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration file
    Validate {
        /// Path to config file (default: standard location)
        file: Option<PathBuf>,
    },
}

/// Parse one `simulate` argument.
///
/// # Errors
///
/// Returns a message if the argument is neither a break marker nor a
/// non-negative number of seconds.
pub fn parse_gesture(arg: &str) -> Result<Gesture, String> {
    match arg {
        "/" => Ok(Gesture::LetterBreak),
        "//" => Ok(Gesture::WordBreak),
        _ => {
            let seconds: f64 = arg
                .parse()
                .map_err(|_| format!("expected seconds, `/` or `//`, got {arg:?}"))?;
            Duration::try_from_secs_f64(seconds)
                .map(Gesture::Blink)
                .map_err(|_| format!("invalid blink duration {arg:?}"))
        }
    }
}
