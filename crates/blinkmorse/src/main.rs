//! `blinkm` - CLI for blinkmorse
//!
//! This binary replays face traces through the blink detector, decodes blink
//! durations and Morse sequences, and manages configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;

use blinkmorse::cli::{Cli, Command, ConfigCommand, DecodeCommand, RunCommand, SimulateCommand};
use blinkmorse::decoder::decode_gestures;
use blinkmorse::{init_logging, morse, BlinkDetector, Config, FaceSource, Snapshot, TraceSource};

/// Capacity of the observation channel between source and detector.
const OBSERVATION_BUFFER: usize = 64;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Run(run_cmd) => {
            let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
            runtime.block_on(handle_run(&config, &run_cmd))
        }
        Command::Simulate(simulate_cmd) => handle_simulate(&config, &simulate_cmd),
        Command::Decode(decode_cmd) => handle_decode(&decode_cmd),
        Command::Table => {
            handle_table();
            Ok(())
        }
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn handle_run(config: &Config, cmd: &RunCommand) -> anyhow::Result<()> {
    if !cmd.json {
        eprintln!("Initializing camera...");
    }
    let mut source = TraceSource::open(&cmd.trace)?;
    let source_handle = source.stop_handle();

    let mut detector = BlinkDetector::new(config.detector_config());
    let detector_handle = detector.handle();
    let (tx, rx) = mpsc::channel(OBSERVATION_BUFFER);

    let source_task = tokio::spawn(async move { source.start(tx).await });

    let printer = if cmd.no_follow {
        None
    } else {
        let mut updates = detector_handle.subscribe();
        let json = cmd.json;
        Some(tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let snapshot = updates.borrow_and_update().clone();
                print_snapshot(&snapshot, json);
            }
        }))
    };

    let interrupt = detector_handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            source_handle.stop();
            interrupt.stop();
        }
    });

    let snapshot = detector.run(rx).await?;
    source_task.await.context("face source task panicked")??;

    // The detector owns the last watch sender; dropping it ends the printer.
    drop(detector);
    if let Some(printer) = printer {
        printer.await.context("printer task panicked")?;
    }

    if cmd.json {
        println!("{}", snapshot.to_json()?);
    } else {
        println!();
        println!("{snapshot}");
    }
    Ok(())
}

fn print_snapshot(snapshot: &Snapshot, json: bool) {
    if json {
        let line = serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "symbols": snapshot.symbols,
            "letter": snapshot.letter,
            "text": snapshot.text,
            "blinking": snapshot.blinking,
        });
        println!("{line}");
    } else {
        let marker = if snapshot.blinking { "*" } else { " " };
        println!(
            "{marker} [{:<6}] {}",
            snapshot.symbols,
            snapshot.transcription()
        );
    }
}

fn handle_simulate(config: &Config, cmd: &SimulateCommand) -> anyhow::Result<()> {
    let decoder = decode_gestures(
        config.decoder_config(),
        &cmd.gestures,
        Duration::from_millis(cmd.spacing_ms),
    );
    let snapshot = Snapshot::from(decoder.state());

    if cmd.json {
        println!("{}", snapshot.to_json()?);
    } else {
        println!("{}", snapshot.text);
    }
    Ok(())
}

fn handle_decode(cmd: &DecodeCommand) -> anyhow::Result<()> {
    for input in &cmd.sequences {
        let sequence: morse::SymbolSequence = input.parse()?;
        let letter = sequence.resolve().map(String::from).unwrap_or_default();
        println!("{:<8} {letter}", sequence.to_string());
    }
    Ok(())
}

fn handle_table() {
    for (code, letter) in morse::table() {
        println!("{letter}  {code}");
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Timing]");
                println!("  Sample interval:    {} ms", config.timing.sample_interval_ms);
                println!("  Dot below:          {} ms", config.timing.dot_max_ms);
                println!("  Dash above:         {} ms", config.timing.dash_min_ms);
                println!("  Blink timeout:      {} ms", config.timing.max_blink_ms);
                println!("  Letter gap:         {} ms", config.timing.letter_gap_ms);
                match config.word_gap() {
                    Some(gap) => println!("  Word gap:           {} ms", gap.as_millis()),
                    None => println!("  Word gap:           disabled"),
                }
                println!();
                println!("[Decoding]");
                println!("  Ambiguous blinks:   {:?}", config.decoding.ambiguous);
                println!("  Letter boundary:    {:?}", config.decoding.boundary);
                println!();
                println!("[Detection]");
                println!("  Min face height:    {}", config.detection.min_face_height);
                println!("  Blink signal:       {:?}", config.detection.blink_signal);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
