// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `build`     — CSV text column → deduplicated corpus CSV
//   2. `normalize` — canonical form of a string or stdin lines
//   3. `rules`     — export the effective substitution table

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};

use commands::{BuildArgs, Commands, NormalizeArgs, RulesArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "tweet-corpus",
    version,
    about = "Canonicalize noisy social-media text into a deduplicated sentence corpus."
)]
pub struct Cli {
    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Build(args)     => run_build(args),
            Commands::Normalize(args) => run_normalize(args),
            Commands::Rules(args)     => run_rules(args),
        }
    }
}

/// Handles the `build` subcommand.
fn run_build(args: BuildArgs) -> Result<()> {
    use crate::application::build_use_case::BuildUseCase;

    tracing::info!("Building corpus from: {}", args.input);

    let use_case = BuildUseCase::new(args.into());
    let stats    = use_case.execute()?;

    println!(
        "Corpus complete: {} sentences ({} rows, {} empty, {} duplicates, {} malformed).",
        stats.emitted, stats.rows_read, stats.empty, stats.duplicates, stats.malformed
    );
    Ok(())
}

/// Handles the `normalize` subcommand.
fn run_normalize(args: NormalizeArgs) -> Result<()> {
    use crate::application::normalize_use_case::NormalizeUseCase;

    let use_case = NormalizeUseCase::new(args.rules.as_deref())?;
    let stdin = io::stdin();
    match args.text {
        Some(text) => println!("{}", use_case.normalize(&text)),
        None if args.unique => {
            let stats = use_case.unique_lines(stdin.lock(), io::stdout().lock(), args.encoding.into())?;
            tracing::info!(
                "{} unique sentences from {} lines",
                stats.emitted, stats.rows_read
            );
        }
        None => {
            use_case.normalize_lines(stdin.lock(), io::stdout().lock(), args.encoding.into())?;
        }
    }
    Ok(())
}

/// Handles the `rules` subcommand.
fn run_rules(args: RulesArgs) -> Result<()> {
    use crate::application::rules_use_case::RulesUseCase;

    let use_case = RulesUseCase::new(args.rules.as_deref())?;
    match args.output {
        Some(path) => {
            use_case.save(&path)?;
            println!("Saved {} rules to {}.", use_case.rule_count(), path);
        }
        None => {
            let mut out = io::stdout().lock();
            writeln!(out, "{}", use_case.to_json()?)?;
        }
    }
    Ok(())
}
