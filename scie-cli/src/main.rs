//! `scie` — command-line entry point. A thin dispatcher over the SCIE
//! crates (spec.md §6 CLI surface); holds no validation, generation, or
//! control-loop logic of its own. Modeled on `knhk-test-cache`'s
//! clap-derive `Cli`/`Commands` split and `knhk-validation`'s
//! report-then-exit-code shape.

use scie_cli::commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "scie", about = "Sovereign Compliance Integrity Engine")]
struct Cli {
    /// Repository root to operate against.
    #[arg(long, global = true, default_value = ".")]
    repo: PathBuf,

    /// Directory holding the append-only evidence chain.
    #[arg(long, global = true, default_value = ".scie/evidence")]
    evidence_dir: PathBuf,

    /// Path to a TOML configuration file (spec.md §6 "Configuration surface").
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run rule validation against the repository.
    Validate {
        /// Only validate rules affected by recent changes.
        #[arg(long)]
        incremental: bool,
        /// Comma-separated rule IDs to validate, instead of the whole set.
        #[arg(long, value_delimiter = ',')]
        rules: Option<Vec<String>>,
    },
    /// Print the compliance scorecard from the most recent validation.
    Scorecard,
    /// Compute and print the current integrity vector.
    Health,
    /// Run the adversarial attack simulator against a scratch copy of the evidence chain.
    Adversary {
        /// Keep the scratch directories instead of deleting them.
        #[arg(long)]
        no_cleanup: bool,
    },
    /// Run one adaptive-controller cycle and print the adjusted thresholds.
    Tune,
    /// Compare two persisted integrity vectors.
    Compare {
        /// Path to the baseline IntegrityVector JSON file.
        #[arg(long)]
        baseline: PathBuf,
        /// Path to the new IntegrityVector JSON file.
        #[arg(long)]
        new: PathBuf,
    },
    /// Verify the evidence chain's hash links from end to end.
    VerifyChain,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match scie_core::Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error loading config: {err}");
            return ExitCode::from(2);
        }
    };

    let result = match cli.command {
        Commands::Validate { incremental, rules } => {
            commands::validate(&cli.repo, &cli.evidence_dir, config, incremental, rules)
        }
        Commands::Scorecard => commands::scorecard(&cli.repo, &cli.evidence_dir, config),
        Commands::Health => commands::health(&cli.repo, &cli.evidence_dir, config),
        Commands::Adversary { no_cleanup } => commands::adversary(&cli.evidence_dir, !no_cleanup),
        Commands::Tune => commands::tune(&cli.repo, &cli.evidence_dir, config),
        Commands::Compare { baseline, new } => commands::compare(&baseline, &new, config),
        Commands::VerifyChain => commands::verify_chain(&cli.evidence_dir),
    };

    match result {
        Ok(code) => ExitCode::from(code as u8),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
