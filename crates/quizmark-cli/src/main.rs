//! quizmark CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "quizmark", version, about = "Multiple-choice quiz engine and scorer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Output format of `play`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a suite file and report counts and warnings
    Validate {
        /// Path to a suite JSON file
        #[arg(long)]
        suite: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Replay selections against a suite and score them
    Play {
        /// Path to a suite JSON file
        #[arg(long)]
        suite: PathBuf,

        /// Selections as TEST:NUM:NAME (e.g. "0:1:B"), applied in order
        #[arg(long = "select", value_name = "TEST:NUM:NAME")]
        selections: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Write the session report JSON to this path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the report into the configured output directory
        #[arg(long)]
        save: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Normalise a suite by parsing and re-serializing it
    Export {
        /// Path to a suite JSON file
        #[arg(long)]
        suite: PathBuf,

        /// Destination file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example suite
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "quizmark=info"
                    .parse()
                    .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::INFO.into()),
            ),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { suite, config } => commands::validate::execute(suite, config),
        Commands::Play {
            suite,
            selections,
            format,
            output,
            save,
            config,
        } => commands::play::execute(suite, selections, format, output, save, config),
        Commands::Export {
            suite,
            output,
            config,
        } => commands::export::execute(suite, output, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
