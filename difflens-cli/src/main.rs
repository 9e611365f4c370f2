//! difflens CLI - Change classification for repository comparisons
//!
//! Tells reviewers which changed lines of a merge actually matter, ignoring
//! configured noise and pure XML attribute reordering.

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::analyze::AnalyzeArgs;
use commands::classify::ClassifyArgs;
use commands::*;
use config::DifflensConfig;
use output::OutputFormat;

/// Classify the changes of a repository comparison.
///
/// difflens reads compare payloads from a repository host and reports, per
/// file, how many changed lines are real changes and how many are noise.
#[derive(Parser)]
#[command(name = "difflens")]
#[command(author, version)]
#[command(about = "Classify which changed lines of a merge actually matter")]
#[command(propagate_version = true)]
#[command(after_help = "Examples:
  difflens analyze --code compare.json --xml-attribute-order
  difflens classify flow.diff --path src/main/mule/flow.xml --xml-attribute-order
  difflens canonicalize '<a y=\"2\" x=\"1\"/>'")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format (overrides config default)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a code (and optional config) repository comparison
    #[command(visible_alias = "a")]
    Analyze(AnalyzeArgs),

    /// Show the verdict for every changed line of one diff body
    #[command(visible_alias = "c")]
    Classify(ClassifyArgs),

    /// Print the canonical form used to match a line
    Canonicalize {
        /// The line to canonicalize
        #[arg(allow_hyphen_values = true)]
        line: String,

        /// Only trim; skip XML parsing
        #[arg(long)]
        no_xml: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: completions::Shell,

        /// Show installation instructions instead of generating script
        #[arg(long)]
        instructions: bool,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Load configuration from .difflensrc.toml
    let config = DifflensConfig::load(std::path::Path::new("."));

    // Resolve output format: CLI flag > config default > Table
    let format = cli.format.unwrap_or_else(|| {
        config
            .default_format()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Table)
    });

    if let Some(use_color) = config.use_color() {
        colored::control::set_override(use_color);
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            let _ = Cli::command().print_help();
            println!();
            return Ok(());
        }
    };

    match command {
        Commands::Analyze(args) => analyze::run(&args, &config, format),
        Commands::Classify(args) => classify::run(&args, &config, format),
        Commands::Canonicalize { line, no_xml } => canonicalize::run(&line, no_xml, format),
        Commands::Completions {
            shell,
            instructions,
        } => completions::run(shell, instructions, &mut Cli::command(), format),
    }
}
