mod args;
mod cmd_changes;
mod cmd_report;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use args::{EngineArgs, InputArgs};
use logging::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "api-diff")]
#[command(about = "Summarize API surface changes between two OpenAPI documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write markdown release notes describing the changes
    Report {
        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        engine: EngineArgs,

        /// Output file (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Component-affected paths shown before the rest are folded away
        #[arg(long, default_value_t = 5)]
        inline_limit: usize,
    },
    /// Print the change-set as JSON
    Changes {
        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        engine: EngineArgs,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_format, cli.verbose);

    match cli.command {
        Commands::Report {
            inputs,
            engine,
            output,
            inline_limit,
        } => cmd_report::run(inputs, engine, output, inline_limit),
        Commands::Changes {
            inputs,
            engine,
            pretty,
        } => cmd_changes::run(inputs, engine, pretty),
    }
}
