//! polyglot - translate source files between languages.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use commands::transpile::TranspileArgs;
use config::PolyglotConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(
    name = "polyglot",
    version,
    about = "Translate source code between Python, JavaScript, TypeScript, Java and Haskell",
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    transpile: TranspileArgs,

    /// Log pipeline details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List supported source and target languages
    Languages,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command {
        Some(Command::Languages) => commands::languages::run(),
        None => {
            let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            let config = PolyglotConfig::load(&root);
            commands::transpile::run(&cli.transpile, &config)
        }
    };
    std::process::exit(code);
}
