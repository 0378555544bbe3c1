mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use output::OutputFormat;

/// stagepack - turn staged build output into distributable artifacts
#[derive(Parser)]
#[command(name = "stagepack")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Repository root (default: current directory)
  #[arg(long, global = true)]
  repo_root: Option<PathBuf>,

  /// Config file (default: <repo-root>/stagepack.toml when present)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Build configuration, overriding config file and environment
  #[arg(long, global = true)]
  configuration: Option<String>,

  /// Output format
  #[arg(short, long, value_enum, global = true, default_value_t)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run every packaging target
  Package,

  /// Validate and show the target order
  Plan,

  /// Show the environment table passed to external tools
  Env,

  /// Show the detected platform and directory layout
  Info,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let opts = cmd::GlobalOpts {
    repo_root: cli.repo_root,
    config: cli.config,
    configuration: cli.configuration,
    output: cli.output,
  };

  match cli.command {
    Commands::Package => cmd::cmd_package(&opts),
    Commands::Plan => cmd::cmd_plan(&opts),
    Commands::Env => cmd::cmd_env(&opts),
    Commands::Info => cmd::cmd_info(&opts),
  }
}
