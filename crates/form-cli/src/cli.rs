use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::cmd::{
    self, forms::FormsArgs, mask::MaskArgs, run::RunArgs, schema::SchemaArgs,
    validate::ValidateArgs,
};
use crate::config::{Config, OutputFormat};

#[derive(Parser, Debug)]
#[command(
    name = "formflow",
    about = "Fill, validate and submit the checkout and loan application forms",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Path to a formflow.toml; defaults to the platform config directory
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Output format, overriding the configured one
    #[arg(long, value_enum, global = true)]
    format: Option<OutputFormat>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the built-in forms
    Forms(FormsArgs),
    /// Print a form definition or the JSON Schema of form definitions
    Schema(SchemaArgs),
    /// Validate an answers file against a form
    Validate(ValidateArgs),
    /// Walk a form with an answers file and submit it
    Run(RunArgs),
    /// Replay keystrokes through an input mask
    Mask(MaskArgs),
}

/// Settings shared by every command after config and flags are merged.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub format: OutputFormat,
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    init_logging(&config, cli.verbose);
    tracing::debug!(?config, "configuration loaded");

    let ctx = Context {
        format: cli.format.unwrap_or(config.output),
        config,
    };
    match cli.command {
        Commands::Forms(args) => cmd::forms::run(&args, &ctx),
        Commands::Schema(args) => cmd::schema::run(&args, &ctx),
        Commands::Validate(args) => cmd::validate::run(&args, &ctx),
        Commands::Run(args) => cmd::run::run(&args, &ctx),
        Commands::Mask(args) => cmd::mask::run(&args, &ctx),
    }
}

fn init_logging(config: &Config, verbose: u8) {
    let level = match verbose {
        0 => config.log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::WARN),
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
