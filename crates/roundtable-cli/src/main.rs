use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "roundtable")]
#[command(about = "Roundtable CLI - simulated interviews and focus groups", long_about = None)]
struct Cli {
    /// Path to a persona configuration file (TOML). Falls back to
    /// <config dir>/roundtable/personas.toml, then to the built-in panel.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulated session and print the transcript and metrics
    Run(commands::run::RunArgs),
    /// Inspect available personas
    Personas {
        #[command(subcommand)]
        action: PersonasAction,
    },
}

#[derive(Subcommand)]
enum PersonasAction {
    /// List persona ids, names, and roles
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => commands::run::execute(cli.config, args).await?,
        Commands::Personas { action } => match action {
            PersonasAction::List => commands::personas::list(cli.config)?,
        },
    }

    Ok(())
}
