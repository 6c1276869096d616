mod basket;
mod fetch;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::basket::BasketCommands;
use crate::fetch::FetchArgs;

#[derive(Debug, Parser)]
#[command(name = "price-tracker")]
#[command(about = "Fetch EMMSA daily wholesale prices and keep them in Pantry baskets")]
struct Cli {
    /// Enable debug logging (overrides `RUST_LOG`)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch the daily price table and emit it as JSON
    Fetch(FetchArgs),
    /// Manage Pantry baskets
    Basket {
        #[command(subcommand)]
        command: BasketCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    tokio::select! {
        result = run(cli.command) => result,
        _ = tokio::signal::ctrl_c() => Err(anyhow::anyhow!("interrupted; in-flight request aborted")),
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Fetch(args) => fetch::run_fetch(&args).await,
        Commands::Basket { command } => basket::run_basket(command).await,
    }
}

/// Logs go to stderr so JSON written to stdout stays machine-readable.
fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let env_filter = if debug {
        EnvFilter::try_new("debug")?
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
