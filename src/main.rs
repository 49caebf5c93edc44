use clap::{Parser, Subcommand};

use snow_adapter::cmd::config::{self as config_cmd, ConfigArgs};
use snow_adapter::cmd::health;
use snow_adapter::cmd::records::{self, RecordsArgs};
use snow_adapter::config::AppConfig;
use snow_adapter::context::AppContext;
use snow_adapter::error::AppResult;
use snow_adapter::logging;

#[derive(Parser)]
#[command(
    name = "snow",
    author,
    version,
    about = "ServiceNow change-request adapter"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the instance is reachable and print the status event.
    Healthcheck,
    /// Read or create change requests.
    Records(RecordsArgs),
    /// Manage adapter configuration.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    if let Err(error) = logging::init() {
        eprintln!("Warning: {error}");
    }

    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => config_cmd::run(args.command),
        Commands::Healthcheck => health::run(&build_context()?).await,
        Commands::Records(args) => records::run(&build_context()?, args.command).await,
    }
}

fn build_context() -> AppResult<AppContext> {
    let config = AppConfig::load()?;
    AppContext::from_config(config)
}
