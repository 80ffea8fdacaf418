//! CLI entry point - the composition root.
//!
//! Settings are assembled from flags, environment and `.env`, then handed
//! to `bootstrap` for the commands that need a controller.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use llamadeck_cli::{Cli, Commands, bootstrap, controller_settings, handlers};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads its env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::SyncStatus {
            offline,
            phase,
            pending,
            json,
        } => handlers::sync_status::execute(!offline, (*phase).into(), *pending, *json),
        Commands::Paths => handlers::paths::execute(&cli),
        Commands::Models => {
            let ctx = bootstrap(controller_settings(&cli)?)?;
            handlers::models::execute(&ctx).await
        }
        Commands::Serve { model, .. } => {
            let ctx = bootstrap(controller_settings(&cli)?)?;
            handlers::serve::execute(&ctx, model).await
        }
        Commands::Status { json } => {
            let ctx = bootstrap(controller_settings(&cli)?)?;
            handlers::status::execute(&ctx, *json).await
        }
        Commands::Stop => {
            let ctx = bootstrap(controller_settings(&cli)?)?;
            handlers::stop::execute(&ctx).await
        }
    }
}
