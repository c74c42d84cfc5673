use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod args;
mod commands;
mod navigator;

use app::AppContext;
use args::Cli;
use shared::config::ClientConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = &cli.api_url {
        config = config.with_api_base_url(url);
    }

    let ctx = AppContext::build(&config)?;
    let result = commands::run(&ctx, cli.command).await;

    if let Some(route) = ctx.navigator.last_route() {
        tracing::debug!("Session ended on {}", route.path());
    }
    result
}
