mod args;
mod display;
mod poll;
mod prompt;
mod settings;

use clap::Parser;
use filingwatch_core::ResolutionEngine;
use tracing_subscriber::EnvFilter;

use crate::args::Args;
use crate::prompt::StdinPrompter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs on stderr; stdout carries only resolution records.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::info!("filingwatch v{}", env!("CARGO_PKG_VERSION"));

    let settings = settings::resolve(&args, &mut StdinPrompter)?;
    let provider = settings::build_provider(&args, &settings).await?;
    display::print_banner(&settings);

    let mut engine = ResolutionEngine::new(provider, settings.market_config());
    let mut stdout = std::io::stdout();
    poll::run(&mut engine, &settings.poll_options(), &mut stdout, poll::shutdown_signal()).await
}
