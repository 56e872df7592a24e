use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vista_admin::console::{self, AssumeYes, Cli, ConsoleNotifier, StdinConfirmer};
use vista_admin::{AdminState, MemoryPage};
use vista_core::Confirmer;
use vista_store::{Config, HttpTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vista_admin=info,vista_core=info,vista_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Using API at {}", config.api.base_url);

    let timeout = Duration::from_secs(config.api.timeout_seconds);
    let transport = HttpTransport::new(&config.api.base_url, timeout)
        .context("Failed to build HTTP client")?;

    let confirmer: Arc<dyn Confirmer> = if cli.yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(StdinConfirmer)
    };

    let state = AdminState {
        transport: Arc::new(transport),
        vendor_base_url: config.api.vendor_base_url.clone(),
        notifier: Arc::new(ConsoleNotifier),
        confirmer,
    };
    let page = MemoryPage::new(&state);

    let html = console::run(cli.command, &page).await?;
    println!("{}", html);
    Ok(())
}
