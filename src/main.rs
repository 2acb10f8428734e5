mod cli;
mod ui;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use whitemuse_relay::modes::{Mode, background_removal_spec};
use whitemuse_relay::prediction::JobSpec;
use whitemuse_relay::{Relay, RelayConfig, api};

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "whitemuse_relay=debug,tower_http=debug"
    } else {
        "whitemuse_relay=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn serve(config: RelayConfig, bind: Option<String>) -> Result<ExitCode> {
    let relay = Relay::from_config(&config)?;
    let settings = relay.settings();
    tracing::info!(
        base_url = %config.provider.base_url,
        deadline_ms = settings.deadline.as_millis() as u64,
        poll_interval_ms = settings.poll_interval.as_millis() as u64,
        descriptions = relay.describer().is_some(),
        "provider client ready"
    );

    let app = api::create_router(Arc::new(relay));
    let addr = bind.unwrap_or(config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    tracing::info!("WhiteMuse API listening on {}", addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(ExitCode::SUCCESS)
}

/// Run one job from the command line. `image_url` routes it through the
/// background-removal flow, which may attach a brand description.
async fn run_once(
    config: RelayConfig,
    spec: JobSpec,
    label: &str,
    image_url: Option<&str>,
) -> Result<ExitCode> {
    let relay = Relay::from_config(&config)?;
    let progress = ui::JobProgress::start(label);
    let (status, envelope) = match image_url {
        Some(url) => relay.process_image(&spec, url).await,
        None => relay.submit_and_wait(&spec).await,
    };
    progress.complete(status, &envelope);

    Ok(if envelope.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = RelayConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { bind } => serve(config, bind).await,
        Command::Submit {
            mode,
            prompt,
            input,
        } => {
            let input = input
                .map(|raw| serde_json::from_str::<serde_json::Value>(&raw))
                .transpose()
                .context("--input must be valid JSON")?;
            let spec = Mode::from(mode).spec(&prompt, input.as_ref())?;
            run_once(config, spec, &prompt, None).await
        }
        Command::RemoveBackground { image_url, bg_type } => {
            let spec = background_removal_spec(&image_url, bg_type.as_deref())?;
            run_once(config, spec, "background removal", Some(&image_url)).await
        }
    }
}
