use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use voxnote::{create_router, AppState, Config};

/// Upload-normalizing proxy for the voice-to-text backend
#[derive(Debug, Parser)]
#[command(name = "voxnote", version)]
struct Args {
    /// Configuration file (defaults and environment apply without one)
    #[arg(long)]
    config: Option<String>,

    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = Config::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        cfg.service.port = port;
    }

    info!("voxnote proxy v0.1.0");
    info!("Forwarding uploads to {}", cfg.backend.base_url);
    info!("Recording clients target {}", cfg.client.api_base_url);
    info!(
        "Assuming {} when capture format detection fails",
        cfg.media.default_format.mime()
    );

    let state = AppState::new(cfg.backend.base_url.clone(), cfg.media.default_format);
    let router = create_router(state);

    let addr = format!("{}:{}", cfg.service.bind, cfg.service.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
