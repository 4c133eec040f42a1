//! Mouthguard tracker: replays recorded landmark traces through the tracking pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use mouthguard_tracker::{
    app::OverlayApp,
    asset::{AssetLoader, FileAssetLoader},
    cli::Args,
    config::{Config, EXAMPLE_CONFIG},
    overlay::LogRenderer,
    replay::{ReplayProvider, ReplaySource, ReplayTrace},
};
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if let Some(path) = &args.write_config {
        std::fs::write(path, EXAMPLE_CONFIG)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Example configuration written to {}", path.display());
        return Ok(());
    }

    info!("Mouthguard Tracker");

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path)?
        }
        None => Config::default(),
    };
    args.apply_to(&mut config);

    let trace_path = args.trace.as_ref().context("--trace is required")?;
    let trace = Arc::new(ReplayTrace::from_file(trace_path)?);
    info!(
        "Replaying {} frames at {}x{}",
        trace.len(),
        trace.frame().width,
        trace.frame().height
    );

    let source = ReplaySource::new(&trace);
    let provider = ReplayProvider::new(Arc::clone(&trace));
    let mut app = OverlayApp::new(config.clone(), provider, source, LogRenderer::new())?;

    match &config.asset.path {
        Some(path) => {
            let asset = FileAssetLoader.load(path)?;
            app.select_asset(Arc::new(asset));
        }
        None if config.tracking.require_asset => {
            warn!("No overlay asset selected; the overlay will stay hidden");
        }
        None => {}
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    let stats = app.run(shutdown_rx).await?;
    info!(
        "Finished ({:?}): {} ticks, {} detections, {} faces, {} misses, {} poses ({} visible)",
        stats.reason,
        stats.ticks,
        stats.tracker.detections_issued,
        stats.tracker.faces_found,
        stats.tracker.misses,
        stats.poses_published,
        app.renderer().visible_updates()
    );

    Ok(())
}
