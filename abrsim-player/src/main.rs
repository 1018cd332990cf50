//! ABR Playback Simulator (abrsim-player) - Main entry point
//!
//! Runs one simulation engine headless: starts playback, prints every event
//! the engine publishes, and exits once the timeline is exhausted, the
//! runtime limit is hit or a shutdown signal arrives.

use std::path::PathBuf;
use std::time::Duration;

use abrsim_common::config::TomlConfig;
use abrsim_common::events::SimEvent;
use abrsim_common::time::scale_interval_ms;
use abrsim_player::{build_info, EngineConfig, SimulationEngine};
use anyhow::{ensure, Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for abrsim-player
#[derive(Parser, Debug)]
#[command(name = "abrsim-player")]
#[command(about = "Adaptive-bitrate playback simulator")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = "ABRSIM_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for the fill random source
    #[arg(long, env = "ABRSIM_SEED")]
    seed: Option<u64>,

    /// Preferred quality tier (e.g. 1080)
    #[arg(short, long)]
    preferred: Option<u32>,

    /// Number of segments on the timeline
    #[arg(long)]
    segments: Option<usize>,

    /// Run timers this many times faster than configured
    #[arg(long, default_value = "1.0")]
    speed: f64,

    /// Scrub to this timeline fraction once during the run
    #[arg(long)]
    scrub: Option<f64>,

    /// Delay before the scrub is applied
    #[arg(long, default_value = "3000")]
    scrub_after_ms: u64,

    /// Print events as JSON lines
    #[arg(long)]
    json: bool,

    /// Stop after this many milliseconds even if playback has not finished
    #[arg(long)]
    max_runtime_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration before logging so the file can set the level
    let toml_config =
        TomlConfig::resolve(args.config.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing
    let level = toml_config.logging.level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("abrsim_player={level},abrsim_common={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting abrsim-player (git {}, built {}, {})",
        build_info::GIT_HASH,
        build_info::BUILD_TIMESTAMP,
        build_info::BUILD_PROFILE
    );

    let config = build_engine_config(&args, toml_config)?;
    let engine = SimulationEngine::create(config).context("Failed to create simulation engine")?;
    let mut events = engine.subscribe();

    engine.play().await.context("Failed to start playback")?;

    let mut pending_scrub = args.scrub;
    let scrub_timer = tokio::time::sleep(Duration::from_millis(args.scrub_after_ms));
    tokio::pin!(scrub_timer);

    let runtime_limit = tokio::time::sleep(Duration::from_millis(args.max_runtime_ms.unwrap_or(0)));
    tokio::pin!(runtime_limit);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    print_event(&event, args.json)?;
                    if matches!(event, SimEvent::PlaybackFinished { .. }) {
                        info!("Playback finished");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event printer lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut scrub_timer, if pending_scrub.is_some() => {
                if let Some(fraction) = pending_scrub.take() {
                    engine.scrub(fraction).await.context("Scrub failed")?;
                }
            }
            _ = &mut runtime_limit, if args.max_runtime_ms.is_some() => {
                info!("Runtime limit reached, stopping");
                break;
            }
            _ = &mut shutdown => break,
        }
    }

    engine.dispose().await;

    let snapshot = engine.snapshot().await;
    println!(
        "{}",
        serde_json::to_string_pretty(&snapshot).context("Failed to serialize final snapshot")?
    );

    info!("Shutdown complete");
    Ok(())
}

/// Apply command-line overrides on top of the file configuration and validate
fn build_engine_config(args: &Args, toml_config: TomlConfig) -> Result<EngineConfig> {
    let mut settings = toml_config.engine;

    if let Some(seed) = args.seed {
        settings.seed = Some(seed);
    }
    if let Some(tier) = args.preferred {
        settings.preferred_tier = Some(tier);
    }
    if let Some(segments) = args.segments {
        settings.segment_count = segments;
    }

    ensure!(
        args.speed.is_finite() && args.speed > 0.0,
        "--speed must be a positive number, got {}",
        args.speed
    );
    settings.fill_interval_ms = scale_interval_ms(settings.fill_interval_ms, args.speed);
    settings.playback_interval_ms = scale_interval_ms(settings.playback_interval_ms, args.speed);

    EngineConfig::from_settings(&settings).context("Invalid engine configuration")
}

fn print_event(event: &SimEvent, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event).context("Failed to serialize event")?);
        return Ok(());
    }

    let line = match event {
        SimEvent::EngineStarted {
            tiers,
            segment_count,
            seed,
            ..
        } => {
            let tiers: Vec<String> = tiers.iter().map(|t| t.to_string()).collect();
            format!(
                "started: {} segments, tiers [{}], seed {}",
                segment_count,
                tiers.join(", "),
                seed
            )
        }
        SimEvent::BufferProgress { preferred, .. } => format!(
            "buffer: {} {}/{} ({:.0}%)",
            preferred.tier, preferred.filled, preferred.total, preferred.percent
        ),
        SimEvent::DisplayUpdated { display, .. } => format!(
            "segment {}/{}: {}",
            display.segment + 1,
            display.segment_count,
            display.message
        ),
        SimEvent::PlaybackStateChanged {
            old_state,
            new_state,
            ..
        } => format!("playback: {} -> {}", old_state, new_state),
        SimEvent::Scrubbed {
            fraction,
            from_segment,
            to_segment,
            ..
        } => format!(
            "scrub to {:.2}: segment {} -> {}",
            fraction, from_segment, to_segment
        ),
        SimEvent::PreferredChanged {
            old_tier, new_tier, ..
        } => format!("preferred: {} -> {}", old_tier, new_tier),
        SimEvent::PlaybackFinished { segment, .. } => {
            format!("finished at segment {}", segment + 1)
        }
        SimEvent::EngineDisposed { .. } => "disposed".to_string(),
    };

    println!("{}", line);
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
