use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bevy::tasks::{ComputeTaskPool, TaskPoolBuilder};
use clap::Parser;
use micromegas_telemetry_sink::TelemetryGuardBuilder;
use micromegas_telemetry_sink::tracing_interop::TracingCaptureLayer;
use micromegas_tracing::dispatch::{flush_thread_buffer, init_thread_stream, unregister_thread_stream};
use micromegas_tracing::levels::LevelFilter;
use micromegas_tracing::prelude::info;
use pacpilot::config::AgentConfig;
use pacpilot::plugins::layout::Layout;
use pacpilot::session::play_session;
use pacpilot::tracing_bridge::MicromegasBridgeLayer;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Parser, Debug)]
#[command(name = "pacpilot", about = "Play Pac-Man layouts with the decision agent")]
struct Cli {
    /// Layout file to play.
    layout: PathBuf,

    /// JSON file overriding agent weights.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 1)]
    games: usize,

    #[arg(long, default_value_t = 1000)]
    max_turns: u32,

    /// Seed of the first game; later games use the following seeds.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Write the session summary here as well as to stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Spans need MICROMEGAS_ENABLE_CPU_TRACING=true; logs and metrics always flow.
    let _telemetry_guard = TelemetryGuardBuilder::default()
        .with_install_tracing_capture(false)
        .build()
        .context("failed to initialize telemetry")?;

    // Bridge turn and schedule spans from `tracing` into micromegas before
    // the first app is built.
    let subscriber = Registry::default()
        .with(MicromegasBridgeLayer::default())
        .with(TracingCaptureLayer {
            max_level: LevelFilter::Info,
        });
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    init_thread_stream();
    ComputeTaskPool::get_or_init(|| {
        TaskPoolBuilder::new()
            .on_thread_spawn(|| {
                init_thread_stream();
            })
            .on_thread_destroy(|| {
                flush_thread_buffer();
                unregister_thread_stream();
            })
            .build()
    });

    let layout = Layout::load(&cli.layout)
        .with_context(|| format!("failed to load layout {}", cli.layout.display()))?;
    let config = match &cli.config {
        Some(path) => AgentConfig::from_json_file(path)?,
        None => AgentConfig::default(),
    };

    let name = cli
        .layout
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| cli.layout.display().to_string());

    info!(
        "playing {} game(s) on {} from seed {}",
        cli.games, name, cli.seed
    );
    let summary = play_session(&name, &layout, &config, cli.seed, cli.games, cli.max_turns);

    let json = serde_json::to_string_pretty(&summary).context("failed to serialize summary")?;
    println!("{json}");
    if let Some(out) = &cli.out {
        fs::write(out, &json).with_context(|| format!("failed writing {}", out.display()))?;
    }

    flush_thread_buffer();
    Ok(())
}
