//! Headless replay of recorded viewer traces.
//!
//! Prints every event the viewer controller emits, one per line, prefixed
//! with the trace time in milliseconds. Useful when tuning the swipe and
//! settle thresholds against captures from real devices.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use reelview::replay::{self, ReplayOptions};
use reelview::ViewerConfig;

#[derive(Parser)]
#[command(name = "reelview")]
#[command(about = "Replay a touch/scroll trace through the media viewer gesture engine")]
struct Cli {
    /// Trace file to replay
    trace: PathBuf,

    /// Number of synthetic media items
    #[arg(long, default_value_t = 10)]
    items: usize,

    /// Index the viewer opens at
    #[arg(long, default_value_t = 0)]
    initial: usize,

    /// Vertical travel (px) that locks a touch to scrolling
    #[arg(long)]
    vertical_noise_px: Option<f64>,

    /// Minimum horizontal travel (px) for a swipe
    #[arg(long)]
    min_swipe_px: Option<f64>,

    /// Horizontal:vertical ratio a swipe must exceed
    #[arg(long)]
    direction_ratio: Option<f64>,

    /// Settle delay after a horizontal gesture, in milliseconds
    #[arg(long)]
    settle_ms: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("reelview=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ViewerConfig::from_env()?;
    if let Some(v) = cli.vertical_noise_px {
        config.gesture.vertical_noise_px = v;
    }
    if let Some(v) = cli.min_swipe_px {
        config.gesture.min_swipe_px = v;
    }
    if let Some(v) = cli.direction_ratio {
        config.gesture.direction_ratio = v;
    }
    if let Some(ms) = cli.settle_ms {
        config.settle_delay = Duration::from_millis(ms);
    }
    config.validate()?;

    let trace = replay::load_trace(&cli.trace)?;
    tracing::info!(
        "Replaying {} commands from {}",
        trace.len(),
        cli.trace.display()
    );

    let options = ReplayOptions {
        item_count: cli.items,
        initial_index: cli.initial,
        config,
    };
    for (at, event) in replay::replay(&trace, &options) {
        println!("{:>6} {}", at.as_millis(), event);
    }

    Ok(())
}
