//! ECG Monitor - headless consumer of the replayed ECG feed
//!
//! Usage: `ecg-monitor [config.json] [seconds]`

mod plot_data;

use anyhow::Context;
use ecg_core::TraceLabel;
use ecg_simulation::{spawn_replay_feed, FeedCommand, FeedConfig};
use plot_data::{PlotData, WindowSummary};
use tokio::time::{interval, sleep, Duration};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_RUN_SECONDS: u64 = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => FeedConfig::from_json_file(&path)
            .with_context(|| format!("Failed to load feed configuration from {}", path))?,
        None => FeedConfig::default(),
    };
    let run_seconds = match args.next() {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("Invalid run duration: {}", raw))?,
        None => DEFAULT_RUN_SECONDS,
    };

    info!("Signal flow: bundled ECG traces -> replay feed -> plot buffers");

    let handle = spawn_replay_feed(config)
        .await
        .context("Failed to start ECG replay feed")?;
    handle.start().await?;
    let control = handle.control();
    let mut records = handle.records;

    let mut plot = PlotData::default();
    let mut summary = WindowSummary::default();
    let mut report = interval(Duration::from_secs(1));
    report.tick().await;
    let deadline = sleep(Duration::from_secs(run_seconds));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            record = records.recv() => match record {
                Some(record) => {
                    summary.record(&record);
                    plot.push(record);
                }
                None => {
                    warn!("ECG feed completed unexpectedly");
                    break;
                }
            },
            _ = report.tick() => log_window(&summary.take(), &plot),
            _ = &mut deadline => {
                control.send(FeedCommand::Stop).await?;
                break;
            }
        }
    }

    // Drain whatever was buffered before completion
    while let Some(record) = records.recv().await {
        summary.record(&record);
        plot.push(record);
    }
    log_window(&summary.take(), &plot);

    info!("ECG monitor finished with {} points buffered", plot.len());
    Ok(())
}

fn log_window(window: &WindowSummary, plot: &PlotData) {
    match (window.trace, window.heart_rate_range()) {
        (Some(trace), Some((min, max))) => info!(
            records = window.records,
            trace_a_points = plot.series(TraceLabel::A).len(),
            trace_b_points = plot.series(TraceLabel::B).len(),
            "{} at t={:.3}s, heart rate range [{:.3}, {:.3}]",
            trace,
            window.last_time,
            min,
            max
        ),
        _ => info!("No records received in this window"),
    }
}
