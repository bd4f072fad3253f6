//! Pedometer demo
//!
//! Replays a synthetic walk through the pedometer and prints the UI
//! snapshots it publishes. For library use, see lib.rs.
//!
//! Usage: `pedometer-demo [config.json]`

use std::cell::Cell;
use std::rc::Rc;

use pedometer_core::chart::{layout, PlotRect};
use pedometer_core::{Pedometer, PedometerConfig, ReplaySource, SensorSample, Snapshot};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run().await {
        error!(error = %err, "Demo failed");
        std::process::exit(1);
    }
}

async fn run() -> pedometer_core::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path).map_err(|e| {
                pedometer_core::PedometerError::InvalidConfig {
                    field: "path",
                    reason: format!("{path}: {e}"),
                }
            })?;
            PedometerConfig::from_json_str(&json)?
        }
        None => PedometerConfig::default(),
    };

    let pedometer = Pedometer::new(ReplaySource::granted(), config)?;

    // Print at most one line per elapsed second.
    let last_printed = Rc::new(Cell::new(u64::MAX));
    let printed = Rc::clone(&last_printed);
    pedometer.subscribe(move |s: &Snapshot| {
        if s.running && printed.get() != s.elapsed_sec {
            printed.set(s.elapsed_sec);
            println!(
                "t={:>3}s steps={:>3} |a|={:>6.2} threshold={:.1}",
                s.elapsed_sec, s.steps, s.m, s.threshold
            );
        }
    });

    pedometer.start().await?;
    pedometer.source().emit_all(synthetic_walk(1_000, 30_000, 550));

    let snapshot = pedometer.snapshot();
    pedometer.stop();

    let geometry = layout(&snapshot.history, PlotRect::new(0.0, 0.0, 320.0, 120.0));
    info!(
        steps = snapshot.steps,
        elapsed_sec = snapshot.elapsed_sec,
        chart_points = geometry.points.len(),
        "Walk replay finished"
    );
    println!("{}", snapshot.to_json()?);
    Ok(())
}

/// 50Hz samples with a heel strike every `step_interval_ms`, preceded by a
/// couple of seconds standing still.
fn synthetic_walk(start_ms: u64, duration_ms: u64, step_interval_ms: u64) -> Vec<SensorSample> {
    let per_step = (step_interval_ms / 20).max(1);
    (0..duration_ms / 20)
        .map(|i| {
            let t = start_ms + i * 20;
            let walking = i >= 100;
            let bump = match (walking, i % per_step) {
                (true, 0) => 4.2,
                (true, 1) => 1.2,
                (true, 2) => -0.8,
                _ => 0.0,
            };
            let sway = if walking { 0.4 * ((i as f32) * 0.3).sin() } else { 0.0 };
            SensorSample::new(0.2 + sway, 0.3, 9.81 + bump, t)
        })
        .collect()
}
