/// Basic usage example: feed accelerometer samples, get steps and snapshots
use pedometer_core::chart::{layout, PlotRect};
use pedometer_core::{PedometerCore, SensorSample, StepDetector};

fn main() {
    println!("=== Pedometer Core: Basic Example ===\n");

    // Simulated stream: standing, three steps, standing again (50Hz).
    let motion_samples = vec![
        // Standing (first reading crosses: the EMA starts at zero)
        (1000, [0.1, 0.2, 9.81]),
        (1020, [0.1, 0.2, 9.80]),
        (1040, [0.1, 0.2, 9.81]),
        // Step 1
        (1500, [0.3, 0.4, 14.1]),
        (1520, [0.3, 0.4, 11.0]),
        (1540, [0.3, 0.4, 8.9]),
        // Step 2
        (2000, [0.3, 0.4, 14.3]),
        (2020, [0.3, 0.4, 11.2]),
        (2040, [0.3, 0.4, 8.8]),
        // Too soon after step 2: debounced
        (2100, [0.3, 0.4, 14.0]),
        // Step 3
        (2500, [0.3, 0.4, 14.2]),
        (2520, [0.3, 0.4, 9.9]),
        // Standing
        (2540, [0.1, 0.2, 9.81]),
        (2560, [0.1, 0.2, 9.81]),
    ];

    println!("Processing {} samples...\n", motion_samples.len());

    // Bare detector: step events only.
    let mut detector = StepDetector::new(1.2);
    for &(timestamp, [ax, ay, az]) in &motion_samples {
        let sample = SensorSample::new(ax, ay, az, timestamp);
        if let Some(step) = detector.process_sample(&sample) {
            println!(
                "Step #{} at {}ms (|a|={:.2}, diff={:.2})",
                step.step_index, step.timestamp_ms, step.magnitude, step.diff
            );
        }
    }

    // Session core: detector plus history, clock and throttled snapshots.
    let mut core = PedometerCore::new(1.2);
    core.begin();
    let mut snapshots = 0;
    for &(timestamp, [ax, ay, az]) in &motion_samples {
        let sample = SensorSample::new(ax, ay, az, timestamp);
        if let Some(outcome) = core.on_sample(&sample) {
            snapshots += outcome.snapshot.is_some() as usize;
        }
    }

    let snapshot = core.snapshot();
    let chart = layout(&snapshot.history, PlotRect::new(0.0, 0.0, 200.0, 80.0));

    println!("\n=== Summary ===");
    println!("Detector steps: {}", detector.total_steps());
    println!("Session steps: {}", snapshot.steps);
    println!("Snapshots published: {snapshots}");
    println!("Chart points: {}", chart.points.len());
    println!("Elapsed: {}s", snapshot.elapsed_sec);
}
