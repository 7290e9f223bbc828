//! Radar CLI - Command line interface for tracker simulation and log replay.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use nalgebra::Vector2;
use radar_core::TrackerConfig;
use radar_sim::{
    generate_measurements, run_tracker, simulate_target, ErrorStats, MeasurementData, RadarLog,
    SensorConfig, TargetParams, TrackResult, TruthResult,
};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Samples ignored by the error statistics while the track settles.
const SETTLE_SAMPLES: usize = 50;

/// Relative scan-gap deviation accepted as a uniform log.
const SCAN_TOLERANCE: f64 = 0.01;

/// Public function that can be called from the main binary
pub fn run_cli_main(args: &[&str]) -> Result<()> {
    let args = Args::parse_from(args);
    run(args)
}

#[derive(Parser, Debug)]
#[command(name = "radar-cli")]
#[command(about = "Constant-velocity radar tracker: simulation, log replay and tuning sweeps")]
#[command(version)]
pub struct Args {
    /// Output directory
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Output file format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Run a single simulated track
    #[arg(long)]
    single: bool,

    /// Replay a recorded radar log (CSV with T<n>_R / T<n>_THETA columns)
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Tracker configuration (JSON); individual flags below take precedence
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    // ── Tracker parameters ───────────────────────────────────
    /// Scan interval (s); log replay takes it from the TIME column when omitted
    #[arg(long)]
    dt: Option<f64>,

    #[arg(long)]
    process_noise: Option<f64>,

    #[arg(long)]
    measurement_variance: Option<f64>,

    #[arg(long)]
    initial_variance: Option<f64>,

    // ── Target parameters ────────────────────────────────────
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    start_cross: f64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    start_down: f64,

    #[arg(long, default_value_t = 10.0, allow_hyphen_values = true)]
    vel_cross: f64,

    #[arg(long, default_value_t = 5.0, allow_hyphen_values = true)]
    vel_down: f64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    accel_cross: f64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    accel_down: f64,

    #[arg(long, default_value_t = 200)]
    steps: usize,

    // ── Sensor options ────────────────────────────────────────
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Per-axis position noise σ (m)
    #[arg(long, default_value_t = 0.5)]
    noise_std: f64,

    /// Probability that a scan has no return
    #[arg(long, default_value_t = 0.0)]
    dropout: f64,

    // ── Sweep options ──────────────────────────────────────────
    #[arg(long, default_value_t = 0.001)]
    sweep_min: f64,

    #[arg(long, default_value_t = 100.0)]
    sweep_max: f64,

    #[arg(long, default_value_t = 11)]
    sweep_steps: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

pub fn run(args: Args) -> Result<()> {
    println!("Radar Tracker (constant-velocity Kalman filter)");
    println!("===============================================\n");

    let config = build_tracker_config(&args)?;
    info!(?config, "tracker configuration");

    if let Some(path) = &args.log {
        run_replay(&args, &config, path)?;
    } else if args.single {
        run_single(&args, &config)?;
    } else {
        run_sweep(&args, &config)?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Single Run
// ---------------------------------------------------------------------------
fn run_single(args: &Args, config: &TrackerConfig) -> Result<()> {
    println!("Running single simulated track...");

    // 1. Setup & Simulate
    let truth = simulate_target(&build_target_params(args, config));
    let meas = generate_measurements(&truth, &build_sensor_config(args));

    // 2. Track
    let track = run_tracker(&meas, config).context("tracker rejected configuration")?;

    // 3. Report
    let stats = ErrorStats::compute(
        &truth.position,
        &truth.velocity,
        &track.position,
        &track.velocity,
        SETTLE_SAMPLES,
    );
    print_track_stats(&meas, &track, Some(&stats));

    // 4. Export
    let path = args
        .output_dir
        .join(format!("track.{}", args.format.extension()));
    write_output(args.format, &path, Some(&truth), &meas, &track)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Log Replay
// ---------------------------------------------------------------------------
fn run_replay(args: &Args, config: &TrackerConfig, log_path: &Path) -> Result<()> {
    println!("Replaying radar log {:?}...", log_path);

    let log = RadarLog::from_path(log_path, config.dt)
        .with_context(|| format!("failed to load radar log {}", log_path.display()))?;
    let config = replay_config(args.dt.is_some(), config, &log)?;

    for target in &log.targets {
        println!("\nTarget {}", target.id);
        let track = run_tracker(&target.data, &config).context("tracker rejected configuration")?;
        print_track_stats(&target.data, &track, None);

        let path = args.output_dir.join(format!(
            "{}_track.{}",
            target.id.to_ascii_lowercase(),
            args.format.extension()
        ));
        write_output(args.format, &path, None, &target.data, &track)?;
    }
    Ok(())
}

/// Matches the tracker's Δt to the log's scan spacing.
///
/// An explicit `--dt` must agree with the log; otherwise the log's mean
/// interval replaces the configured one.
fn replay_config(
    explicit_dt: bool,
    config: &TrackerConfig,
    log: &RadarLog,
) -> Result<TrackerConfig> {
    let Some(timing) = log.scan_timing() else {
        return Ok(*config);
    };
    if !(timing.interval.is_finite() && timing.interval > 0.0) {
        bail!(
            "radar log scan times must increase (mean interval {} s)",
            timing.interval
        );
    }
    if !timing.is_uniform(SCAN_TOLERANCE) {
        warn!(
            interval = timing.interval,
            jitter = timing.jitter,
            "uneven scan spacing, tracking at the mean interval"
        );
    }

    if explicit_dt {
        if ((config.dt - timing.interval) / timing.interval).abs() > SCAN_TOLERANCE {
            bail!(
                "--dt {} s disagrees with the log's scan interval {:.6} s",
                config.dt,
                timing.interval
            );
        }
        return Ok(*config);
    }

    info!(dt = timing.interval, "using scan interval from radar log");
    let config = TrackerConfig {
        dt: timing.interval,
        ..*config
    };
    config.validate().context("invalid tracker configuration")?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Sweep Run
// ---------------------------------------------------------------------------

/// Geometrically spaced process-noise intensities between `min` and `max`.
fn sweep_values(min: f64, max: f64, steps: usize) -> Result<Vec<f64>> {
    if !(min > 0.0 && max >= min) {
        bail!("sweep bounds must satisfy 0 < min <= max (got {min}..{max})");
    }
    Ok(match steps {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let ratio = (max / min).powf(1.0 / (steps - 1) as f64);
            (0..steps).map(|i| min * ratio.powf(i as f64)).collect()
        }
    })
}

fn run_sweep(args: &Args, config: &TrackerConfig) -> Result<()> {
    let values = sweep_values(args.sweep_min, args.sweep_max, args.sweep_steps)?;
    println!("Sweeping process noise over {} values", values.len());

    let truth = simulate_target(&build_target_params(args, config));
    let meas = generate_measurements(&truth, &build_sensor_config(args));

    std::fs::create_dir_all(&args.output_dir)?;
    let path = args.output_dir.join("sweep_summary.csv");
    let mut wtr = csv::Writer::from_path(&path)?;
    wtr.write_record(["process_noise", "pos_rmse", "vel_rmse", "rejected"])?;

    for (i, &q) in values.iter().enumerate() {
        let cfg = TrackerConfig {
            process_noise: q,
            ..*config
        };
        let track = run_tracker(&meas, &cfg).context("tracker rejected configuration")?;
        let stats = ErrorStats::compute(
            &truth.position,
            &truth.velocity,
            &track.position,
            &track.velocity,
            SETTLE_SAMPLES,
        );

        println!(
            "Run {}/{} | q: {:.4} -> Pos RMSE: {:.3} m, Vel RMSE: {:.3} m/s",
            i + 1,
            values.len(),
            q,
            stats.position.rmse,
            stats.velocity.rmse
        );

        wtr.write_record(&[
            format!("{:.6}", q),
            format!("{:.4}", stats.position.rmse),
            format!("{:.4}", stats.velocity.rmse),
            track.rejected.to_string(),
        ])?;
    }

    wtr.flush()?;
    println!("\nSweep complete. Summary at {:?}", path);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_tracker_config(args: &Args) -> Result<TrackerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str::<TrackerConfig>(&text)
                .with_context(|| format!("invalid tracker config {}", path.display()))?
        }
        None => TrackerConfig::default(),
    };

    if let Some(v) = args.dt {
        config.dt = v;
    }
    if let Some(v) = args.process_noise {
        config.process_noise = v;
    }
    if let Some(v) = args.measurement_variance {
        config.measurement_variance = v;
    }
    if let Some(v) = args.initial_variance {
        config.initial_variance = v;
    }

    config.validate().context("invalid tracker configuration")?;
    Ok(config)
}

fn build_target_params(args: &Args, config: &TrackerConfig) -> TargetParams {
    TargetParams {
        start_position: Vector2::new(args.start_cross, args.start_down),
        velocity: Vector2::new(args.vel_cross, args.vel_down),
        acceleration: Vector2::new(args.accel_cross, args.accel_down),
        // Scans arrive at the tracker's own rate
        dt: config.dt,
        steps: args.steps,
    }
}

fn build_sensor_config(args: &Args) -> SensorConfig {
    SensorConfig {
        position_noise_std: args.noise_std,
        dropout_probability: args.dropout,
        seed: args.seed,
    }
}

fn print_track_stats(meas: &MeasurementData, track: &TrackResult, stats: Option<&ErrorStats>) {
    let duration = track.time.last().copied().unwrap_or(0.0);

    println!("\nTrack Stats:");
    println!("  Scans:        {}", meas.len());
    println!("  Returns:      {}", meas.returns());
    println!("  Rejected:     {}", track.rejected);
    println!("  Duration:     {:.2} s", duration);
    if let Some(std) = track.position_std.last() {
        println!("  Final σ pos:  ({:.3}, {:.3}) m", std.x, std.y);
    }
    if let Some(s) = stats {
        println!("  Pos RMSE:     {:.3} m", s.position.rmse);
        println!("  Pos max err:  {:.3} m", s.position.max);
        println!("  Vel RMSE:     {:.3} m/s", s.velocity.rmse);
    }
    println!("-----------------------------");
}

#[derive(Serialize)]
struct TrackRecord {
    time: f64,
    true_cross: Option<f64>,
    true_down: Option<f64>,
    true_vel_cross: Option<f64>,
    true_vel_down: Option<f64>,
    meas_cross: Option<f64>,
    meas_down: Option<f64>,
    est_cross: f64,
    est_down: f64,
    est_vel_cross: f64,
    est_vel_down: f64,
    std_cross: f64,
    std_down: f64,
}

fn build_records(
    truth: Option<&TruthResult>,
    meas: &MeasurementData,
    track: &TrackResult,
) -> Vec<TrackRecord> {
    (0..track.len())
        .map(|i| {
            let tp = truth.and_then(|t| t.position.get(i));
            let tv = truth.and_then(|t| t.velocity.get(i));
            let m = meas.position.get(i).copied().flatten();
            TrackRecord {
                time: track.time[i],
                true_cross: tp.map(|p| p.x),
                true_down: tp.map(|p| p.y),
                true_vel_cross: tv.map(|v| v.x),
                true_vel_down: tv.map(|v| v.y),
                meas_cross: m.map(|p| p.x),
                meas_down: m.map(|p| p.y),
                est_cross: track.position[i].x,
                est_down: track.position[i].y,
                est_vel_cross: track.velocity[i].x,
                est_vel_down: track.velocity[i].y,
                std_cross: track.position_std[i].x,
                std_down: track.position_std[i].y,
            }
        })
        .collect()
}

fn write_output(
    format: OutputFormat,
    path: &Path,
    truth: Option<&TruthResult>,
    meas: &MeasurementData,
    track: &TrackResult,
) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let records = build_records(truth, meas, track);

    match format {
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_path(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            for r in &records {
                wtr.serialize(r)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            serde_json::to_writer_pretty(BufWriter::new(file), &records)?;
        }
    }

    debug!(rows = records.len(), "export finished");
    println!("Data written to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["radar-cli"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        let cfg = build_tracker_config(&args).unwrap();
        assert_eq!(cfg, TrackerConfig::default());
        assert!(!args.single);
        assert!(args.log.is_none());
    }

    #[test]
    fn test_flag_overrides() {
        let args = parse(&["--dt", "0.1", "--process-noise", "2.5"]);
        let cfg = build_tracker_config(&args).unwrap();
        assert_eq!(cfg.dt, 0.1);
        assert_eq!(cfg.process_noise, 2.5);
        assert_eq!(cfg.measurement_variance, 5.0);
    }

    #[test]
    fn test_invalid_flags_rejected() {
        let args = parse(&["--dt=-1"]);
        assert!(build_tracker_config(&args).is_err());
    }

    #[test]
    fn test_sweep_values() {
        let v = sweep_values(0.01, 100.0, 5).unwrap();
        assert_eq!(v.len(), 5);
        assert_relative_eq!(v[0], 0.01);
        assert_relative_eq!(v[2], 1.0, max_relative = 1e-12);
        assert_relative_eq!(v[4], 100.0, max_relative = 1e-12);
        assert_eq!(sweep_values(1.0, 1.0, 1).unwrap(), vec![1.0]);
        assert!(sweep_values(0.0, 1.0, 3).is_err());
        assert!(sweep_values(2.0, 1.0, 3).is_err());

        let many = sweep_values(1e-3, 1e3, 100_001).unwrap();
        assert_relative_eq!(*many.last().unwrap(), 1e3, max_relative = 1e-9);
    }

    fn path_arg(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    /// Noise-free log of a target receding at `speed` m/s, one scan per `interval` s.
    fn write_log(path: &Path, interval: f64, speed: f64, scans: usize) {
        let mut text = String::from("TIME,T1_R,T1_THETA\n");
        for k in 0..scans {
            let t = k as f64 * interval;
            text.push_str(&format!("{t},{},0.0\n", 100.0 + speed * t));
        }
        std::fs::write(path, text).unwrap();
    }

    fn column(path: &Path, name: &str) -> Vec<f64> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        let idx = rdr.headers().unwrap().iter().position(|h| h == name).unwrap();
        rdr.records()
            .map(|r| r.unwrap()[idx].parse().unwrap())
            .collect()
    }

    #[test]
    fn test_replay_tracks_at_log_interval() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("scan.csv");
        let out = dir.path().join("out");
        write_log(&log, 0.1, 10.0, 200);

        run(parse(&["--log", path_arg(&log), "--output-dir", path_arg(&out)])).unwrap();

        let vel = column(&out.join("t1_track.csv"), "est_vel_down");
        assert_eq!(vel.len(), 200);
        let v = *vel.last().unwrap();
        assert!((v - 10.0).abs() < 0.5, "down-range velocity {v}");
    }

    #[test]
    fn test_replay_rejects_conflicting_dt() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("scan.csv");
        write_log(&log, 0.1, 10.0, 20);

        let args = parse(&[
            "--log",
            path_arg(&log),
            "--dt",
            "0.05",
            "--output-dir",
            path_arg(dir.path()),
        ]);
        assert!(run(args).is_err());

        let args = parse(&[
            "--log",
            path_arg(&log),
            "--dt",
            "0.1",
            "--output-dir",
            path_arg(dir.path()),
        ]);
        run(args).unwrap();
    }

    #[test]
    fn test_replay_config_from_timing() {
        let base = TrackerConfig::default();

        let even = "TIME,T1_R,T1_THETA\n0,1,0\n0.2,1,0\n0.4,1,0\n";
        let even = RadarLog::from_reader(even.as_bytes(), 0.05).unwrap();
        let cfg = replay_config(false, &base, &even).unwrap();
        assert_relative_eq!(cfg.dt, 0.2, max_relative = 1e-12);

        // Uneven spacing still runs, at the mean interval.
        let uneven = "TIME,T1_R,T1_THETA\n0,1,0\n0.1,1,0\n0.4,1,0\n";
        let uneven = RadarLog::from_reader(uneven.as_bytes(), 0.05).unwrap();
        let cfg = replay_config(false, &base, &uneven).unwrap();
        assert_relative_eq!(cfg.dt, 0.2, max_relative = 1e-12);

        let backwards = "TIME,T1_R,T1_THETA\n1,1,0\n0,1,0\n";
        let backwards = RadarLog::from_reader(backwards.as_bytes(), 0.05).unwrap();
        assert!(replay_config(false, &base, &backwards).is_err());

        // Without a time column the scans are spaced by the configured dt.
        let untimed = "T1_R,T1_THETA\n1,0\n1,0\n";
        let untimed = RadarLog::from_reader(untimed.as_bytes(), base.dt).unwrap();
        assert_eq!(replay_config(true, &base, &untimed).unwrap(), base);
    }

    #[test]
    fn test_replay_missing_log() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv");
        let err = run(parse(&["--log", path_arg(&missing)])).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load radar log"));
    }

    #[test]
    fn test_single_run_json_export() {
        let dir = tempfile::tempdir().unwrap();
        let args = parse(&[
            "--single",
            "--format",
            "json",
            "--steps",
            "60",
            "--output-dir",
            path_arg(dir.path()),
        ]);
        run(args).unwrap();

        let text = std::fs::read_to_string(dir.path().join("track.json")).unwrap();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(rows.len(), 60);
        assert!(rows[0]["true_cross"].is_number());
        assert!(rows[59]["est_down"].is_number());
    }

    #[test]
    fn test_single_run_csv_export() {
        let dir = tempfile::tempdir().unwrap();
        let args = parse(&["--single", "--steps", "80", "--output-dir", path_arg(dir.path())]);
        run(args).unwrap();

        let path = dir.path().join("track.csv");
        let est = column(&path, "est_cross");
        let truth = column(&path, "true_cross");
        assert_eq!(est.len(), 80);
        assert!((est[79] - truth[79]).abs() < 1.0);
    }

    #[test]
    fn test_sweep_writes_summary() {
        let dir = tempfile::tempdir().unwrap();
        let args = parse(&[
            "--sweep-min",
            "0.01",
            "--sweep-max",
            "1",
            "--sweep-steps",
            "3",
            "--steps",
            "60",
            "--output-dir",
            path_arg(dir.path()),
        ]);
        run(args).unwrap();

        let q = column(&dir.path().join("sweep_summary.csv"), "process_noise");
        assert_eq!(q.len(), 3);
        assert_relative_eq!(q[1], 0.1, max_relative = 1e-4);
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.json");
        std::fs::write(&path, r#"{"dt": 0.1, "process_noise": 2.0}"#).unwrap();

        let args = parse(&["--config", path_arg(&path), "--process-noise", "3.0"]);
        let cfg = build_tracker_config(&args).unwrap();
        assert_eq!(cfg.dt, 0.1);
        assert_eq!(cfg.process_noise, 3.0);
        assert_eq!(cfg.initial_variance, 500.0);

        std::fs::write(&path, "{ not json").unwrap();
        let args = parse(&["--config", path_arg(&path)]);
        assert!(build_tracker_config(&args).is_err());

        std::fs::write(&path, r#"{"measurement_variance": 0.0}"#).unwrap();
        let args = parse(&["--config", path_arg(&path)]);
        assert!(build_tracker_config(&args).is_err());
    }

    #[test]
    fn test_records_without_truth() {
        let meas = MeasurementData {
            time: vec![0.0, 0.05],
            position: vec![Some(Vector2::new(1.0, 2.0)), None],
        };
        let track = run_tracker(&meas, &TrackerConfig::default()).unwrap();
        let records = build_records(None, &meas, &track);
        assert_eq!(records.len(), 2);
        assert!(records[0].true_cross.is_none());
        assert_eq!(records[0].meas_cross, Some(1.0));
        assert!(records[1].meas_down.is_none());
    }
}
