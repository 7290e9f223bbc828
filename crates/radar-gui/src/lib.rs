//! Radar GUI - Web interface for track visualisation
//!
//! Features:
//! - Scenario, sensor and tracker parameters via query string
//! - Truth / radar returns / estimate series for plotting
//! - Tracking error statistics

use axum::{extract::Query, routing::get, Json, Router};
use nalgebra::Vector2;
use radar_core::TrackerConfig;
use radar_sim::{
    generate_measurements, params, run_tracker, simulate_target, ErrorStats, ParamSpec,
    SensorConfig, TargetParams,
};
use serde::Serialize;
use std::collections::HashMap;
use tower_http::services::ServeDir;
use tracing::{debug, warn};

const SETTLE_SAMPLES: usize = 50;

/// Creates the Axum router with all routes
pub fn create_router() -> Router {
    let templates = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");
    Router::new()
        .route("/api/track", get(handle_track))
        .route("/api/params", get(handle_params))
        .fallback_service(ServeDir::new(templates))
}

/// Scenario configuration from query params
#[derive(Debug, Clone, PartialEq)]
struct GuiConfig {
    // Target
    start_cross: f64,
    start_down: f64,
    vel_cross: f64,
    vel_down: f64,
    accel_cross: f64,
    accel_down: f64,
    steps: usize,
    // Sensor
    noise_std: f64,
    dropout: f64,
    seed: u64,
    // Tracker
    tracker: TrackerConfig,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            start_cross: 0.0,
            start_down: 0.0,
            vel_cross: 10.0,
            vel_down: 5.0,
            accel_cross: 0.0,
            accel_down: 0.0,
            steps: 200,
            noise_std: 0.5,
            dropout: 0.0,
            seed: 42,
            tracker: TrackerConfig::default(),
        }
    }
}

/// Parse config from query parameters, clamping each value to its bounds.
fn parse_config(query: &HashMap<String, String>) -> GuiConfig {
    let mut config = GuiConfig::default();

    macro_rules! parse_param {
        ($($field:ident).+, $spec:expr) => {
            if let Some(val) = query.get($spec.name).and_then(|v| v.parse::<f64>().ok()) {
                config.$($field).+ = $spec.clamp(val);
            }
        };
    }

    parse_param!(start_cross, params::target::START_CROSS);
    parse_param!(start_down, params::target::START_DOWN);
    parse_param!(vel_cross, params::target::VEL_CROSS);
    parse_param!(vel_down, params::target::VEL_DOWN);
    parse_param!(accel_cross, params::target::ACCEL_CROSS);
    parse_param!(accel_down, params::target::ACCEL_DOWN);
    parse_param!(noise_std, params::sensor::NOISE_STD);
    parse_param!(dropout, params::sensor::DROPOUT);
    parse_param!(tracker.dt, params::tracker::DT);
    parse_param!(tracker.process_noise, params::tracker::PROCESS_NOISE);
    parse_param!(tracker.measurement_variance, params::tracker::MEASUREMENT_VARIANCE);
    parse_param!(tracker.initial_variance, params::tracker::INITIAL_VARIANCE);

    if let Some(steps) = query.get("steps").and_then(|v| v.parse::<f64>().ok()) {
        config.steps = params::target::STEPS.clamp(steps) as usize;
    }
    if let Some(seed) = query.get("seed").and_then(|v| v.parse::<u64>().ok()) {
        config.seed = seed;
    }

    config
}

/// Handle track request
async fn handle_track(Query(query): Query<HashMap<String, String>>) -> Json<TrackResponse> {
    let config = parse_config(&query);
    debug!(?config, "track request");
    Json(run_scenario(&config))
}

async fn handle_params() -> Json<&'static [ParamSpec]> {
    Json(&params::ALL[..])
}

#[derive(Serialize, Default)]
struct Series {
    cross: Vec<f64>,
    down: Vec<f64>,
}

impl Series {
    fn from_points<'a>(points: impl IntoIterator<Item = &'a Vector2<f64>>) -> Self {
        let mut s = Series::default();
        for p in points {
            s.cross.push(p.x);
            s.down.push(p.y);
        }
        s
    }
}

/// Radar returns with gaps marked as `null`.
#[derive(Serialize, Default)]
struct ReturnSeries {
    cross: Vec<Option<f64>>,
    down: Vec<Option<f64>>,
}

#[derive(Serialize)]
struct TrackResponse {
    time: Vec<f64>,
    truth: Series,
    returns: ReturnSeries,
    estimate: Series,
    estimate_velocity: Series,
    position_std: Series,
    covariance_trace: Vec<f64>,
    error_stats: ErrorStats,
    rejected: usize,
    success: bool,
    error: Option<String>,
}

/// Run scenario, radar model and tracker for one request.
fn run_scenario(config: &GuiConfig) -> TrackResponse {
    let truth = simulate_target(&TargetParams {
        start_position: Vector2::new(config.start_cross, config.start_down),
        velocity: Vector2::new(config.vel_cross, config.vel_down),
        acceleration: Vector2::new(config.accel_cross, config.accel_down),
        dt: config.tracker.dt,
        steps: config.steps,
    });
    let meas = generate_measurements(
        &truth,
        &SensorConfig {
            position_noise_std: config.noise_std,
            dropout_probability: config.dropout,
            seed: config.seed,
        },
    );

    let returns = ReturnSeries {
        cross: meas.position.iter().map(|p| p.map(|p| p.x)).collect(),
        down: meas.position.iter().map(|p| p.map(|p| p.y)).collect(),
    };

    match run_tracker(&meas, &config.tracker) {
        Ok(track) => {
            let error_stats = ErrorStats::compute(
                &truth.position,
                &truth.velocity,
                &track.position,
                &track.velocity,
                SETTLE_SAMPLES,
            );
            TrackResponse {
                time: track.time.clone(),
                truth: Series::from_points(&truth.position),
                returns,
                estimate: Series::from_points(&track.position),
                estimate_velocity: Series::from_points(&track.velocity),
                position_std: Series::from_points(&track.position_std),
                covariance_trace: track.covariance_trace,
                error_stats,
                rejected: track.rejected,
                success: true,
                error: None,
            }
        }
        Err(e) => {
            warn!("tracker rejected configuration: {e}");
            TrackResponse {
                time: truth.time.clone(),
                truth: Series::from_points(&truth.position),
                returns,
                estimate: Series::default(),
                estimate_velocity: Series::default(),
                position_std: Series::default(),
                covariance_trace: Vec::new(),
                error_stats: ErrorStats::default(),
                rejected: 0,
                success: false,
                error: Some(e.to_string()),
            }
        }
    }
}
