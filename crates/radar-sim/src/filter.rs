use crate::sensor::MeasurementData;
use nalgebra::Vector2;
use radar_core::{ConfigError, RadarTracker, TrackerConfig};
use tracing::{debug, warn};

/// Struct to hold the output of the tracker run.
#[derive(Clone, Debug, Default)]
pub struct TrackResult {
    pub time: Vec<f64>,
    pub position: Vec<Vector2<f64>>,
    pub velocity: Vec<Vector2<f64>>,
    /// One-sigma position uncertainty per axis.
    pub position_std: Vec<Vector2<f64>>,
    pub covariance_trace: Vec<f64>,
    /// Scans where a return was fused.
    pub updates: usize,
    /// Returns the tracker refused; those scans were coasted.
    pub rejected: usize,
}

impl TrackResult {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Run the tracker over a measurement stream: predict every scan, update on
/// every return.
pub fn run_tracker(
    measurements: &MeasurementData,
    config: &TrackerConfig,
) -> Result<TrackResult, ConfigError> {
    let mut tracker = RadarTracker::from_config(*config)?;

    let n = measurements.len();
    let mut out = TrackResult {
        time: Vec::with_capacity(n),
        position: Vec::with_capacity(n),
        velocity: Vec::with_capacity(n),
        position_std: Vec::with_capacity(n),
        covariance_trace: Vec::with_capacity(n),
        updates: 0,
        rejected: 0,
    };

    for (&t, z) in measurements.time.iter().zip(&measurements.position) {
        tracker.predict();

        if let Some(z) = z {
            match tracker.update(*z) {
                Ok(()) => out.updates += 1,
                Err(e) => {
                    warn!(time = t, "dropping return: {e}");
                    out.rejected += 1;
                }
            }
        }

        out.time.push(t);
        out.position.push(tracker.position());
        out.velocity.push(tracker.velocity());
        out.position_std.push(tracker.position_std());
        out.covariance_trace.push(tracker.covariance().trace());
    }

    debug!(
        scans = n,
        updates = out.updates,
        rejected = out.rejected,
        "tracker run complete"
    );
    Ok(out)
}
