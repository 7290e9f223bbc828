//! Radar Simulation Library
//!
//! Provides target scenarios, radar return modeling, radar log ingestion and
//! the driver loop that runs [`radar_core::RadarTracker`] over a return stream.

pub mod filter;
pub mod log;
pub mod params;
pub mod scenario;
pub mod sensor;
pub mod stats;

// Re-export main types
pub use filter::{run_tracker, TrackResult};
pub use log::{polar_to_cartesian, LogError, RadarLog, ScanTiming, TargetLog};
pub use params::ParamSpec;
pub use scenario::{simulate_target, TargetParams, TruthResult};
pub use sensor::{generate_measurements, MeasurementData, SensorConfig};
pub use stats::{AxisStats, ErrorStats};
