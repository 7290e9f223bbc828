//! Parameter definitions for tracking scenarios.

use serde::Serialize;

/// Parameter specification with bounds and step size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    /// Query/flag name.
    pub name: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
    /// Step size for sliders.
    pub step: f64,
}

impl ParamSpec {
    /// Create a new parameter specification.
    pub const fn new(name: &'static str, label: &'static str, min: f64, max: f64, step: f64) -> Self {
        Self {
            name,
            label,
            min,
            max,
            step,
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }
}

/// Target motion parameters.
pub mod target {
    use super::ParamSpec;

    pub const START_CROSS: ParamSpec = ParamSpec::new("start_cross", "Start Cross-Range (m)", -500.0, 500.0, 1.0);
    pub const START_DOWN: ParamSpec = ParamSpec::new("start_down", "Start Down-Range (m)", 0.0, 1000.0, 1.0);
    pub const VEL_CROSS: ParamSpec = ParamSpec::new("vel_cross", "Velocity Cross (m/s)", -50.0, 50.0, 0.5);
    pub const VEL_DOWN: ParamSpec = ParamSpec::new("vel_down", "Velocity Down (m/s)", -50.0, 50.0, 0.5);
    pub const ACCEL_CROSS: ParamSpec = ParamSpec::new("accel_cross", "Accel Cross (m/s²)", -10.0, 10.0, 0.1);
    pub const ACCEL_DOWN: ParamSpec = ParamSpec::new("accel_down", "Accel Down (m/s²)", -10.0, 10.0, 0.1);
    pub const STEPS: ParamSpec = ParamSpec::new("steps", "Scans", 10.0, 5000.0, 10.0);
}

/// Radar sensor parameters.
pub mod sensor {
    use super::ParamSpec;

    pub const NOISE_STD: ParamSpec = ParamSpec::new("noise_std", "Position Noise σ (m)", 0.0, 20.0, 0.1);
    pub const DROPOUT: ParamSpec = ParamSpec::new("dropout", "Missed Scan Probability", 0.0, 0.95, 0.05);
}

/// Tracker tuning parameters.
pub mod tracker {
    use super::ParamSpec;

    pub const DT: ParamSpec = ParamSpec::new("dt", "Scan Interval (s)", 0.005, 2.0, 0.005);
    pub const PROCESS_NOISE: ParamSpec = ParamSpec::new("process_noise", "Process Noise Intensity", 0.0, 100.0, 0.05);
    pub const MEASUREMENT_VARIANCE: ParamSpec =
        ParamSpec::new("measurement_variance", "R Position (m²)", 0.01, 500.0, 0.5);
    pub const INITIAL_VARIANCE: ParamSpec = ParamSpec::new("initial_variance", "Initial Variance", 1.0, 1e6, 10.0);
}

/// Every parameter, in display order.
pub static ALL: [ParamSpec; 13] = [
    target::START_CROSS,
    target::START_DOWN,
    target::VEL_CROSS,
    target::VEL_DOWN,
    target::ACCEL_CROSS,
    target::ACCEL_DOWN,
    target::STEPS,
    sensor::NOISE_STD,
    sensor::DROPOUT,
    tracker::DT,
    tracker::PROCESS_NOISE,
    tracker::MEASUREMENT_VARIANCE,
    tracker::INITIAL_VARIANCE,
];

#[cfg(test)]
mod tests {
    use super::*;
    use radar_core::TrackerConfig;

    #[test]
    fn test_defaults_within_bounds() {
        let cfg = TrackerConfig::default();
        for (spec, v) in [
            (tracker::DT, cfg.dt),
            (tracker::PROCESS_NOISE, cfg.process_noise),
            (tracker::MEASUREMENT_VARIANCE, cfg.measurement_variance),
            (tracker::INITIAL_VARIANCE, cfg.initial_variance),
        ] {
            assert_eq!(spec.clamp(v), v, "{}", spec.name);
        }
    }

    #[test]
    fn test_clamp() {
        let spec = ParamSpec::new("x", "Test", 0.0, 100.0, 1.0);
        assert_eq!(spec.clamp(-5.0), 0.0);
        assert_eq!(spec.clamp(500.0), 100.0);
        assert_eq!(spec.clamp(f64::NAN), 0.0);
        assert_eq!(spec.clamp(42.0), 42.0);
    }

    #[test]
    fn test_bounds_ordered_and_names_unique() {
        assert!(ALL.iter().all(|p| p.min <= p.max));
        for (i, a) in ALL.iter().enumerate() {
            assert!(ALL[i + 1..].iter().all(|b| b.name != a.name), "{}", a.name);
        }
    }
}
