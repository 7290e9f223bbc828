use thiserror::Error;

use crate::Scalar;

/// Default sample interval (s).
pub const DEFAULT_DT: Scalar = 0.05;
/// Default white-acceleration intensity.
pub const DEFAULT_PROCESS_NOISE: Scalar = 0.1;
/// Default per-axis measurement variance (m²).
pub const DEFAULT_MEASUREMENT_VARIANCE: Scalar = 5.0;
/// Default diagonal of the initial covariance; large means "unknown".
pub const DEFAULT_INITIAL_VARIANCE: Scalar = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("time step must be positive and finite, got {0}")]
    NonPositiveTimeStep(Scalar),
    #[error("process noise intensity must be non-negative and finite, got {0}")]
    NegativeProcessNoise(Scalar),
    #[error("measurement variance must be positive and finite, got {0}")]
    NonPositiveMeasurementVariance(Scalar),
    #[error("initial variance must be positive and finite, got {0}")]
    NonPositiveInitialVariance(Scalar),
}

/// Construction parameters for [`crate::RadarTracker`].
///
/// Fixed for the lifetime of a tracker; there is no reconfiguration path.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrackerConfig {
    /// Time between predict steps (s).
    pub dt: Scalar,
    /// Scalar intensity of the discretised white-acceleration noise.
    pub process_noise: Scalar,
    /// Variance of each position measurement axis (m²).
    pub measurement_variance: Scalar,
    /// Initial variance placed on every state component.
    pub initial_variance: Scalar,
}

impl TrackerConfig {
    pub fn new(dt: Scalar, process_noise: Scalar) -> Self {
        Self {
            dt,
            process_noise,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::NonPositiveTimeStep(self.dt));
        }
        if !(self.process_noise.is_finite() && self.process_noise >= 0.0) {
            return Err(ConfigError::NegativeProcessNoise(self.process_noise));
        }
        if !(self.measurement_variance.is_finite() && self.measurement_variance > 0.0) {
            return Err(ConfigError::NonPositiveMeasurementVariance(
                self.measurement_variance,
            ));
        }
        if !(self.initial_variance.is_finite() && self.initial_variance > 0.0) {
            return Err(ConfigError::NonPositiveInitialVariance(self.initial_variance));
        }
        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            process_noise: DEFAULT_PROCESS_NOISE,
            measurement_variance: DEFAULT_MEASUREMENT_VARIANCE,
            initial_variance: DEFAULT_INITIAL_VARIANCE,
        }
    }
}
