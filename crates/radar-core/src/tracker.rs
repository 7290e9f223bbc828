use nalgebra::{ComplexField, Matrix2, Vector2};
use thiserror::Error;

use crate::config::{ConfigError, TrackerConfig};
use crate::model::{self, MeasurementMatrix, TransitionMatrix};
use crate::{Measurement, Scalar, StateCovariance, StateVector};

// ---------------------------------------------------------------------------
// ERRORS
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum UpdateError {
    #[error("measurement contains non-finite values ({0}, {1})")]
    NonFiniteMeasurement(Scalar, Scalar),
    #[error("innovation covariance is singular")]
    SingularInnovationCovariance,
}

// ---------------------------------------------------------------------------
// TRACKER
// ---------------------------------------------------------------------------

/// Linear Kalman filter over a 2-D constant-velocity target.
///
/// State is `[x, y, vx, vy]` in the down-range/cross-range plane. Only the
/// position is observed. `predict` and `update` may be called in any order.
#[derive(Clone, Debug)]
pub struct RadarTracker {
    config: TrackerConfig,

    x: StateVector,
    p: StateCovariance,

    f: TransitionMatrix,
    h: MeasurementMatrix,
    q: StateCovariance,
    r: Matrix2<Scalar>,
}

impl RadarTracker {
    /// Tracker with the default measurement and initial variances.
    pub fn new(dt: Scalar, process_noise: Scalar) -> Result<Self, ConfigError> {
        Self::from_config(TrackerConfig::new(dt, process_noise))
    }

    pub fn from_config(config: TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            x: StateVector::zeros(),
            p: StateCovariance::identity() * config.initial_variance,
            f: model::transition_matrix(config.dt),
            h: model::measurement_matrix(),
            q: model::process_noise(config.dt, config.process_noise),
            r: model::measurement_noise(config.measurement_variance),
        })
    }

    // =====================================================================
    // PREDICT
    // =====================================================================

    /// Propagates the estimate one step through the motion model.
    pub fn predict(&mut self) -> StateVector {
        self.x = self.f * self.x;
        self.p = self.f * self.p * self.f.transpose() + self.q;
        self.x
    }

    // =====================================================================
    // UPDATE
    // =====================================================================

    /// Fuses a position observation into the estimate.
    ///
    /// On error nothing is modified, so the caller may drop the measurement
    /// and keep going.
    pub fn update(&mut self, z: Measurement) -> Result<(), UpdateError> {
        if !(z.x.is_finite() && z.y.is_finite()) {
            return Err(UpdateError::NonFiniteMeasurement(z.x, z.y));
        }

        let innovation: Vector2<Scalar> = z - self.h * self.x;
        let p_ht = self.p * self.h.transpose();
        let s = self.h * p_ht + self.r;
        let s_inv = model::invert_2x2(&s).ok_or(UpdateError::SingularInnovationCovariance)?;

        let k_gain = p_ht * s_inv;
        self.x += k_gain * innovation;

        let i_minus_kh = StateCovariance::identity() - k_gain * self.h;
        let p = i_minus_kh * self.p;
        self.p = (p + p.transpose()) * 0.5;
        Ok(())
    }

    // =====================================================================
    // ACCESSORS
    // =====================================================================

    /// Copies of the state vector and covariance.
    pub fn read_state(&self) -> (StateVector, StateCovariance) {
        (self.x, self.p)
    }

    pub fn state(&self) -> StateVector {
        self.x
    }

    pub fn covariance(&self) -> StateCovariance {
        self.p
    }

    pub fn position(&self) -> Vector2<Scalar> {
        Vector2::new(self.x[0], self.x[1])
    }

    pub fn velocity(&self) -> Vector2<Scalar> {
        Vector2::new(self.x[2], self.x[3])
    }

    /// One-sigma position uncertainty per axis.
    pub fn position_std(&self) -> Vector2<Scalar> {
        Vector2::new(
            ComplexField::sqrt(self.p[(0, 0)].max(0.0)),
            ComplexField::sqrt(self.p[(1, 1)].max(0.0)),
        )
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn dt(&self) -> Scalar {
        self.config.dt
    }
}
