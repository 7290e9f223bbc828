//! Tracking error statistics against ground truth.

use nalgebra::Vector2;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AxisStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    pub rmse: f64,
}

impl AxisStats {
    pub fn from_errors(errors: &[f64]) -> Self {
        if errors.is_empty() {
            return Self::default();
        }
        let n = errors.len() as f64;
        let mean = errors.iter().sum::<f64>() / n;
        let var = errors.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n;
        let mse = errors.iter().map(|e| e * e).sum::<f64>() / n;
        Self {
            min: errors.iter().copied().fold(f64::INFINITY, f64::min),
            max: errors.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean,
            std: var.sqrt(),
            rmse: mse.sqrt(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ErrorStats {
    pub cross: AxisStats,
    pub down: AxisStats,
    /// Euclidean position error.
    pub position: AxisStats,
    pub velocity: AxisStats,
    /// Samples skipped at the start of the run.
    pub settle_samples: usize,
}

impl ErrorStats {
    /// Compares estimates with truth, ignoring the first `settle` samples while
    /// the filter is still converging.
    pub fn compute(
        truth_pos: &[Vector2<f64>],
        truth_vel: &[Vector2<f64>],
        est_pos: &[Vector2<f64>],
        est_vel: &[Vector2<f64>],
        settle: usize,
    ) -> Self {
        let n = truth_pos.len().min(est_pos.len());
        let settle = settle.min(n);

        let pos_err: Vec<Vector2<f64>> = (settle..n).map(|i| est_pos[i] - truth_pos[i]).collect();
        let vel_err: Vec<f64> = (settle..n.min(truth_vel.len()).min(est_vel.len()))
            .map(|i| (est_vel[i] - truth_vel[i]).norm())
            .collect();

        let cross: Vec<f64> = pos_err.iter().map(|e| e.x).collect();
        let down: Vec<f64> = pos_err.iter().map(|e| e.y).collect();
        let norm: Vec<f64> = pos_err.iter().map(|e| e.norm()).collect();

        Self {
            cross: AxisStats::from_errors(&cross),
            down: AxisStats::from_errors(&down),
            position: AxisStats::from_errors(&norm),
            velocity: AxisStats::from_errors(&vel_err),
            settle_samples: settle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_axis_stats() {
        let s = AxisStats::from_errors(&[1.0, -1.0, 3.0, -3.0]);
        assert_eq!(s.min, -3.0);
        assert_eq!(s.max, 3.0);
        assert_relative_eq!(s.mean, 0.0);
        assert_relative_eq!(s.std, 5.0_f64.sqrt());
        assert_relative_eq!(s.rmse, 5.0_f64.sqrt());
    }

    #[test]
    fn test_empty_errors() {
        assert_eq!(AxisStats::from_errors(&[]), AxisStats::default());
    }

    #[test]
    fn test_compute_with_settle() {
        let truth = vec![Vector2::new(0.0, 0.0); 4];
        let est = vec![
            Vector2::new(100.0, 100.0),
            Vector2::new(3.0, 4.0),
            Vector2::new(3.0, 4.0),
            Vector2::new(-3.0, -4.0),
        ];
        let s = ErrorStats::compute(&truth, &truth, &est, &truth, 1);
        assert_eq!(s.settle_samples, 1);
        assert_relative_eq!(s.position.rmse, 5.0);
        assert_relative_eq!(s.position.max, 5.0);
        assert_relative_eq!(s.cross.mean, 1.0);
        assert_relative_eq!(s.velocity.rmse, 0.0);
    }
}
