//! Constant-velocity motion model and position-only measurement model.
//!
//! State ordering is `[x, y, vx, vy]`, measurement ordering `[x, y]`.

use nalgebra::{ComplexField, Matrix2, SMatrix};

use crate::{Scalar, StateCovariance};

pub type TransitionMatrix = SMatrix<Scalar, 4, 4>;
pub type MeasurementMatrix = SMatrix<Scalar, 2, 4>;
pub type InnovationCovariance = Matrix2<Scalar>;

/// Relative determinant floor below which a 2×2 matrix is treated as singular.
const SINGULAR_TOLERANCE: Scalar = 1e-12;

/// Index of each axis' (position, velocity) pair inside the state vector.
const AXIS_INDICES: [[usize; 2]; 2] = [[0, 2], [1, 3]];

// ---------------------------------------------------------------------------
// MODEL MATRICES
// ---------------------------------------------------------------------------

/// `F` for a fixed step: position integrates velocity, velocity is held.
pub fn transition_matrix(dt: Scalar) -> TransitionMatrix {
    let mut f = TransitionMatrix::identity();
    f[(0, 2)] = dt;
    f[(1, 3)] = dt;
    f
}

/// `H`: only the position components are observed.
pub fn measurement_matrix() -> MeasurementMatrix {
    let mut h = MeasurementMatrix::zeros();
    h[(0, 0)] = 1.0;
    h[(1, 1)] = 1.0;
    h
}

/// Discretised white-acceleration noise for one axis, over (position, velocity).
pub fn axis_process_noise(dt: Scalar, intensity: Scalar) -> Matrix2<Scalar> {
    let dt2 = dt * dt;
    let dt3 = dt2 * dt;
    let dt4 = dt3 * dt;
    Matrix2::new(dt4 / 4.0, dt3 / 2.0, dt3 / 2.0, dt2) * intensity
}

/// Block-diagonal `Q` built from one (position, velocity) block per axis.
///
/// The x block lands on state indices {0, 2} and the y block on {1, 3}, so the
/// two axes stay uncorrelated.
pub fn compose_axis_blocks(x_block: &Matrix2<Scalar>, y_block: &Matrix2<Scalar>) -> StateCovariance {
    let mut q = StateCovariance::zeros();
    for (block, idx) in [x_block, y_block].into_iter().zip(AXIS_INDICES) {
        for r in 0..2 {
            for c in 0..2 {
                q[(idx[r], idx[c])] = block[(r, c)];
            }
        }
    }
    q
}

pub fn process_noise(dt: Scalar, intensity: Scalar) -> StateCovariance {
    let block = axis_process_noise(dt, intensity);
    compose_axis_blocks(&block, &block)
}

/// Diagonal `R` with the same variance on both axes.
pub fn measurement_noise(variance: Scalar) -> Matrix2<Scalar> {
    Matrix2::from_diagonal_element(variance)
}

// ---------------------------------------------------------------------------
// 2×2 INVERSE
// ---------------------------------------------------------------------------

/// Closed-form inverse of a 2×2 matrix.
///
/// Returns `None` when the determinant is not finite or is negligible relative
/// to the magnitude of the entries.
pub fn invert_2x2(m: &Matrix2<Scalar>) -> Option<Matrix2<Scalar>> {
    let (a, b, c, d) = (m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)]);
    let det = a * d - b * c;
    let scale = m.amax();
    if !det.is_finite() || ComplexField::abs(det) <= SINGULAR_TOLERANCE * scale * scale {
        return None;
    }
    let inv_det = 1.0 / det;
    Some(Matrix2::new(d, -b, -c, a) * inv_det)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transition_propagates_position() {
        let f = transition_matrix(0.5);
        let x = crate::StateVector::new(1.0, 2.0, 4.0, -2.0);
        let next = f * x;
        assert_relative_eq!(next, crate::StateVector::new(3.0, 1.0, 4.0, -2.0));
    }

    #[test]
    fn test_measurement_matrix_selects_position() {
        let h = measurement_matrix();
        let x = crate::StateVector::new(7.0, -3.0, 100.0, 100.0);
        let z = h * x;
        assert_eq!(z[0], 7.0);
        assert_eq!(z[1], -3.0);
    }

    #[test]
    fn test_process_noise_layout() {
        let dt = 0.05;
        let q = process_noise(dt, 0.1);
        let pp = dt.powi(4) / 4.0 * 0.1;
        let pv = dt.powi(3) / 2.0 * 0.1;
        let vv = dt.powi(2) * 0.1;

        for (p, v) in [(0, 2), (1, 3)] {
            assert_relative_eq!(q[(p, p)], pp, max_relative = 1e-12);
            assert_relative_eq!(q[(p, v)], pv, max_relative = 1e-12);
            assert_relative_eq!(q[(v, p)], pv, max_relative = 1e-12);
            assert_relative_eq!(q[(v, v)], vv, max_relative = 1e-12);
        }
        // No cross-axis coupling
        assert_eq!(q[(0, 1)], 0.0);
        assert_eq!(q[(0, 3)], 0.0);
        assert_eq!(q[(2, 1)], 0.0);
        assert_eq!(q[(2, 3)], 0.0);
        assert_eq!(q, q.transpose());
    }

    #[test]
    fn test_zero_intensity_gives_zero_noise() {
        assert_eq!(process_noise(0.05, 0.0), StateCovariance::zeros());
    }

    #[test]
    fn test_invert_2x2() {
        let m = Matrix2::new(4.0, 1.0, 2.0, 3.0);
        let inv = invert_2x2(&m).unwrap();
        assert_relative_eq!(m * inv, Matrix2::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_invert_2x2_singular() {
        assert!(invert_2x2(&Matrix2::zeros()).is_none());
        assert!(invert_2x2(&Matrix2::new(1.0, 2.0, 2.0, 4.0)).is_none());
        assert!(invert_2x2(&Matrix2::new(Scalar::NAN, 0.0, 0.0, 1.0)).is_none());
    }
}
