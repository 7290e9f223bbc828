use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------
#[derive(Debug, Clone)]
pub struct TargetParams {
    pub start_position: Vector2<f64>, // [cross, down] (m)
    pub velocity: Vector2<f64>,       // m/s
    pub acceleration: Vector2<f64>,   // m/s², zero for a pure CV target
    pub dt: f64,                      // s
    pub steps: usize,
}

impl Default for TargetParams {
    fn default() -> Self {
        Self {
            start_position: Vector2::zeros(),
            velocity: Vector2::new(10.0, 5.0),
            acceleration: Vector2::zeros(),
            dt: 0.05,
            steps: 200,
        }
    }
}

// ---------------------------------------------------------------------------
// Ground Truth
// ---------------------------------------------------------------------------
#[derive(Clone, Debug, Default)]
pub struct TruthResult {
    pub time: Vec<f64>,
    pub position: Vec<Vector2<f64>>,
    pub velocity: Vec<Vector2<f64>>,
}

impl TruthResult {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Integrates the target forward with exact constant-acceleration kinematics.
///
/// The first sample is taken one step after the start, so sample `k` sits at
/// `t = (k + 1)·dt`.
pub fn simulate_target(p: &TargetParams) -> TruthResult {
    let mut out = TruthResult {
        time: Vec::with_capacity(p.steps),
        position: Vec::with_capacity(p.steps),
        velocity: Vec::with_capacity(p.steps),
    };

    let mut pos = p.start_position;
    let mut vel = p.velocity;
    let dt = p.dt;

    for k in 0..p.steps {
        pos += vel * dt + p.acceleration * (0.5 * dt * dt);
        vel += p.acceleration * dt;

        out.time.push((k + 1) as f64 * dt);
        out.position.push(pos);
        out.velocity.push(vel);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_velocity_truth() {
        let r = simulate_target(&TargetParams::default());
        assert_eq!(r.len(), 200);
        assert_relative_eq!(r.time[0], 0.05);
        assert_relative_eq!(r.position[0], Vector2::new(0.5, 0.25), epsilon = 1e-12);

        let last = r.position.last().unwrap();
        assert_relative_eq!(*last, Vector2::new(100.0, 50.0), epsilon = 1e-9);
        assert!(r.velocity.iter().all(|v| *v == Vector2::new(10.0, 5.0)));
    }

    #[test]
    fn test_accelerating_truth() {
        let p = TargetParams {
            velocity: Vector2::zeros(),
            acceleration: Vector2::new(2.0, 0.0),
            dt: 0.1,
            steps: 10,
            ..TargetParams::default()
        };
        let r = simulate_target(&p);
        // x = a t² / 2 at t = 1 s
        assert_relative_eq!(r.position[9].x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(r.velocity[9].x, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_steps() {
        let p = TargetParams {
            steps: 0,
            ..TargetParams::default()
        };
        assert!(simulate_target(&p).is_empty());
    }
}
