use crate::scenario::TruthResult;
use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SensorConfig {
    pub position_noise_std: f64, // meters, per axis
    /// Probability that a scan produces no return for the target.
    pub dropout_probability: f64,
    pub seed: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            position_noise_std: 0.5,
            dropout_probability: 0.0,
            seed: 42,
        }
    }
}

/// Noisy position returns aligned with the truth samples.
///
/// `None` marks a scan without a return.
#[derive(Clone, Debug, Default)]
pub struct MeasurementData {
    pub time: Vec<f64>,
    pub position: Vec<Option<Vector2<f64>>>,
}

impl MeasurementData {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn returns(&self) -> usize {
        self.position.iter().filter(|p| p.is_some()).count()
    }
}

pub fn generate_measurements(truth: &TruthResult, cfg: &SensorConfig) -> MeasurementData {
    let mut rng = StdRng::seed_from_u64(cfg.seed);

    let sigma = cfg.position_noise_std.max(0.0);
    let d_pos = Normal::new(0.0, sigma).expect("sigma is non-negative");
    let p_drop = cfg.dropout_probability.clamp(0.0, 1.0);

    let n = truth.len();
    let mut data = MeasurementData {
        time: truth.time.clone(),
        position: Vec::with_capacity(n),
    };

    for pos in &truth.position {
        // Sample noise even on dropped scans so the noise sequence does not
        // depend on the dropout setting.
        let noise = Vector2::new(d_pos.sample(&mut rng), d_pos.sample(&mut rng));
        let dropped = p_drop > 0.0 && rng.gen_bool(p_drop);
        data.position.push(if dropped { None } else { Some(pos + noise) });
    }

    debug!(
        samples = n,
        returns = data.returns(),
        sigma,
        "generated radar returns"
    );
    data
}
