//! # Radar Core
//!
//! Single-target state estimation for a 2-D radar track, usable in `no_std`
//! environments. This crate holds only the numerical recursion:
//! - Constant-velocity motion model and position measurement model
//! - Linear Kalman filter (`predict` / `update`)
//! - Tracker configuration and validation
//!
//! The tracker never logs, allocates or performs I/O. Drivers that feed it
//! measurements live in `radar-sim`.
//!
//! # Features
//! - `std`: Enable standard library support
//! - `serde`: `Serialize`/`Deserialize` for [`TrackerConfig`]
//! - Default: `no_std` with no allocations

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod config;
pub mod model;
pub mod tracker;

use nalgebra::{SMatrix, SVector, Vector2};

pub type Scalar = f64;

/// `[x, y, vx, vy]`
pub type StateVector = SVector<Scalar, 4>;
pub type StateCovariance = SMatrix<Scalar, 4, 4>;
/// Observed `[x, y]` position.
pub type Measurement = Vector2<Scalar>;

// Re-export core types
pub use config::{ConfigError, TrackerConfig};
pub use tracker::{RadarTracker, UpdateError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
