//! Deterministic fixed-point math.
//!
//! Everything the gravity frames compute goes through these types so results
//! are bit-identical across platforms and runs.

pub mod basis;
pub mod expr;
pub mod fixed;
pub mod matrix;
pub mod smoothing;
pub mod trig;
pub mod vector;

pub use fixed::{Fix12, Fix24};
pub use matrix::Matrix3x3;
pub use trig::Angle;
pub use vector::{Vector3, Vector3Fine};
