//! Core foundation layer.
//!
//! No internal dependencies; every other layer builds on it.
//!
//! # Contents
//!
//! - [`types`]: points, poses, point sequences, timestamped values
//! - [`math`]: angle normalization and interpolation
//! - [`transform`]: batch SE(2) transforms of point arrays

pub mod math;
pub mod transform;
pub mod types;
