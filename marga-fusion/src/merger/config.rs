//! Path merger tuning parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for [`PathMerger`](super::PathMerger).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathMergerConfig {
    /// Processing and control delay to compensate (milliseconds).
    ///
    /// The join point on the previous path is moved ahead of the vehicle by
    /// the distance covered at `nominal_speed_mps` during this delay.
    pub delay_ms: f64,

    /// Blend region length in points (N2).
    ///
    /// Also bounds how many previous-path points enter the fit.
    pub blend_length: usize,

    /// Smoothness weight in [0, 1).
    pub lambda_1: f64,

    /// Heading-adherence weight in [0, 1).
    pub lambda_2: f64,

    /// Decay exponent (w).
    ///
    /// Previous-path weights fall off as `exp(-w · k / N2)` with distance `k`
    /// (in points) from the join; the new path ramps in as `s^w`.
    pub decay: f64,

    /// B-spline degree.
    pub spline_degree: usize,

    /// Nominal path sample spacing (meters).
    pub arc_length_step: f64,

    /// Speed used for delay compensation (m/s).
    pub nominal_speed_mps: f64,

    /// Maximum distance (meters) between a previous-path point and the new
    /// path for the two to count as overlapping.
    pub overlap_tolerance: f64,

    /// Upper bound on spline control points.
    pub max_control_points: usize,

    /// Record a [`FusionRecord`](super::FusionRecord) per merge.
    pub debug: bool,
}

impl Default for PathMergerConfig {
    fn default() -> Self {
        Self {
            delay_ms: 50.0,
            blend_length: 50,
            lambda_1: 0.5,
            lambda_2: 0.5,
            decay: 3.0,
            spline_degree: 3,
            arc_length_step: 0.1,
            nominal_speed_mps: 10.0 / 3.6, // 10 km/h
            overlap_tolerance: 0.5,
            max_control_points: 60,
            debug: false,
        }
    }
}

impl PathMergerConfig {
    /// Enable or disable debug history.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the blend length (N2).
    pub fn with_blend_length(mut self, blend_length: usize) -> Self {
        self.blend_length = blend_length;
        self
    }

    /// Set the smoothness and heading weights.
    pub fn with_lambdas(mut self, lambda_1: f64, lambda_2: f64) -> Self {
        self.lambda_1 = lambda_1;
        self.lambda_2 = lambda_2;
        self
    }

    /// Set the spline degree.
    pub fn with_spline_degree(mut self, degree: usize) -> Self {
        self.spline_degree = degree;
        self
    }

    /// Minimum number of points a path needs for a fit.
    #[inline]
    pub fn min_points(&self) -> usize {
        self.spline_degree + 1
    }

    /// Index offset covered during the delay: `ceil(v · delay / ds)`.
    pub fn delay_offset(&self) -> usize {
        let distance = self.nominal_speed_mps * self.delay_ms / 1000.0;
        (distance / self.arc_length_step).ceil().max(0.0) as usize
    }

    /// Check every parameter's range.
    pub fn validate(&self) -> Result<()> {
        let unit = 0.0..1.0;
        if !unit.contains(&self.lambda_1) {
            return Err(Error::InvalidConfig(format!(
                "lambda_1 must be in [0, 1), got {}",
                self.lambda_1
            )));
        }
        if !unit.contains(&self.lambda_2) {
            return Err(Error::InvalidConfig(format!(
                "lambda_2 must be in [0, 1), got {}",
                self.lambda_2
            )));
        }
        if !(1..=5).contains(&self.spline_degree) {
            return Err(Error::InvalidConfig(format!(
                "spline_degree must be in 1..=5, got {}",
                self.spline_degree
            )));
        }
        if self.blend_length == 0 {
            return Err(Error::InvalidConfig("blend_length must be > 0".into()));
        }
        if self.max_control_points <= self.spline_degree {
            return Err(Error::InvalidConfig(format!(
                "max_control_points must exceed spline_degree ({})",
                self.spline_degree
            )));
        }
        let non_negative = [
            ("delay_ms", self.delay_ms),
            ("decay", self.decay),
            ("nominal_speed_mps", self.nominal_speed_mps),
            ("overlap_tolerance", self.overlap_tolerance),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        if !(self.arc_length_step.is_finite() && self.arc_length_step > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "arc_length_step must be > 0, got {}",
                self.arc_length_step
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = PathMergerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_points(), 4);
    }

    #[test]
    fn test_delay_offset() {
        // 2.78 m/s · 0.05 s = 0.139 m over 0.1 m steps
        assert_eq!(PathMergerConfig::default().delay_offset(), 2);

        let no_delay = PathMergerConfig {
            delay_ms: 0.0,
            ..Default::default()
        };
        assert_eq!(no_delay.delay_offset(), 0);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let bad = [
            PathMergerConfig::default().with_lambdas(1.0, 0.5),
            PathMergerConfig::default().with_lambdas(0.5, -0.1),
            PathMergerConfig::default().with_spline_degree(0),
            PathMergerConfig::default().with_blend_length(0),
            PathMergerConfig {
                arc_length_step: 0.0,
                ..Default::default()
            },
            PathMergerConfig {
                decay: f64::NAN,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: PathMergerConfig = toml::from_str("blend_length = 20\ndebug = true").unwrap();
        assert_eq!(config.blend_length, 20);
        assert!(config.debug);
        assert_eq!(config.spline_degree, 3);
    }
}
