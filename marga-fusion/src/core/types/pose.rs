//! Vehicle pose as an SE(2) rigid transform.

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use super::{Point2D, Timestamped};
use crate::core::math::{angle_lerp, normalize_angle};
use crate::error::{Error, Result};

/// Vehicle pose in the plane.
///
/// Represents position (x, y) in meters and heading (theta) in radians.
/// Theta is normalized to [-π, π]. A pose doubles as the transform taking
/// points from the frame it defines (ego) into its parent frame (world).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position in meters
    pub x: f64,
    /// Y position in meters
    pub y: f64,
    /// Heading in radians, normalized to [-π, π]
    pub theta: f64,
}

impl Pose2D {
    /// Create a new pose with theta normalized to [-π, π].
    #[inline]
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    /// Create a pose, rejecting non-finite components.
    pub fn try_new(x: f64, y: f64, theta: f64) -> Result<Self> {
        let pose = Self { x, y, theta };
        pose.validate()?;
        Ok(Self::new(x, y, theta))
    }

    /// Identity pose at origin with zero heading.
    #[inline]
    pub const fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }

    /// All three components are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.theta.is_finite()
    }

    /// Fail with [`Error::InvalidPose`] unless every component is finite.
    pub fn validate(&self) -> Result<()> {
        if self.is_finite() {
            Ok(())
        } else {
            Err(Error::InvalidPose {
                x: self.x,
                y: self.y,
                theta: self.theta,
            })
        }
    }

    /// Position component.
    #[inline]
    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Compose two poses: self ⊕ other
    ///
    /// Applies `other` transform relative to `self` frame.
    /// ```text
    /// C = A ⊕ B:
    ///   C.x = A.x + B.x * cos(A.θ) - B.y * sin(A.θ)
    ///   C.y = A.y + B.x * sin(A.θ) + B.y * cos(A.θ)
    ///   C.θ = normalize(A.θ + B.θ)
    /// ```
    #[inline]
    pub fn compose(&self, other: &Pose2D) -> Pose2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Pose2D::new(
            self.x + other.x * cos_t - other.y * sin_t,
            self.y + other.x * sin_t + other.y * cos_t,
            self.theta + other.theta,
        )
    }

    /// Inverse of this pose.
    ///
    /// ```text
    /// A⁻¹:
    ///   x = -A.x * cos(A.θ) - A.y * sin(A.θ)
    ///   y =  A.x * sin(A.θ) - A.y * cos(A.θ)
    ///   θ = -A.θ
    /// ```
    #[inline]
    pub fn inverse(&self) -> Pose2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Pose2D::new(
            -self.x * cos_t - self.y * sin_t,
            self.x * sin_t - self.y * cos_t,
            -self.theta,
        )
    }

    /// This pose expressed in the frame of `reference`: `reference⁻¹ ⊕ self`.
    #[inline]
    pub fn relative_to(&self, reference: &Pose2D) -> Pose2D {
        reference.inverse().compose(self)
    }

    /// Transform a point from local frame to parent frame.
    #[inline]
    pub fn transform_point(&self, point: &Point2D) -> Point2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Point2D::new(
            self.x + point.x * cos_t - point.y * sin_t,
            self.y + point.x * sin_t + point.y * cos_t,
        )
    }

    /// Transform a point from parent frame to local frame.
    #[inline]
    pub fn inverse_transform_point(&self, point: &Point2D) -> Point2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        let dx = point.x - self.x;
        let dy = point.y - self.y;
        Point2D::new(dx * cos_t + dy * sin_t, -dx * sin_t + dy * cos_t)
    }

    /// Homogeneous 3×3 matrix of this transform.
    ///
    /// ```text
    /// | cos θ  -sin θ  x |
    /// | sin θ   cos θ  y |
    /// |   0       0    1 |
    /// ```
    pub fn to_matrix(&self) -> Matrix3<f64> {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Matrix3::new(cos_t, -sin_t, self.x, sin_t, cos_t, self.y, 0.0, 0.0, 1.0)
    }

    /// Recover a pose from a homogeneous matrix (rotation read via atan2).
    pub fn from_matrix(m: &Matrix3<f64>) -> Pose2D {
        Pose2D::new(m[(0, 2)], m[(1, 2)], m[(1, 0)].atan2(m[(0, 0)]))
    }

    /// Interpolate between two timestamped poses.
    ///
    /// Returns `None` if `target_s` is outside [start, end]. Linear in x, y and
    /// shortest-path in theta.
    pub fn interpolate(
        start: &Timestamped<Pose2D>,
        end: &Timestamped<Pose2D>,
        target_s: f64,
    ) -> Option<Pose2D> {
        if target_s < start.timestamp_s || target_s > end.timestamp_s {
            return None;
        }

        let span = end.timestamp_s - start.timestamp_s;
        if span <= 0.0 {
            return Some(start.data);
        }

        let t = (target_s - start.timestamp_s) / span;
        Some(Pose2D {
            x: start.data.x + t * (end.data.x - start.data.x),
            y: start.data.y + t * (end.data.y - start.data.y),
            theta: angle_lerp(start.data.theta, end.data.theta, t),
        })
    }

    /// Check equality within position and angle tolerances.
    pub fn approx_eq(&self, other: &Pose2D, pos_epsilon: f64, angle_epsilon: f64) -> bool {
        (self.x - other.x).abs() <= pos_epsilon
            && (self.y - other.y).abs() <= pos_epsilon
            && crate::core::math::angle_diff(self.theta, other.theta).abs() <= angle_epsilon
    }
}

impl Default for Pose2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Pose2D {
    type Output = Pose2D;

    /// `a * b` is `a.compose(&b)`.
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.compose(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_pose_compose_identity() {
        let p = Pose2D::new(1.0, 2.0, 0.5);
        let result = p.compose(&Pose2D::identity());
        assert_relative_eq!(result.x, p.x);
        assert_relative_eq!(result.y, p.y);
        assert_relative_eq!(result.theta, p.theta);
    }

    #[test]
    fn test_pose_inverse_roundtrip() {
        for p in [
            Pose2D::new(1.0, 2.0, 0.5),
            Pose2D::new(-31.7, 4.2, -2.9),
            Pose2D::new(1.0e4, -2.5e3, PI),
        ] {
            let result = p.compose(&p.inverse());
            assert_relative_eq!(result.x, 0.0, epsilon = 1e-9);
            assert_relative_eq!(result.y, 0.0, epsilon = 1e-9);
            assert_relative_eq!(result.theta, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_compose_is_associative() {
        let a = Pose2D::new(1.0, -2.0, 0.3);
        let b = Pose2D::new(0.5, 4.0, -1.2);
        let c = Pose2D::new(-3.0, 0.25, 2.8);
        let left = (a * b) * c;
        let right = a * (b * c);
        assert!(left.approx_eq(&right, 1e-9, 1e-12));
    }

    #[test]
    fn test_compose_matches_matrix_product() {
        let a = Pose2D::new(2.0, 1.0, FRAC_PI_2);
        let b = Pose2D::new(-1.0, 3.0, 0.7);
        let via_matrix = Pose2D::from_matrix(&(a.to_matrix() * b.to_matrix()));
        assert!(a.compose(&b).approx_eq(&via_matrix, 1e-12, 1e-12));
    }

    #[test]
    fn test_transform_point() {
        let pose = Pose2D::new(1.0, 0.0, FRAC_PI_2);
        let result = pose.transform_point(&Point2D::new(1.0, 0.0));
        assert_relative_eq!(result.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(result.y, 1.0, epsilon = 1e-12);

        let back = pose.inverse_transform_point(&result);
        assert_relative_eq!(back.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(back.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_relative_to() {
        let reference = Pose2D::new(5.0, 0.0, 0.0);
        let p = Pose2D::new(7.0, 1.0, 0.2);
        let rel = p.relative_to(&reference);
        assert_relative_eq!(rel.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(rel.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(rel.theta, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_try_new_rejects_nan_heading() {
        assert!(matches!(
            Pose2D::try_new(0.0, 0.0, f64::NAN),
            Err(Error::InvalidPose { .. })
        ));
        assert!(Pose2D::try_new(1.0, 2.0, 7.0).is_ok());
    }

    #[test]
    fn test_interpolate() {
        let start = Timestamped::new(Pose2D::new(0.0, 0.0, PI - 0.1), 10.0);
        let end = Timestamped::new(Pose2D::new(2.0, 4.0, -PI + 0.1), 12.0);

        let mid = Pose2D::interpolate(&start, &end, 11.0).unwrap();
        assert_relative_eq!(mid.x, 1.0);
        assert_relative_eq!(mid.y, 2.0);
        assert_relative_eq!(mid.theta.abs(), PI, epsilon = 1e-9);

        assert!(Pose2D::interpolate(&start, &end, 9.9).is_none());
        assert!(Pose2D::interpolate(&start, &end, 12.1).is_none());
    }
}
