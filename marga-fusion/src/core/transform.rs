//! Batch SE(2) transforms of point arrays.
//!
//! ```text
//! p_parent = R(θ) · p_local + t
//!
//! R(θ) = | cos θ  -sin θ |     t = | x |
//!        | sin θ   cos θ |         | y |
//! ```
//!
//! Every function here is pure: inputs are borrowed and a freshly allocated
//! sequence is returned.

use nalgebra::DMatrix;

use crate::core::types::{Point2D, Pose2D, PointSequence};
use crate::error::{Error, Result};

/// Map every point of `points` from `pose`'s local frame to its parent frame.
///
/// Fails with [`Error::InvalidPose`] if the pose has a non-finite component.
pub fn transform_points(pose: &Pose2D, points: &PointSequence) -> Result<PointSequence> {
    pose.validate()?;
    let (sin_t, cos_t) = pose.theta.sin_cos();
    Ok(points
        .iter()
        .map(|p| {
            Point2D::new(
                pose.x + p.x * cos_t - p.y * sin_t,
                pose.y + p.x * sin_t + p.y * cos_t,
            )
        })
        .collect())
}

/// Express parent-frame `points` in `pose`'s local frame.
pub fn to_local_frame(pose: &Pose2D, points: &PointSequence) -> Result<PointSequence> {
    transform_points(&pose.inverse(), points)
}

/// Transform a raw coordinate matrix in either N×2 or 2×N layout.
///
/// Orientation is detected from the shape: N×2 is read row-wise, 2×N
/// column-wise (so a 2×1 input is one point). A 2×2 input is read as N×2.
/// Any other shape fails with [`Error::Shape`].
pub fn transform_matrix(pose: &Pose2D, points: &DMatrix<f64>) -> Result<PointSequence> {
    let seq = matrix_to_sequence(points)?;
    transform_points(pose, &seq)
}

/// Normalize an N×2 or 2×N matrix into a [`PointSequence`].
pub fn matrix_to_sequence(points: &DMatrix<f64>) -> Result<PointSequence> {
    let (rows, cols) = points.shape();
    if cols == 2 && rows > 0 {
        Ok((0..rows)
            .map(|r| Point2D::new(points[(r, 0)], points[(r, 1)]))
            .collect())
    } else if rows == 2 && cols > 0 {
        Ok((0..cols)
            .map(|c| Point2D::new(points[(0, c)], points[(1, c)]))
            .collect())
    } else {
        Err(Error::Shape { rows, cols })
    }
}

/// Pack a sequence into an N×2 matrix.
pub fn sequence_to_matrix(points: &PointSequence) -> DMatrix<f64> {
    DMatrix::from_fn(points.len(), 2, |r, c| {
        let p = points.points()[r];
        if c == 0 { p.x } else { p.y }
    })
}
