//! Row-oriented trajectory table.

use super::{PathSample, TrajectoryStore};
use crate::core::types::Pose2D;

/// One owned [`PathSample`] per row.
///
/// Paths are stripped of non-finite points once, at construction.
#[derive(Debug, Clone, Default)]
pub struct RowTable {
    rows: Vec<PathSample>,
    has_speed: bool,
}

impl RowTable {
    /// Build from samples in log order.
    ///
    /// Headings are normalized to [-π, π]. The speed column counts as
    /// present only if every row carries one.
    pub fn new(mut rows: Vec<PathSample>) -> Self {
        for row in &mut rows {
            let pose = row.generation_pose;
            row.generation_pose = Pose2D::new(pose.x, pose.y, pose.theta);
            row.current_pose = row
                .current_pose
                .filter(Pose2D::is_finite)
                .map(|p| Pose2D::new(p.x, p.y, p.theta));
            if row.path.iter().any(|p| !p.is_finite()) {
                row.path = row.path.finite();
            }
        }
        let has_speed = !rows.is_empty() && rows.iter().all(|r| r.current_speed.is_some());
        Self { rows, has_speed }
    }

    /// Borrow the rows.
    pub fn rows(&self) -> &[PathSample] {
        &self.rows
    }
}

impl TrajectoryStore for RowTable {
    fn len(&self) -> usize {
        self.rows.len()
    }

    fn timestamp(&self, index: usize) -> f64 {
        self.rows[index].generation_timestamp
    }

    fn has_speed(&self) -> bool {
        self.has_speed
    }

    fn sample(&self, index: usize) -> PathSample {
        self.rows[index].clone()
    }
}
