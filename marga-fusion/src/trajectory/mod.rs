//! Timestamp-indexed trajectory store.
//!
//! A trip is a table of [`PathSample`]s keyed by generation timestamp. Two
//! backends implement [`TrajectoryStore`]:
//!
//! - [`RowTable`]: one owned `PathSample` per row
//! - [`ColumnTable`]: parallel columns with paths NaN-padded to a fixed width
//!
//! All lookup logic lives in the trait's provided methods, so both backends
//! answer every query identically; they differ only in how a row is stored
//! and materialized.
//!
//! ```text
//! t ──► nearest_index ──► sample(i) ──► path (ego) ──► transform_points ──► path (world)
//! ```

mod column_table;
mod row_table;
mod sample;

pub use column_table::{ColumnTable, Columns};
pub use row_table::RowTable;
pub use sample::PathSample;

use crate::core::transform::transform_points;
use crate::core::types::{Pose2D, PointSequence};
use crate::error::{Error, Result};

/// Name of the speed column reported by [`Error::MissingField`].
pub const SPEED_FIELD: &str = "current_speed_mps";

/// Read-only, timestamp-indexed access to a trip's path samples.
///
/// Implementations are immutable after construction and may be shared
/// across threads by reference.
pub trait TrajectoryStore: Send + Sync {
    /// Number of rows.
    fn len(&self) -> usize;

    /// True if the table has no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Generation timestamp of row `index`.
    ///
    /// # Panics
    /// If `index >= len()`.
    fn timestamp(&self, index: usize) -> f64;

    /// True if the table carries a speed column.
    fn has_speed(&self) -> bool;

    /// Materialize row `index` with its path stripped of non-finite points.
    ///
    /// # Panics
    /// If `index >= len()`.
    fn sample(&self, index: usize) -> PathSample;

    /// All generation timestamps in row order.
    fn timestamps(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.timestamp(i)).collect()
    }

    /// Row whose timestamp minimizes `|ts - t|`, lowest index on ties.
    ///
    /// Linear scan, so unsorted timestamps are handled (never panics).
    fn nearest_index(&self, timestamp: f64) -> Result<usize> {
        if self.is_empty() {
            return Err(Error::EmptyTable);
        }
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for i in 0..self.len() {
            let dist = (self.timestamp(i) - timestamp).abs();
            if dist < best_dist {
                best = i;
                best_dist = dist;
            }
        }
        Ok(best)
    }

    /// Sample closest in time to `timestamp`.
    ///
    /// Fails with [`Error::NoPathData`] if that row has no finite points.
    fn find_nearest_sample(&self, timestamp: f64) -> Result<PathSample> {
        let index = self.nearest_index(timestamp)?;
        let sample = self.sample(index);
        if sample.path.is_empty() {
            return Err(Error::NoPathData {
                timestamp: sample.generation_timestamp,
            });
        }
        Ok(sample)
    }

    /// Nearest sample's path mapped into the world frame, with its
    /// generation pose.
    fn path_in_world_coordinates(&self, timestamp: f64) -> Result<(PointSequence, Pose2D)> {
        let sample = self.find_nearest_sample(timestamp)?;
        let world = transform_points(&sample.generation_pose, &sample.path)?;
        Ok((world, sample.generation_pose))
    }

    /// Vehicle speed of the sample closest in time to `timestamp`.
    fn speed_at(&self, timestamp: f64) -> Result<f64> {
        let index = self.nearest_index(timestamp)?;
        if !self.has_speed() {
            return Err(Error::MissingField {
                field: SPEED_FIELD.to_string(),
            });
        }
        self.sample(index)
            .current_speed
            .ok_or_else(|| Error::MissingField {
                field: SPEED_FIELD.to_string(),
            })
    }
}
