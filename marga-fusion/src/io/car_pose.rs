//! Car-pose CSV log and time interpolation.
//!
//! The first four columns are read positionally as timestamp (s), x (m),
//! y (m) and heading (degrees); header names are ignored.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use log::{debug, info};

use crate::core::types::{Pose2D, Timestamped};
use crate::error::{Error, Result};

const FIELDS: [&str; 4] = ["timestamp", "x", "y", "yaw_deg"];

/// Time-ordered vehicle poses with one entry per distinct timestamp.
#[derive(Debug, Clone, Default)]
pub struct CarPoseTrack {
    poses: Vec<Timestamped<Pose2D>>,
}

impl CarPoseTrack {
    /// Build from poses in any order.
    ///
    /// Sorts by time and keeps the first pose seen for each timestamp.
    /// Poses with a non-finite timestamp are dropped.
    pub fn from_poses(mut poses: Vec<Timestamped<Pose2D>>) -> Self {
        poses.retain(|p| p.timestamp_s.is_finite());
        poses.sort_by(|a, b| a.timestamp_s.total_cmp(&b.timestamp_s));
        let before = poses.len();
        poses.dedup_by(|later, earlier| later.timestamp_s == earlier.timestamp_s);
        if poses.len() < before {
            debug!("Dropped {} duplicate car pose timestamps", before - poses.len());
        }
        Self { poses }
    }

    /// Load from a CSV file.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let track = Self::from_reader(BufReader::new(File::open(path)?))?;
        info!("Loaded {} car poses from {}", track.len(), path.display());
        Ok(track)
    }

    /// Parse CSV text from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut poses = Vec::new();
        for record in csv.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());
            let mut values = [0.0; 4];
            for (i, value) in values.iter_mut().enumerate() {
                let raw = record.get(i).ok_or_else(|| Error::MissingField {
                    field: FIELDS[i].to_string(),
                })?;
                *value = raw.parse().map_err(|_| Error::Parse {
                    line,
                    column: FIELDS[i].to_string(),
                    value: raw.to_string(),
                })?;
            }
            let [t, x, y, yaw_deg] = values;
            poses.push(Timestamped::new(Pose2D::new(x, y, yaw_deg.to_radians()), t));
        }

        Ok(Self::from_poses(poses))
    }

    /// Number of poses.
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// True if there are no poses.
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Borrow the poses in time order.
    pub fn poses(&self) -> &[Timestamped<Pose2D>] {
        &self.poses
    }

    /// First and last timestamp.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        Some((self.poses.first()?.timestamp_s, self.poses.last()?.timestamp_s))
    }

    /// Vehicle pose at `t`, interpolated between neighbours and held constant
    /// outside the recorded range.
    pub fn pose_at(&self, t: f64) -> Result<Pose2D> {
        let (first, last) = match (self.poses.first(), self.poses.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(Error::EmptyTable),
        };
        if t.is_nan() || t <= first.timestamp_s {
            return Ok(first.data);
        }
        if t >= last.timestamp_s {
            return Ok(last.data);
        }

        let upper = self.poses.partition_point(|p| p.timestamp_s <= t);
        let (start, end) = (&self.poses[upper - 1], &self.poses[upper]);
        Ok(Pose2D::interpolate(start, end, t).unwrap_or(start.data))
    }
}
