//! Column-oriented trajectory table.

use super::{PathSample, TrajectoryStore};
use crate::core::types::{Pose2D, PointSequence};
use crate::error::{Error, Result};

/// Parallel columns, one entry per row.
///
/// Path coordinates live in two row-major `len × width` blocks padded with
/// NaN; a row's path is stripped of the padding when it is materialized.
#[derive(Debug, Clone, Default)]
pub struct ColumnTable {
    timestamps: Vec<f64>,
    pose_x: Vec<f64>,
    pose_y: Vec<f64>,
    pose_yaw: Vec<f64>,
    speed: Option<Vec<f64>>,
    now_pose: Option<[Vec<f64>; 3]>,
    width: usize,
    path_x: Vec<f64>,
    path_y: Vec<f64>,
}

/// Raw column data for [`ColumnTable::from_columns`].
#[derive(Debug, Clone, Default)]
pub struct Columns {
    /// Generation timestamps (s)
    pub timestamps: Vec<f64>,
    /// Generation pose x (m)
    pub pose_x: Vec<f64>,
    /// Generation pose y (m)
    pub pose_y: Vec<f64>,
    /// Generation pose heading (rad)
    pub pose_yaw: Vec<f64>,
    /// Vehicle speed (m/s)
    pub speed: Option<Vec<f64>>,
    /// Vehicle pose at log time: x, y, heading
    pub now_pose: Option<[Vec<f64>; 3]>,
    /// Path x values, one padded row per sample
    pub path_x: Vec<Vec<f64>>,
    /// Path y values, one padded row per sample
    pub path_y: Vec<Vec<f64>>,
}

impl ColumnTable {
    /// Build from raw columns; ragged path rows are NaN-padded to the widest.
    ///
    /// Fails with [`Error::InvalidArgument`] unless every column has one
    /// entry per timestamp.
    pub fn from_columns(columns: Columns) -> Result<Self> {
        let rows = columns.timestamps.len();
        let mut lengths = vec![
            ("pose_x", columns.pose_x.len()),
            ("pose_y", columns.pose_y.len()),
            ("pose_yaw", columns.pose_yaw.len()),
            ("path_x", columns.path_x.len()),
            ("path_y", columns.path_y.len()),
        ];
        if let Some(speed) = &columns.speed {
            lengths.push(("speed", speed.len()));
        }
        if let Some([x, y, yaw]) = &columns.now_pose {
            lengths.extend([("now_x", x.len()), ("now_y", y.len()), ("now_yaw", yaw.len())]);
        }
        if let Some((name, len)) = lengths.into_iter().find(|&(_, len)| len != rows) {
            return Err(Error::InvalidArgument(format!(
                "column {name} has {len} entries for {rows} timestamps"
            )));
        }
        Ok(Self::from_checked(columns))
    }

    /// Flatten columns already known to have one entry per row.
    fn from_checked(columns: Columns) -> Self {
        let rows = columns.timestamps.len();
        let width = columns
            .path_x
            .iter()
            .chain(&columns.path_y)
            .map(Vec::len)
            .max()
            .unwrap_or(0);

        let pad = |block: &[Vec<f64>]| {
            let mut flat = vec![f64::NAN; rows * width];
            for (r, values) in block.iter().enumerate() {
                flat[r * width..r * width + values.len()].copy_from_slice(values);
            }
            flat
        };

        Self {
            path_x: pad(&columns.path_x),
            path_y: pad(&columns.path_y),
            timestamps: columns.timestamps,
            pose_x: columns.pose_x,
            pose_y: columns.pose_y,
            pose_yaw: columns.pose_yaw,
            speed: columns.speed,
            now_pose: columns.now_pose,
            width,
        }
    }

    /// Build from samples, splitting them into columns.
    pub fn from_samples(samples: &[PathSample]) -> Self {
        let has_speed = !samples.is_empty() && samples.iter().all(|s| s.current_speed.is_some());
        let has_now = !samples.is_empty() && samples.iter().any(|s| s.current_pose.is_some());
        let now_column = |f: fn(&Pose2D) -> f64| {
            samples
                .iter()
                .map(|s| s.current_pose.as_ref().map_or(f64::NAN, f))
                .collect::<Vec<_>>()
        };

        Self::from_checked(Columns {
            timestamps: samples.iter().map(|s| s.generation_timestamp).collect(),
            pose_x: samples.iter().map(|s| s.generation_pose.x).collect(),
            pose_y: samples.iter().map(|s| s.generation_pose.y).collect(),
            pose_yaw: samples.iter().map(|s| s.generation_pose.theta).collect(),
            speed: has_speed.then(|| {
                samples
                    .iter()
                    .map(|s| s.current_speed.unwrap_or(f64::NAN))
                    .collect()
            }),
            now_pose: has_now.then(|| {
                [
                    now_column(|p| p.x),
                    now_column(|p| p.y),
                    now_column(|p| p.theta),
                ]
            }),
            path_x: samples.iter().map(|s| s.path.xs()).collect(),
            path_y: samples.iter().map(|s| s.path.ys()).collect(),
        })
    }

    /// Fixed path width (max points of any row).
    pub fn width(&self) -> usize {
        self.width
    }
}

impl TrajectoryStore for ColumnTable {
    fn len(&self) -> usize {
        self.timestamps.len()
    }

    fn timestamp(&self, index: usize) -> f64 {
        self.timestamps[index]
    }

    fn has_speed(&self) -> bool {
        self.speed.is_some()
    }

    fn sample(&self, index: usize) -> PathSample {
        let span = index * self.width..(index + 1) * self.width;
        let current_pose = self.now_pose.as_ref().and_then(|[x, y, yaw]| {
            let pose = Pose2D {
                x: x[index],
                y: y[index],
                theta: yaw[index],
            };
            pose.is_finite().then(|| Pose2D::new(pose.x, pose.y, pose.theta))
        });

        PathSample {
            generation_timestamp: self.timestamps[index],
            generation_pose: Pose2D::new(
                self.pose_x[index],
                self.pose_y[index],
                self.pose_yaw[index],
            ),
            path: PointSequence::from_xy(&self.path_x[span.clone()], &self.path_y[span]),
            current_speed: self.speed.as_ref().map(|s| s[index]),
            current_pose,
        }
    }
}
