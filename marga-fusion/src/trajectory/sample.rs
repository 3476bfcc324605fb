//! One row of a trip's path log.

use serde::{Deserialize, Serialize};

use crate::core::types::{Pose2D, PointSequence};

/// Planned path captured at one instant, in the ego frame of its
/// generation pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSample {
    /// Log time the path was generated (seconds)
    pub generation_timestamp: f64,
    /// World pose of the vehicle when the path was generated
    pub generation_pose: Pose2D,
    /// Path points in the generation pose's ego frame (finite only)
    pub path: PointSequence,
    /// Vehicle speed in m/s, when the log records it
    pub current_speed: Option<f64>,
    /// World pose of the vehicle at the time the row was written
    pub current_pose: Option<Pose2D>,
}

impl PathSample {
    /// Sample with only the required fields.
    pub fn new(generation_timestamp: f64, generation_pose: Pose2D, path: PointSequence) -> Self {
        Self {
            generation_timestamp,
            generation_pose,
            path,
            current_speed: None,
            current_pose: None,
        }
    }

    /// Attach a speed.
    pub fn with_speed(mut self, speed_mps: f64) -> Self {
        self.current_speed = Some(speed_mps);
        self
    }

    /// Attach the vehicle's pose at log time.
    pub fn with_current_pose(mut self, pose: Pose2D) -> Self {
        self.current_pose = Some(pose);
        self
    }
}
