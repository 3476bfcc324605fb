//! Everything a viewer draws at one instant.

use serde::Serialize;

use crate::core::transform::transform_points;
use crate::core::types::{Pose2D, PointSequence};
use crate::error::Result;
use crate::io::CarPoseTrack;
use crate::trajectory::{PathSample, TrajectoryStore};

/// Drawable signals of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// Pose the displayed path was generated at
    GenerationPose,
    /// Vehicle pose at the cursor time
    CurrentPose,
    /// Displayed path in world coordinates
    PathWorld,
    /// Vehicle speed (m/s)
    Speed,
}

impl SignalKind {
    /// Every signal kind.
    pub const ALL: [SignalKind; 4] = [
        SignalKind::GenerationPose,
        SignalKind::CurrentPose,
        SignalKind::PathWorld,
        SignalKind::Speed,
    ];
}

/// Typed value of one signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SignalValue {
    /// A pose
    Pose(Pose2D),
    /// A path
    Path(PointSequence),
    /// A scalar
    Scalar(f64),
}

/// Trip state at a cursor time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripSnapshot {
    /// Cursor time that was asked for
    pub timestamp: f64,
    /// Generation time of the sample shown
    pub sample_timestamp: f64,
    /// Generation pose of the sample shown
    pub generation_pose: Pose2D,
    /// The sample's path in world coordinates
    pub path_world: PointSequence,
    /// Vehicle pose at the cursor time, if known
    pub current_pose: Option<Pose2D>,
    /// Vehicle speed, if logged
    pub speed: Option<f64>,
}

impl TripSnapshot {
    /// Resolve the sample nearest to `timestamp` and its world-frame path.
    pub fn at(
        store: &dyn TrajectoryStore,
        car_track: Option<&CarPoseTrack>,
        timestamp: f64,
    ) -> Result<Self> {
        let sample = store.find_nearest_sample(timestamp)?;
        Ok(Self {
            timestamp,
            sample_timestamp: sample.generation_timestamp,
            generation_pose: sample.generation_pose,
            path_world: transform_points(&sample.generation_pose, &sample.path)?,
            current_pose: current_pose(&sample, car_track, timestamp),
            speed: sample.current_speed,
        })
    }

    /// Value of `kind`, if present.
    pub fn signal(&self, kind: SignalKind) -> Option<SignalValue> {
        match kind {
            SignalKind::GenerationPose => Some(SignalValue::Pose(self.generation_pose)),
            SignalKind::CurrentPose => self.current_pose.map(SignalValue::Pose),
            SignalKind::PathWorld => Some(SignalValue::Path(self.path_world.clone())),
            SignalKind::Speed => self.speed.map(SignalValue::Scalar),
        }
    }
}

/// Vehicle pose for `sample` at time `t`: the pose logged with the row,
/// else the car-pose track.
pub fn current_pose(
    sample: &PathSample,
    car_track: Option<&CarPoseTrack>,
    t: f64,
) -> Option<Pose2D> {
    sample
        .current_pose
        .or_else(|| car_track.and_then(|track| track.pose_at(t).ok()))
}
