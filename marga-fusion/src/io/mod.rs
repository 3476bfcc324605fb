//! Trip log ingestion.
//!
//! - [`PathLog`]: path-handler CSV (planned paths with generation poses)
//! - [`CarPoseTrack`]: car-pose CSV with time interpolation

mod car_pose;
mod path_log;

pub use car_pose::CarPoseTrack;
pub use path_log::{
    CURRENT_POSE_COLUMNS, GENERATION_POSE_COLUMNS, PathLog, SPEED_COLUMN, TIMESTAMP_COLUMN,
};
