//! Core data types.

mod point;
mod pose;
mod sequence;
mod timestamped;

pub use point::Point2D;
pub use pose::Pose2D;
pub use sequence::PointSequence;
pub use timestamped::Timestamped;
