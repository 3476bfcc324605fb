//! Headless playback over a loaded trip.
//!
//! - [`Timeline`]: clamped cursor with seek, step and play semantics
//! - [`TripSnapshot`]: typed signals at one cursor time
//! - [`TripReplay`]: runs a [`PathMerger`](crate::merger::PathMerger) across a trip

mod replay;
mod snapshot;
mod timeline;

pub use replay::{MergedFrame, ReplaySummary, TripReplay};
pub use snapshot::{SignalKind, SignalValue, TripSnapshot, current_pose};
pub use timeline::{DEFAULT_STEP_S, Timeline};
