//! Path fusion.
//!
//! Each planned path arrives in the ego frame of the pose it was generated
//! at. [`PathMerger`] keeps the last merged path and, for every new one:
//!
//! 1. maps the previous path into the new ego frame,
//! 2. finds the join window (delay-compensated, overlap-checked),
//! 3. weights previous and new points around the join,
//! 4. fits a smoothing B-spline with a heading constraint,
//! 5. resamples it at the new path's spacing.
//!
//! Set [`PathMergerConfig::debug`] to keep a [`FusionHistory`] of every merge.

mod config;
mod history;
mod path_merger;
pub mod spline;
pub mod window;

pub use config::PathMergerConfig;
pub use history::{FusionHistory, FusionRecord};
pub use path_merger::{PathMerger, PreviousPath};
pub use window::MergeWindow;
