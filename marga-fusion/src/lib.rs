//! Marga Fusion - path fusion core for trip-log playback
//!
//! Loads per-trip path logs, answers "which planned path and vehicle pose
//! belong to time T", and fuses each newly planned path with the previously
//! merged one into a single smooth path.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      bin/                           │  ← marga_replay CLI
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   playback/                         │  ← Timeline, snapshots,
//! │                                                     │    trip replay
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌────────────────────────┴────────────────────────────┐
//! │        merger/                     io/              │  ← Path fusion,
//! │  (window, spline, history)  (path log, car poses)   │    CSV ingestion
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                  trajectory/                        │  ← Timestamp-indexed
//! │            (RowTable, ColumnTable)                  │    stores
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │           (types, math, transform)                  │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Frames
//!
//! Every planned path is stored in the ego frame of the pose it was
//! generated at. [`transform_points`] with that pose maps it into the world
//! frame; [`PathMerger::merge`] works in the new path's ego frame.
//!
//! # Example
//!
//! ```
//! use marga_fusion::{PathMerger, PathMergerConfig, Point2D, PointSequence, Pose2D};
//!
//! let mut merger = PathMerger::new(PathMergerConfig::default()).unwrap();
//! let path: PointSequence = (0..20).map(|i| Point2D::new(i as f64, 0.0)).collect();
//!
//! // First path passes through unchanged
//! let first = merger.merge(&path, Some(Pose2D::identity()), None).unwrap();
//! assert_eq!(first, path);
//!
//! // Later paths are fused with the previous one
//! let pose = Pose2D::new(1.0, 0.0, 0.0);
//! let merged = merger.merge(&path, Some(pose), Some(pose)).unwrap();
//! assert!(!merged.is_empty());
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod merger;
pub mod playback;
pub mod trajectory;

pub use config::{Backend, MargaConfig};
pub use core::math;
pub use core::transform::{transform_matrix, transform_points};
pub use core::types::{Point2D, PointSequence, Pose2D, Timestamped};
pub use error::{Error, Result};
pub use io::{CarPoseTrack, PathLog};
pub use merger::{FusionHistory, FusionRecord, PathMerger, PathMergerConfig};
pub use playback::{SignalKind, SignalValue, Timeline, TripReplay, TripSnapshot};
pub use trajectory::{ColumnTable, PathSample, RowTable, TrajectoryStore};
