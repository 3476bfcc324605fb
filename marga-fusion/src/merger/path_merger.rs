//! Stateful fusion of successive planned paths.

use log::{debug, info};

use super::config::PathMergerConfig;
use super::history::{FusionHistory, FusionRecord};
use super::spline::{self, FitParams};
use super::window::{self, MergeWindow};
use crate::core::transform::transform_points;
use crate::core::types::{Pose2D, PointSequence};
use crate::error::{Error, Result};

/// Spacing below which a path counts as collapsed to one point.
const MIN_SPACING: f64 = 1e-9;

/// Last merged path, kept in the ego frame of its generation pose.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviousPath {
    /// Points in the ego frame of `pose`
    pub path: PointSequence,
    /// World pose the path is expressed relative to
    pub pose: Pose2D,
}

/// Reconciles each new planned path with the previously merged one.
///
/// ```text
///            first merge                 every later merge
/// UNINITIALIZED ──────────► READY ─────────────────────────► READY
///               (passthrough)       (window, weights, fit)
/// ```
///
/// One instance per independent stream; `merge` takes `&mut self`.
#[derive(Debug, Clone)]
pub struct PathMerger {
    config: PathMergerConfig,
    previous: Option<PreviousPath>,
    history: FusionHistory,
}

impl PathMerger {
    /// Create a merger after validating `config`.
    pub fn new(config: PathMergerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            previous: None,
            history: FusionHistory::new(),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &PathMergerConfig {
        &self.config
    }

    /// True once a first path has been accepted.
    pub fn is_ready(&self) -> bool {
        self.previous.is_some()
    }

    /// Last merged path and its generation pose.
    pub fn previous(&self) -> Option<&PreviousPath> {
        self.previous.as_ref()
    }

    /// Debug records (empty unless `config.debug`).
    pub fn history(&self) -> &FusionHistory {
        &self.history
    }

    /// Move the debug records out, leaving the history empty.
    pub fn take_history(&mut self) -> FusionHistory {
        std::mem::take(&mut self.history)
    }

    /// Forget the previous path. History is kept.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Fuse `new_path_ego` (ego frame of `generation_pose`) with the previous
    /// merged path and return the merged path in the same ego frame.
    ///
    /// The first successful call stores the path and returns it unchanged.
    /// `current_pose` is the vehicle's world pose and is required from the
    /// second call on.
    ///
    /// # Errors
    /// - [`Error::MissingPath`] for an empty path
    /// - [`Error::MissingPose`] for a missing generation pose, or a missing
    ///   current pose once ready
    /// - [`Error::InvalidPose`] for a non-finite pose
    /// - [`Error::InsufficientPoints`] for fewer than `spline_degree + 1`
    ///   finite points, in the new path or in the fit input
    pub fn merge(
        &mut self,
        new_path_ego: &PointSequence,
        generation_pose: Option<Pose2D>,
        current_pose: Option<Pose2D>,
    ) -> Result<PointSequence> {
        if new_path_ego.is_empty() {
            return Err(Error::MissingPath);
        }
        let generation_pose = generation_pose.ok_or(Error::MissingPose {
            which: "generation",
        })?;
        if self.previous.is_some() && current_pose.is_none() {
            return Err(Error::MissingPose { which: "current" });
        }
        generation_pose.validate()?;
        if let Some(pose) = &current_pose {
            pose.validate()?;
        }

        let new_path = new_path_ego.finite();
        let required = self.config.min_points();
        if new_path.len() < required {
            return Err(Error::InsufficientPoints {
                got: new_path.len(),
                required,
            });
        }

        let (Some(previous), Some(current_pose)) = (&self.previous, current_pose) else {
            info!(
                "Path merger initialized with {} points at ({:.2}, {:.2})",
                new_path.len(),
                generation_pose.x,
                generation_pose.y
            );
            self.previous = Some(PreviousPath {
                path: new_path,
                pose: generation_pose,
            });
            return Ok(new_path_ego.clone());
        };

        // Previous path into the new ego frame
        let relative = previous.pose.inverse().compose(&generation_pose);
        let previous_in_new = transform_points(&relative.inverse(), &previous.path)?;
        let vehicle = current_pose.relative_to(&generation_pose).position();

        let window = window::select_window(&previous_in_new, &new_path, &vehicle, &self.config);
        debug!(
            "Merge window: i0={} i1={} i12={} i2={} overlap={}",
            window.i0, window.i1, window.i12, window.i2, window.overlap_found
        );

        let input = window::assemble(&previous_in_new, &new_path, &window, &self.config);
        let fitted = spline::fit(&input, &self.fit_params())?;

        let spacing = new_path
            .mean_spacing()
            .filter(|s| *s > MIN_SPACING)
            .unwrap_or(self.config.arc_length_step);
        let merged = fitted.resample(spacing);

        if self.config.debug {
            self.record(&merged, generation_pose, current_pose, &window)?;
        }

        self.previous = Some(PreviousPath {
            path: merged.clone(),
            pose: generation_pose,
        });
        Ok(merged)
    }

    fn fit_params(&self) -> FitParams {
        FitParams {
            degree: self.config.spline_degree,
            lambda_1: self.config.lambda_1,
            lambda_2: self.config.lambda_2,
            max_control_points: self.config.max_control_points,
        }
    }

    fn record(
        &mut self,
        merged: &PointSequence,
        generation_pose: Pose2D,
        current_pose: Pose2D,
        window: &MergeWindow,
    ) -> Result<()> {
        self.history.push(FusionRecord {
            merged_path_world: transform_points(&generation_pose, merged)?,
            generation_pose_world: generation_pose,
            current_pose_world: current_pose,
            window_start_idx_prev: window.i0,
            window_end_idx_prev: window.i1,
            window_overlap_idx: window.i12,
            window_start_idx_new: window.i2,
            overlap_found: window.overlap_found,
        });
        Ok(())
    }
}
