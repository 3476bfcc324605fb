//! Offline replay of a whole trip through a [`PathMerger`].

use log::{debug, info, warn};
use serde::Serialize;

use super::snapshot::current_pose;
use super::timeline::Timeline;
use crate::core::transform::transform_points;
use crate::core::types::{Pose2D, PointSequence};
use crate::error::{Error, Result};
use crate::io::CarPoseTrack;
use crate::merger::PathMerger;
use crate::trajectory::TrajectoryStore;

/// One successful merge during a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedFrame {
    /// Generation time of the sample that was merged
    pub timestamp: f64,
    /// Its generation pose
    pub generation_pose: Pose2D,
    /// Merged path in world coordinates
    pub merged_world: PointSequence,
}

/// Outcome of a replay.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplaySummary {
    /// Samples offered to the merger
    pub attempted: usize,
    /// Samples skipped because the merge failed
    pub skipped: usize,
    /// Successful merges in order
    pub frames: Vec<MergedFrame>,
}

impl ReplaySummary {
    /// Number of successful merges.
    pub fn merged(&self) -> usize {
        self.frames.len()
    }
}

/// Drives a merger over the samples of one trip.
///
/// The vehicle pose for each sample is the pose logged with the row, else
/// the car-pose track at the sample time, else the generation pose.
/// Failed merges are logged and skipped; the replay carries on with the
/// merger's previous state.
pub struct TripReplay<'a> {
    store: &'a dyn TrajectoryStore,
    car_track: Option<&'a CarPoseTrack>,
}

impl<'a> TripReplay<'a> {
    /// Replay over `store`.
    pub fn new(store: &'a dyn TrajectoryStore) -> Self {
        Self {
            store,
            car_track: None,
        }
    }

    /// Resolve vehicle poses from `track` when rows lack one.
    pub fn with_car_track(mut self, track: &'a CarPoseTrack) -> Self {
        self.car_track = Some(track);
        self
    }

    /// Timeline spanning the finite sample timestamps.
    pub fn timeline(&self) -> Result<Timeline> {
        let (min, max) = self
            .store
            .timestamps()
            .into_iter()
            .filter(|t| t.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| {
                (lo.min(t), hi.max(t))
            });
        Timeline::new(min, max)
    }

    /// Merge every sample in timestamp order.
    pub fn run(&self, merger: &mut PathMerger) -> Result<ReplaySummary> {
        if self.store.is_empty() {
            return Err(Error::EmptyTable);
        }

        let mut order: Vec<usize> = (0..self.store.len()).collect();
        order.sort_by(|&a, &b| self.store.timestamp(a).total_cmp(&self.store.timestamp(b)));

        let mut summary = ReplaySummary::default();
        for index in order {
            self.step(merger, index, &mut summary);
        }
        self.report(&summary);
        Ok(summary)
    }

    /// Replay with the configured step: `0` merges every sample through
    /// [`run`](Self::run), a positive step walks a timeline over the trip.
    ///
    /// A trip whose samples all share one timestamp has no timeline to walk
    /// and is merged sample by sample instead.
    pub fn run_with_step(&self, merger: &mut PathMerger, step_s: f64) -> Result<ReplaySummary> {
        if !(step_s.is_finite() && step_s >= 0.0) {
            return Err(Error::InvalidArgument(format!(
                "replay step must be >= 0, got {step_s}"
            )));
        }
        if step_s == 0.0 {
            return self.run(merger);
        }
        if self.store.is_empty() {
            return Err(Error::EmptyTable);
        }
        match self.timeline() {
            Ok(mut timeline) => self.run_timeline(merger, &mut timeline, step_s),
            Err(Error::InvalidArgument(reason)) => {
                debug!("No timeline for this trip ({reason}), merging every sample");
                self.run(merger)
            }
            Err(e) => Err(e),
        }
    }

    /// Walk `timeline` from its start in steps of `step_s`, merging each
    /// sample the cursor lands on once.
    pub fn run_timeline(
        &self,
        merger: &mut PathMerger,
        timeline: &mut Timeline,
        step_s: f64,
    ) -> Result<ReplaySummary> {
        if !(step_s.is_finite() && step_s > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "replay step must be > 0, got {step_s}"
            )));
        }

        let mut summary = ReplaySummary::default();
        let mut last_index = None;
        timeline.seek(timeline.min());
        loop {
            let index = self.store.nearest_index(timeline.current())?;
            if last_index != Some(index) {
                self.step(merger, index, &mut summary);
                last_index = Some(index);
            }
            if timeline.at_end() {
                break;
            }
            timeline.step_forward(step_s);
        }
        self.report(&summary);
        Ok(summary)
    }

    fn step(&self, merger: &mut PathMerger, index: usize, summary: &mut ReplaySummary) {
        summary.attempted += 1;
        match self.merge_sample(merger, index) {
            Ok(frame) => summary.frames.push(frame),
            Err(e) => {
                summary.skipped += 1;
                warn!(
                    "Skipping sample at t={:.3}s: {}",
                    self.store.timestamp(index),
                    e
                );
            }
        }
    }

    fn merge_sample(&self, merger: &mut PathMerger, index: usize) -> Result<MergedFrame> {
        let sample = self.store.sample(index);
        if sample.path.is_empty() {
            return Err(Error::NoPathData {
                timestamp: sample.generation_timestamp,
            });
        }
        let pose = sample.generation_pose;
        let vehicle = current_pose(&sample, self.car_track, sample.generation_timestamp)
            .unwrap_or(pose);

        let merged = merger.merge(&sample.path, Some(pose), Some(vehicle))?;
        Ok(MergedFrame {
            timestamp: sample.generation_timestamp,
            generation_pose: pose,
            merged_world: transform_points(&pose, &merged)?,
        })
    }

    fn report(&self, summary: &ReplaySummary) {
        info!(
            "Replay finished: {} merged, {} skipped of {} samples",
            summary.merged(),
            summary.skipped,
            summary.attempted
        );
    }
}
