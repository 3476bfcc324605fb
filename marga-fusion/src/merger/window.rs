//! Join window between the previous merged path and a new path.
//!
//! Both paths are expressed in the new path's ego frame.
//!
//! ```text
//! previous:  0 ........ i0 ──delay──► i1 ·········· (dropped)
//!                                      │ overlap
//! new:                          0 .... i12 ═ramp═► i2 ──────────► end
//!
//! fit input = previous[i1-N2 .. i1] ++ new[i12 ..]
//! ```

use log::debug;

use super::config::PathMergerConfig;
use super::spline::{FitInput, HeadingAnchor};
use crate::core::types::{Point2D, PointSequence};

/// Points closer than this are merged before fitting.
const DUPLICATE_EPSILON: f64 = 1e-9;

/// Index markers of one merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeWindow {
    /// Previous-path point closest to the vehicle
    pub i0: usize,
    /// First previous-path point not kept (join on the previous path)
    pub i1: usize,
    /// New-path point the join lands on
    pub i12: usize,
    /// New-path point from which the new path has full weight
    pub i2: usize,
    /// Whether the join met the overlap tolerance
    pub overlap_found: bool,
}

/// Locate the join between `previous` and `new`.
///
/// `vehicle` is the current vehicle position in the new ego frame. Both
/// sequences must be non-empty.
pub fn select_window(
    previous: &PointSequence,
    new: &PointSequence,
    vehicle: &Point2D,
    config: &PathMergerConfig,
) -> MergeWindow {
    let len_prev = previous.len();
    let len_new = new.len();
    let last_prev = len_prev.saturating_sub(2);

    let i0 = previous.nearest_index(vehicle).unwrap_or(0).min(last_prev);
    let candidate = i0.saturating_add(config.delay_offset()).min(last_prev);

    let closest_on_new = |i: usize| {
        let p = previous.points()[i];
        let j = new.nearest_index(&p).unwrap_or(0);
        (j, p.distance(&new.points()[j]))
    };

    // Outward scan from the delay-compensated candidate
    let mut found = None;
    for step in 0..=config.blend_length {
        let forward = candidate.saturating_add(step);
        let backward = candidate.checked_sub(step).filter(|_| step > 0);
        for i in [Some(forward).filter(|&i| i <= last_prev), backward]
            .into_iter()
            .flatten()
        {
            let (j, dist) = closest_on_new(i);
            if dist <= config.overlap_tolerance {
                found = Some((i, j));
                break;
            }
        }
        if found.is_some() || (forward >= last_prev && step >= candidate) {
            break;
        }
    }

    let (i1, i12, overlap_found) = match found {
        Some((i1, i12)) => (i1, i12, true),
        None => {
            let (i12, dist) = closest_on_new(candidate);
            debug!(
                "No overlap within {:.2} m (closest {:.2} m), joining end to end at prev[{}] -> new[{}]",
                config.overlap_tolerance, dist, candidate, i12
            );
            (candidate, i12, false)
        }
    };

    MergeWindow {
        i0,
        i1,
        i12,
        i2: i12.saturating_add(config.blend_length).min(len_new.saturating_sub(1)),
        overlap_found,
    }
}

/// Build the weighted fit input for `window`.
///
/// Previous points decay as `exp(-w · k / N2)` with distance `k` from the
/// join; new points ramp in as `((j - i12) / (i2 - i12))^w` and have full
/// weight from `i2` on. The heading anchor sits on `new[i2]`.
pub fn assemble(
    previous: &PointSequence,
    new: &PointSequence,
    window: &MergeWindow,
    config: &PathMergerConfig,
) -> FitInput {
    let n2 = config.blend_length.max(1) as f64;
    let w = config.decay;
    let prev_start = window.i1.saturating_sub(config.blend_length);

    let mut points = Vec::with_capacity(window.i1 - prev_start + new.len() - window.i12);
    let mut weights = Vec::with_capacity(points.capacity());

    for j in prev_start..window.i1 {
        points.push(previous.points()[j]);
        weights.push((-w * (window.i1 - 1 - j) as f64 / n2).exp());
    }

    let ramp = (window.i2 - window.i12) as f64;
    for j in window.i12..new.len() {
        points.push(new.points()[j]);
        weights.push(if j < window.i2 {
            ((j - window.i12) as f64 / ramp).powf(w)
        } else {
            1.0
        });
    }

    let anchor_raw = (window.i1 - prev_start) + (window.i2 - window.i12);
    let heading = new.heading_at(window.i2);

    // Drop non-finite and repeated points, remapping the anchor
    let mut kept = PointSequence::with_capacity(points.len());
    let mut kept_weights: Vec<f64> = Vec::with_capacity(points.len());
    let mut anchor_index = None;
    for (raw, (p, wt)) in points.into_iter().zip(weights).enumerate() {
        if p.is_finite() {
            match kept.last() {
                Some(last) if last.distance(&p) <= DUPLICATE_EPSILON => {
                    if let Some(prev_wt) = kept_weights.last_mut() {
                        *prev_wt = prev_wt.max(wt);
                    }
                }
                _ => {
                    kept.push(p);
                    kept_weights.push(wt);
                }
            }
        }
        if raw == anchor_raw {
            anchor_index = kept.len().checked_sub(1);
        }
    }

    FitInput {
        points: kept,
        weights: kept_weights,
        anchor: anchor_index
            .zip(heading)
            .map(|(index, heading)| HeadingAnchor { index, heading }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line(from: f64, n: usize, y: f64) -> PointSequence {
        (0..n).map(|i| Point2D::new(from + i as f64, y)).collect()
    }

    #[test]
    fn test_window_on_collinear_paths() {
        let previous = line(-5.0, 10, 0.0);
        let new = line(0.0, 10, 0.0);
        let config = PathMergerConfig::default();

        let window = select_window(&previous, &new, &Point2D::new(0.0, 0.0), &config);
        assert_eq!(
            window,
            MergeWindow {
                i0: 5,
                i1: 7,
                i12: 2,
                i2: 9,
                overlap_found: true
            }
        );
    }

    #[test]
    fn test_huge_delay_offset_clamps_to_path_end() {
        let previous = line(-5.0, 10, 0.0);
        let new = line(0.0, 10, 0.0);
        let config = PathMergerConfig {
            nominal_speed_mps: 1e300,
            ..Default::default()
        };
        assert_eq!(config.delay_offset(), usize::MAX);

        let window = select_window(&previous, &new, &Point2D::new(0.0, 0.0), &config);
        assert_eq!(window.i1, 8);
        assert_eq!(window.i12, 3);
        assert!(window.overlap_found);
    }

    #[test]
    fn test_window_scans_outward_for_overlap() {
        // New path only starts level with previous[6]
        let previous = line(-5.0, 12, 0.0);
        let new = line(4.0, 10, 0.0);
        let config = PathMergerConfig {
            delay_ms: 0.0,
            ..Default::default()
        };

        let window = select_window(&previous, &new, &Point2D::new(0.0, 0.0), &config);
        assert!(window.overlap_found);
        assert_eq!(window.i0, 5);
        assert_eq!(window.i1, 9);
        assert_eq!(window.i12, 0);
    }

    #[test]
    fn test_window_without_overlap_falls_back() {
        let previous = line(-5.0, 10, -10.0);
        let new = line(0.0, 10, 0.0);
        let config = PathMergerConfig::default();

        let window = select_window(&previous, &new, &Point2D::new(0.0, 0.0), &config);
        assert!(!window.overlap_found);
        assert_eq!(window.i1, 7);
        assert_eq!(window.i12, 2);
    }

    #[test]
    fn test_assemble_weights_and_anchor() {
        let previous = line(-5.0, 10, 0.0);
        let new = line(0.0, 10, 0.0);
        let config = PathMergerConfig::default().with_blend_length(4);
        let window = MergeWindow {
            i0: 5,
            i1: 7,
            i12: 2,
            i2: 6,
            overlap_found: true,
        };

        let input = assemble(&previous, &new, &window, &config);
        // previous[3..7] then new[2..10]
        assert_eq!(input.points.len(), 12);
        assert_relative_eq!(input.points.points()[0].x, -2.0);
        assert_relative_eq!(input.points.points()[4].x, 2.0);

        assert_relative_eq!(input.weights[3], 1.0);
        assert_relative_eq!(input.weights[0], (-3.0_f64 * 3.0 / 4.0).exp());
        assert_relative_eq!(input.weights[4], 0.0);
        assert_relative_eq!(input.weights[6], 0.125);
        assert_relative_eq!(input.weights[8], 1.0);

        let anchor = input.anchor.unwrap();
        assert_eq!(anchor.index, 8);
        assert_relative_eq!(anchor.heading, 0.0);
    }

    #[test]
    fn test_assemble_drops_duplicates() {
        let previous = line(-5.0, 10, 0.0);
        let new = line(1.0, 10, 0.0);
        let config = PathMergerConfig::default();
        // previous[6] is (1, 0), same as new[0]
        let window = MergeWindow {
            i0: 5,
            i1: 7,
            i12: 0,
            i2: 9,
            overlap_found: true,
        };

        let input = assemble(&previous, &new, &window, &config);
        assert_eq!(input.points.len(), 16);
        assert_eq!(input.weights.len(), 16);
        assert_eq!(input.anchor.unwrap().index, 15);
    }
}
