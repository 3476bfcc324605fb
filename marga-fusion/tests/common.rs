//! Test utilities for path fusion scenarios.
//!
//! Paths, trips and CSV logs shared by the integration tests.

#![allow(dead_code)]

use std::io::Write;

use marga_fusion::core::transform::to_local_frame;
use marga_fusion::{Point2D, PointSequence, Pose2D};
use tempfile::NamedTempFile;

/// Straight path along +x with unit spacing, starting at `x0`.
pub fn straight_path(x0: f64, n: usize) -> PointSequence {
    (0..n).map(|i| Point2D::new(x0 + i as f64, 0.0)).collect()
}

/// Points on a counter-clockwise circle of `radius` centred at `(0, radius)`,
/// starting at arc length `s0` with `spacing` meters between points.
pub fn arc_world(radius: f64, s0: f64, spacing: f64, n: usize) -> PointSequence {
    (0..n)
        .map(|i| {
            let phi = (s0 + i as f64 * spacing) / radius;
            Point2D::new(radius * phi.sin(), radius - radius * phi.cos())
        })
        .collect()
}

/// Pose on the same circle at arc length `s`, heading along the tangent.
pub fn arc_pose(radius: f64, s: f64) -> Pose2D {
    let phi = s / radius;
    Pose2D::new(radius * phi.sin(), radius - radius * phi.cos(), phi)
}

/// Distance from `p` to the circle of [`arc_world`].
pub fn distance_to_arc(radius: f64, p: &Point2D) -> f64 {
    (p.distance(&Point2D::new(0.0, radius)) - radius).abs()
}

/// `world` expressed in the ego frame of `pose`.
pub fn ego(pose: &Pose2D, world: &PointSequence) -> PointSequence {
    to_local_frame(pose, world).unwrap()
}

/// One row of a synthetic path-handler log.
pub struct LogRow {
    pub timestamp: f64,
    pub speed: f64,
    pub pose: Pose2D,
    pub now: Option<Pose2D>,
    pub path: PointSequence,
}

/// Trip driving along +x at `speed` m/s, one planned path every `dt` s.
///
/// Every path is a straight line ahead of its generation pose; every second
/// row also logs the vehicle pose a little further along.
pub fn straight_trip(rows: usize, dt: f64, speed: f64, path_len: usize) -> Vec<LogRow> {
    (0..rows)
        .map(|i| {
            let t = i as f64 * dt;
            let pose = Pose2D::new(speed * t, 0.0, 0.0);
            LogRow {
                timestamp: t,
                speed,
                pose,
                now: (i % 2 == 0).then(|| Pose2D::new(speed * t + 0.1, 0.0, 0.0)),
                path: straight_path(0.0, path_len - i % 3),
            }
        })
        .collect()
}

/// Render rows as a path-handler CSV with NaN-padded path columns.
pub fn path_log_csv(rows: &[LogRow]) -> String {
    let width = rows.iter().map(|r| r.path.len()).max().unwrap_or(0);
    let mut header = vec![
        "data_timestamp_sec".to_string(),
        "current_speed_mps".to_string(),
        "w_car_pose_now_x_".to_string(),
        "w_car_pose_now_y".to_string(),
        "w_car_pose_now_yaw_rad".to_string(),
        "w_car_pose_image_x".to_string(),
        "w_car_pose_image_y".to_string(),
        "w_car_pose_image_yaw_rad".to_string(),
    ];
    header.extend((0..width).map(|i| format!("path_x_{i}")));
    header.extend((0..width).map(|i| format!("path_y_{i}")));

    let mut out = header.join(",");
    out.push('\n');
    for row in rows {
        let mut cells = vec![row.timestamp.to_string(), row.speed.to_string()];
        match row.now {
            Some(now) => cells.extend([now.x, now.y, now.theta].map(|v| v.to_string())),
            None => cells.extend(["", "", ""].map(String::from)),
        }
        cells.extend([row.pose.x, row.pose.y, row.pose.theta].map(|v| v.to_string()));
        for axis in 0..2 {
            for i in 0..width {
                cells.push(match row.path.get(i) {
                    Some(p) if axis == 0 => p.x.to_string(),
                    Some(p) => p.y.to_string(),
                    None => String::new(),
                });
            }
        }
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

/// Write `contents` to a fresh temporary file.
pub fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
