//! Path-handler CSV log.
//!
//! One row per planned path. Fixed columns carry the generation pose and
//! vehicle state; the path itself is spread over `path_x_*` / `path_y_*`
//! columns whose trailing cells are empty when a path is shorter than the
//! widest one in the file.
//!
//! ```text
//! data_timestamp_sec, current_speed_mps, ..., w_car_pose_image_x, w_car_pose_image_y,
//! w_car_pose_image_yaw_rad, ..., path_x_0, path_x_1, ..., path_y_0, path_y_1, ...
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::info;

use crate::core::types::{Pose2D, PointSequence};
use crate::error::{Error, Result};
use crate::trajectory::{ColumnTable, Columns, PathSample, RowTable};

/// Generation timestamp column.
pub const TIMESTAMP_COLUMN: &str = "data_timestamp_sec";
/// Vehicle speed column (optional).
pub const SPEED_COLUMN: &str = "current_speed_mps";
/// Generation pose columns: x, y, heading (rad).
pub const GENERATION_POSE_COLUMNS: [&str; 3] = [
    "w_car_pose_image_x",
    "w_car_pose_image_y",
    "w_car_pose_image_yaw_rad",
];
/// Vehicle pose at log time: x, y, heading (rad). Optional.
pub const CURRENT_POSE_COLUMNS: [&str; 3] = [
    "w_car_pose_now_x",
    "w_car_pose_now_y",
    "w_car_pose_now_yaw_rad",
];

const PATH_X_PREFIX: &str = "path_x_";
const PATH_Y_PREFIX: &str = "path_y_";

/// Parsed path-handler log, held as columns.
#[derive(Debug, Clone, Default)]
pub struct PathLog {
    columns: Columns,
}

impl PathLog {
    /// Load from a CSV file.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let log = Self::from_reader(BufReader::new(File::open(path)?))?;
        info!("Loaded {} path samples from {}", log.len(), path.display());
        Ok(log)
    }

    /// Parse CSV text from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        let headers = csv.headers()?.clone();
        let layout = Layout::from_headers(&headers)?;

        let mut columns = Columns {
            speed: layout.speed.map(|_| Vec::new()),
            now_pose: layout.now_pose.map(|_| [Vec::new(), Vec::new(), Vec::new()]),
            ..Default::default()
        };

        for record in csv.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());
            let cell = |index: usize| parse_cell(&record, index, &headers, line);

            columns.timestamps.push(cell(layout.timestamp)?);
            columns.pose_x.push(cell(layout.pose[0])?);
            columns.pose_y.push(cell(layout.pose[1])?);
            columns.pose_yaw.push(cell(layout.pose[2])?);
            if let (Some(index), Some(speed)) = (layout.speed, columns.speed.as_mut()) {
                speed.push(cell(index)?);
            }
            if let (Some(indices), Some(now)) = (layout.now_pose, columns.now_pose.as_mut()) {
                for (column, index) in now.iter_mut().zip(indices) {
                    column.push(cell(index)?);
                }
            }
            columns.path_x.push(
                layout
                    .path_x
                    .iter()
                    .map(|&i| cell(i))
                    .collect::<Result<_>>()?,
            );
            columns.path_y.push(
                layout
                    .path_y
                    .iter()
                    .map(|&i| cell(i))
                    .collect::<Result<_>>()?,
            );
        }

        Ok(Self { columns })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.timestamps.len()
    }

    /// True if the log has no rows.
    pub fn is_empty(&self) -> bool {
        self.columns.timestamps.is_empty()
    }

    /// Raw columns.
    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Materialize one [`PathSample`] per row.
    pub fn into_row_table(self) -> RowTable {
        let c = &self.columns;
        let rows = (0..self.len())
            .map(|i| PathSample {
                generation_timestamp: c.timestamps[i],
                generation_pose: Pose2D::new(c.pose_x[i], c.pose_y[i], c.pose_yaw[i]),
                path: PointSequence::from_xy(&c.path_x[i], &c.path_y[i]),
                current_speed: c.speed.as_ref().map(|s| s[i]),
                current_pose: c.now_pose.as_ref().and_then(|[x, y, yaw]| {
                    Pose2D::try_new(x[i], y[i], yaw[i]).ok()
                }),
            })
            .collect();
        RowTable::new(rows)
    }

    /// Keep the columnar layout.
    pub fn into_column_table(self) -> Result<ColumnTable> {
        ColumnTable::from_columns(self.columns)
    }
}

/// Column indices resolved from the header.
struct Layout {
    timestamp: usize,
    pose: [usize; 3],
    speed: Option<usize>,
    now_pose: Option<[usize; 3]>,
    path_x: Vec<usize>,
    path_y: Vec<usize>,
}

impl Layout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        // Some loggers emit the x column with a trailing underscore
        let find_now = |name: &str| find(name).or_else(|| find(&format!("{name}_")));
        let require = |name: &str| {
            find(name).ok_or_else(|| Error::MissingField {
                field: name.to_string(),
            })
        };

        let pose = [
            require(GENERATION_POSE_COLUMNS[0])?,
            require(GENERATION_POSE_COLUMNS[1])?,
            require(GENERATION_POSE_COLUMNS[2])?,
        ];
        let now_pose = match CURRENT_POSE_COLUMNS.map(find_now) {
            [Some(x), Some(y), Some(yaw)] => Some([x, y, yaw]),
            _ => None,
        };

        let path_x = path_columns(headers, PATH_X_PREFIX);
        let path_y = path_columns(headers, PATH_Y_PREFIX);
        if path_x.len() != path_y.len() {
            return Err(Error::Parse {
                line: 1,
                column: "path_x_* / path_y_*".to_string(),
                value: format!("{} x columns vs {} y columns", path_x.len(), path_y.len()),
            });
        }

        Ok(Self {
            timestamp: require(TIMESTAMP_COLUMN)?,
            pose,
            speed: find(SPEED_COLUMN),
            now_pose,
            path_x,
            path_y,
        })
    }
}

/// Indices of `prefix<N>` columns ordered by `N`.
fn path_columns(headers: &StringRecord, prefix: &str) -> Vec<usize> {
    let mut found: Vec<(usize, usize)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| {
            h.strip_prefix(prefix)
                .and_then(|n| n.parse::<usize>().ok())
                .map(|n| (n, i))
        })
        .collect();
    found.sort_unstable();
    found.into_iter().map(|(_, i)| i).collect()
}

/// Parse one cell; missing, empty and NaN-like cells become NaN.
fn parse_cell(record: &StringRecord, index: usize, headers: &StringRecord, line: u64) -> Result<f64> {
    let raw = record.get(index).unwrap_or("").trim();
    if raw.is_empty() || matches!(raw, "nan" | "NaN" | "NAN" | "None" | "null") {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| Error::Parse {
        line,
        column: headers.get(index).unwrap_or("").to_string(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::TrajectoryStore;
    use approx::assert_relative_eq;

    const LOG: &str = "\
data_timestamp_sec , current_speed_mps, w_car_pose_now_x_, w_car_pose_now_y, w_car_pose_now_yaw_rad, w_car_pose_image_x, w_car_pose_image_y, w_car_pose_image_yaw_rad, path_x_0, path_x_1, path_x_2, path_y_0, path_y_1, path_y_2
0.0, 1.5, 0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 0.0, 0.0, 0.0
0.1, 1.6, 0.2, 0.0, 0.0, 0.1, 0.0, 0.0, 0.0, 1.0, , 0.0, 0.0,
0.2, 1.7, , , , 0.2, 0.0, 0.0, 5.0
";

    #[test]
    fn test_parse_columns() {
        let log = PathLog::from_reader(LOG.as_bytes()).unwrap();
        assert_eq!(log.len(), 3);
        let c = log.columns();
        assert_eq!(c.timestamps, vec![0.0, 0.1, 0.2]);
        assert_eq!(c.speed.as_ref().unwrap()[2], 1.7);
        assert!(c.now_pose.is_some());
        assert_eq!(c.path_x[0], vec![0.0, 1.0, 2.0]);
        assert!(c.path_x[1][2].is_nan());
        // Short row padded with NaN
        assert_eq!(c.path_x[2][0], 5.0);
        assert!(c.path_y[2].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_into_tables() {
        let rows = PathLog::from_reader(LOG.as_bytes()).unwrap().into_row_table();
        let cols = PathLog::from_reader(LOG.as_bytes())
            .unwrap()
            .into_column_table()
            .unwrap();

        for table in [&rows as &dyn TrajectoryStore, &cols] {
            let sample = table.find_nearest_sample(0.09).unwrap();
            assert_eq!(sample.path.len(), 2);
            assert_relative_eq!(sample.generation_pose.x, 0.1);
            assert_relative_eq!(sample.current_speed.unwrap(), 1.6);
            assert_relative_eq!(sample.current_pose.unwrap().x, 0.2);

            let last = table.sample(2);
            assert!(last.current_pose.is_none());
            assert!(matches!(
                table.find_nearest_sample(0.2),
                Err(Error::NoPathData { .. })
            ));
        }
    }

    #[test]
    fn test_missing_required_column() {
        let text = "data_timestamp_sec,w_car_pose_image_x,w_car_pose_image_y\n0,0,0\n";
        assert!(matches!(
            PathLog::from_reader(text.as_bytes()),
            Err(Error::MissingField { field }) if field == "w_car_pose_image_yaw_rad"
        ));
    }

    #[test]
    fn test_bad_number_reports_location() {
        let text = "\
data_timestamp_sec,w_car_pose_image_x,w_car_pose_image_y,w_car_pose_image_yaw_rad,path_x_0,path_y_0
0,0,0,0,1,1
0.1,abc,0,0,1,1
";
        match PathLog::from_reader(text.as_bytes()) {
            Err(Error::Parse {
                line,
                column,
                value,
            }) => {
                assert_eq!(line, 3);
                assert_eq!(column, "w_car_pose_image_x");
                assert_eq!(value, "abc");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_path_columns_ordered_numerically() {
        let text = "\
data_timestamp_sec,w_car_pose_image_x,w_car_pose_image_y,w_car_pose_image_yaw_rad,path_x_10,path_x_2,path_y_2,path_y_10
0,0,0,0,10,2,-2,-10
";
        let log = PathLog::from_reader(text.as_bytes()).unwrap();
        assert_eq!(log.columns().path_x[0], vec![2.0, 10.0]);
        assert_eq!(log.columns().path_y[0], vec![-2.0, -10.0]);
        assert!(log.columns().speed.is_none());
    }
}
