//! Debug history of merges.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::{Pose2D, PointSequence};
use crate::error::Result;

/// Snapshot of one merge, in world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionRecord {
    /// Merged path mapped into the world frame
    pub merged_path_world: PointSequence,
    /// Generation pose of the new path
    pub generation_pose_world: Pose2D,
    /// Vehicle pose the merge was anchored on
    pub current_pose_world: Pose2D,
    /// i0: previous-path point closest to the vehicle
    pub window_start_idx_prev: usize,
    /// i1: join index on the previous path
    pub window_end_idx_prev: usize,
    /// i12: join index on the new path
    pub window_overlap_idx: usize,
    /// i2: start of full weight on the new path
    pub window_start_idx_new: usize,
    /// Whether the join met the overlap tolerance
    pub overlap_found: bool,
}

/// Ordered list of [`FusionRecord`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FusionHistory {
    records: Vec<FusionRecord>,
}

impl FusionHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn push(&mut self, record: FusionRecord) {
        self.records.push(record);
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&FusionRecord> {
        self.records.last()
    }

    /// Iterate in merge order.
    pub fn iter(&self) -> std::slice::Iter<'_, FusionRecord> {
        self.records.iter()
    }

    /// Borrow all records.
    pub fn records(&self) -> &[FusionRecord] {
        &self.records
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write as JSON to `path`.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a history written by [`write_json`](Self::write_json).
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl<'a> IntoIterator for &'a FusionHistory {
    type Item = &'a FusionRecord;
    type IntoIter = std::slice::Iter<'a, FusionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
