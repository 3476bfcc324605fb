//! Configuration loading for trip replay

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::merger::PathMergerConfig;

/// Main configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MargaConfig {
    #[serde(default)]
    pub input: InputConfig,
    /// Merger tuning, passed to `PathMerger::new`
    #[serde(default)]
    pub merger: PathMergerConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
}

/// Trajectory store backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// One owned sample per row
    #[default]
    Rows,
    /// Parallel NaN-padded columns
    Columns,
}

/// Trip input files, relative to a trip directory
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputConfig {
    /// Path-handler log file name (default: path_handler.csv)
    #[serde(default = "default_path_log")]
    pub path_log: String,

    /// Car-pose log file name; skipped when absent (default: car_pose.csv)
    #[serde(default = "default_car_pose_log")]
    pub car_pose_log: String,

    /// Store backend (default: rows)
    #[serde(default)]
    pub backend: Backend,
}

/// Replay settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Timeline step in seconds; 0 merges every sample (default: 0)
    #[serde(default)]
    pub step_s: f64,

    /// History file written into each trip directory (default: fusion_history.json)
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path_log: default_path_log(),
            car_pose_log: default_car_pose_log(),
            backend: Backend::default(),
        }
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            step_s: 0.0,
            output: default_output(),
        }
    }
}

fn default_path_log() -> String {
    "path_handler.csv".to_string()
}
fn default_car_pose_log() -> String {
    "car_pose.csv".to_string()
}
fn default_output() -> String {
    "fusion_history.json".to_string()
}

impl MargaConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MargaConfig = toml::from_str(&content)?;
        config.merger.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Path-handler log inside `trip_dir`
    pub fn path_log_in(&self, trip_dir: &Path) -> PathBuf {
        trip_dir.join(&self.input.path_log)
    }

    /// Car-pose log inside `trip_dir`
    pub fn car_pose_log_in(&self, trip_dir: &Path) -> PathBuf {
        trip_dir.join(&self.input.car_pose_log)
    }

    /// History output inside `trip_dir`
    pub fn output_in(&self, trip_dir: &Path) -> PathBuf {
        trip_dir.join(&self.replay.output)
    }
}
