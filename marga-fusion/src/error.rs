//! Error types for Marga Fusion

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Marga Fusion error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Pose with a non-finite component
    #[error("Invalid pose: ({x}, {y}, {theta})")]
    InvalidPose {
        /// X position
        x: f64,
        /// Y position
        y: f64,
        /// Heading in radians
        theta: f64,
    },

    /// Point array that is neither N×2 nor 2×N
    #[error("Invalid point array shape: {rows}x{cols} (expected Nx2 or 2xN)")]
    Shape {
        /// Row count of the rejected input
        rows: usize,
        /// Column count of the rejected input
        cols: usize,
    },

    /// Lookup on a table with zero rows
    #[error("Trajectory table is empty")]
    EmptyTable,

    /// Nearest sample has no finite path points
    #[error("No path data for sample at t={timestamp:.3}s")]
    NoPathData {
        /// Generation timestamp of the selected sample
        timestamp: f64,
    },

    /// Required column or field not present
    #[error("Missing field: {field}")]
    MissingField {
        /// Field or column name
        field: String,
    },

    /// Merge called without a path
    #[error("Path merge called without a path")]
    MissingPath,

    /// Merge called without a required pose
    #[error("Path merge called without a {which} pose")]
    MissingPose {
        /// Which pose was missing ("generation" or "current")
        which: &'static str,
    },

    /// Not enough points to fit a spline of the configured degree
    #[error("Insufficient points: got {got}, need at least {required}")]
    InsufficientPoints {
        /// Points available after filtering
        got: usize,
        /// Minimum required (spline degree + 1)
        required: usize,
    },

    /// Spline system could not be solved
    #[error("Spline fit failed: {0}")]
    DegenerateFit(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Argument out of range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unparseable cell in an input log
    #[error("Parse error at line {line}, column '{column}': '{value}'")]
    Parse {
        /// 1-based line in the source file
        line: u64,
        /// Column name
        column: String,
        /// Raw cell text
        value: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
