//! Generic timestamp wrapper.

use serde::{Deserialize, Serialize};

/// Value tagged with a log timestamp.
///
/// Timestamps are seconds on the trip log clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timestamped<T> {
    /// The wrapped data
    pub data: T,
    /// Timestamp in seconds
    pub timestamp_s: f64,
}

impl<T> Timestamped<T> {
    /// Create a new timestamped value.
    #[inline]
    pub fn new(data: T, timestamp_s: f64) -> Self {
        Self { data, timestamp_s }
    }

    /// Map the inner data while preserving timestamp.
    #[inline]
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Timestamped<U> {
        Timestamped {
            data: f(self.data),
            timestamp_s: self.timestamp_s,
        }
    }
}
