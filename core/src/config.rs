//! Pipeline configuration.

use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings fixed when a `NetworkManager` is built.
///
/// Deserializable so consumers can load it from their own config files;
/// every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Per-request timeout in seconds, handed to the transport.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    /// Inclusive range of status codes whose body is decoded as the payload.
    #[serde(default)]
    pub success_status_codes: StatusRange,

    /// Failure status codes reported to the status code handler.
    #[serde(default)]
    pub tracked_status_codes: Vec<i32>,
}

impl NetworkConfig {
    /// The configured timeout. Values too large for a `Duration` saturate to
    /// `Duration::MAX`; negative or NaN values fall back to the default with
    /// a warning.
    pub fn timeout(&self) -> Duration {
        match Duration::try_from_secs_f64(self.timeout_secs) {
            Ok(timeout) => timeout,
            Err(_) if self.timeout_secs > 0.0 => Duration::MAX,
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.timeout_secs,
                    "invalid timeout, using the default"
                );
                Duration::from_secs_f64(default_timeout_secs())
            }
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            success_status_codes: StatusRange::default(),
            tracked_status_codes: Vec::new(),
        }
    }
}

fn default_timeout_secs() -> f64 {
    10.0
}

/// Inclusive status code interval. Defaults to 200..=209, deliberately
/// narrower than the whole 2xx class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRange {
    pub low: i32,
    pub high: i32,
}

impl StatusRange {
    pub fn contains(&self, status: i32) -> bool {
        (self.low..=self.high).contains(&status)
    }
}

impl Default for StatusRange {
    fn default() -> Self {
        Self { low: 200, high: 209 }
    }
}

impl From<RangeInclusive<i32>> for StatusRange {
    fn from(range: RangeInclusive<i32>) -> Self {
        Self {
            low: *range.start(),
            high: *range.end(),
        }
    }
}
