//! Scheduler limit configuration.

use serde::{Deserialize, Serialize};

/// Default cap on in-flight items.
pub const DEFAULT_MAX_ITEMS: u32 = 30;
/// Default cap on in-flight declared workload, in bytes (80 MiB).
pub const DEFAULT_MAX_WORKLOAD_BYTES: u64 = 80 * 1024 * 1024;

/// The two global caps the scheduler enforces for the process lifetime.
///
/// `max_workload_bytes` is a soft bound over workload *estimates*, not a hard
/// resource reservation. It must be larger than any single item a producer
/// will submit: an item whose declared workload alone exceeds the cap can
/// never be admitted, which `submit` rejects up front.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerLimits {
    /// Maximum items in flight at once.
    pub max_items: u32,
    /// Maximum declared workload bytes in flight at once.
    pub max_workload_bytes: u64,
}

impl Default for SchedulerLimits {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            max_workload_bytes: DEFAULT_MAX_WORKLOAD_BYTES,
        }
    }
}

impl SchedulerLimits {
    /// Validate limit values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_items == 0 {
            return Err("max_items must be greater than 0".into());
        }
        if self.max_workload_bytes == 0 {
            return Err("max_workload_bytes must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse limits from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation failure description.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let limits: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        limits.validate()?;
        Ok(limits)
    }
}
