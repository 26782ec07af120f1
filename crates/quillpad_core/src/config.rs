//! Explicit runtime configuration for the core.
//!
//! # Responsibility
//! - Carry tunables (autosave debounce, editor mount delay, preview length)
//!   into the components that read them.
//!
//! # Invariants
//! - Nothing in the core reads process-wide mutable configuration; callers
//!   pass a `CoreConfig` at construction time.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 2_000;
pub const DEFAULT_EDITOR_MOUNT_DELAY_MS: u64 = 50;
pub const DEFAULT_SUMMARY_MAX_CHARS: usize = 120;
const SEARCH_DEFAULT_LIMIT: u32 = 20;
const SEARCH_LIMIT_MAX: u32 = 100;

/// Core tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoreConfig {
    /// Debounce window restarted by every observed change.
    pub autosave_delay_ms: u64,
    /// Settle time before constructing the external editor.
    pub editor_mount_delay_ms: u64,
    /// Placeholder shown by an empty editor.
    pub placeholder_text: String,
    /// Maximum characters of list-preview summaries.
    pub summary_max_chars: usize,
    /// Search hits returned when a query sets no limit.
    pub search_limit: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            editor_mount_delay_ms: DEFAULT_EDITOR_MOUNT_DELAY_MS,
            placeholder_text: "Start writing...".to_string(),
            summary_max_chars: DEFAULT_SUMMARY_MAX_CHARS,
            search_limit: SEARCH_DEFAULT_LIMIT,
        }
    }
}

impl CoreConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn editor_mount_delay(&self) -> Duration {
        Duration::from_millis(self.editor_mount_delay_ms)
    }

    /// Parses a JSON config, filling absent fields with defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Normalizes a search limit: `None`/`0` use the default, large values clamp.
pub fn normalize_search_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => SEARCH_DEFAULT_LIMIT,
        Some(value) if value > SEARCH_LIMIT_MAX => SEARCH_LIMIT_MAX,
        Some(value) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = CoreConfig::from_json_str(r#"{ "autosaveDelayMs": 500 }"#).unwrap();
        assert_eq!(config.autosave_delay(), Duration::from_millis(500));
        assert_eq!(config.summary_max_chars, DEFAULT_SUMMARY_MAX_CHARS);
    }

    #[test]
    fn search_limit_defaults_and_caps() {
        assert_eq!(normalize_search_limit(None), 20);
        assert_eq!(normalize_search_limit(Some(0)), 20);
        assert_eq!(normalize_search_limit(Some(500)), 100);
        assert_eq!(normalize_search_limit(Some(7)), 7);
    }
}
