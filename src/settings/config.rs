/*!
 * Clipboard Settings
 *
 * Typed settings for the clipboard history, loadable from the environment.
 */

use crate::core::types::{DEFAULT_MAX_HISTORY_SIZE, DEFAULT_RETENTION_TIME_MIN, ONE_MINUTE_MILLIS};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

pub const ENV_HISTORY_ENABLED: &str = "CLIPBOARD_HISTORY_ENABLED";
pub const ENV_RETENTION_MINUTES: &str = "CLIPBOARD_RETENTION_MINUTES";
pub const ENV_CLEAR_PRIMARY: &str = "CLIPBOARD_CLEAR_PRIMARY";
pub const ENV_MAX_ENTRIES: &str = "CLIPBOARD_MAX_ENTRIES";

/// Settings consumed by the clipboard history manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ClipboardSettings {
    /// Record clips at all (default: true)
    pub history_enabled: bool,

    /// Retention window for unpinned clips, 0 keeps them forever (default: 10)
    pub retention_minutes: u32,

    /// Also clear the platform clipboard on every retention check (default: false)
    pub clear_primary_clipboard: bool,

    /// History bound, 0 is unbounded (default: 100)
    pub max_entries: usize,
}

impl ClipboardSettings {
    /// Create default settings
    pub fn new() -> Self {
        Self {
            history_enabled: true,
            retention_minutes: DEFAULT_RETENTION_TIME_MIN,
            clear_primary_clipboard: false,
            max_entries: DEFAULT_MAX_HISTORY_SIZE,
        }
    }

    /// Load settings from the environment, falling back to defaults
    ///
    /// Environment variables:
    /// - CLIPBOARD_HISTORY_ENABLED: `true`/`false`/`1`/`0`
    /// - CLIPBOARD_RETENTION_MINUTES: minutes, 0 disables retention
    /// - CLIPBOARD_CLEAR_PRIMARY: `true`/`false`/`1`/`0`
    /// - CLIPBOARD_MAX_ENTRIES: entry count, 0 is unbounded
    pub fn from_env() -> Self {
        let defaults = Self::new();
        Self {
            history_enabled: env_flag(ENV_HISTORY_ENABLED, defaults.history_enabled),
            retention_minutes: env_parse(ENV_RETENTION_MINUTES, defaults.retention_minutes),
            clear_primary_clipboard: env_flag(ENV_CLEAR_PRIMARY, defaults.clear_primary_clipboard),
            max_entries: env_parse(ENV_MAX_ENTRIES, defaults.max_entries),
        }
    }

    /// Retention window in milliseconds
    #[must_use]
    pub fn retention_ms(&self) -> u64 {
        u64::from(self.retention_minutes) * ONE_MINUTE_MILLIS
    }

    /// Apply a single change, returning the updated settings
    #[must_use]
    pub fn with_change(&self, change: SettingChange) -> Self {
        let mut next = self.clone();
        match change {
            SettingChange::HistoryEnabled(enabled) => next.history_enabled = enabled,
            SettingChange::RetentionMinutes(minutes) => next.retention_minutes = minutes,
            SettingChange::ClearPrimaryClipboard(clear) => next.clear_primary_clipboard = clear,
            SettingChange::MaxEntries(max) => next.max_entries = max,
        }
        next
    }
}

impl Default for ClipboardSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// A changed preference, as reported by the settings provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "snake_case")]
pub enum SettingChange {
    HistoryEnabled(bool),
    RetentionMinutes(u32),
    ClearPrimaryClipboard(bool),
    MaxEntries(usize),
}

fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => true,
            "0" | "false" | "off" | "no" => false,
            other => {
                warn!(key, value = other, default, "Ignoring unparsable flag");
                default
            }
        },
        Err(_) => default,
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %value, default = %default, "Ignoring unparsable number");
            default
        }),
        Err(_) => default,
    }
}
