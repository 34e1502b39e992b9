/*!
 * IME Clipboard Library
 * Clipboard history core for an on-screen keyboard, exposed as a library
 */

pub mod clipboard;
pub mod core;
pub mod monitoring;
pub mod settings;

// Re-exports
pub use clipboard::{
    ClipData, ClipItem, ClipboardContent, ClipboardEntry, ClipboardHistory,
    ClipboardHistoryManager, HistoryChange, HistoryChangeListener, MemoryClipboard,
    PlatformClipboard,
};
pub use crate::core::{Clock, ClipboardError, ClipboardResult, ManualClock, SystemClock, Timestamp};
pub use monitoring::init_tracing;
pub use settings::{
    ClipboardSettings, JsonFilePreferences, MemoryPreferences, PreferenceStore, SettingChange,
};
