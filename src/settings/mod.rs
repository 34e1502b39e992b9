/*!
 * Settings Module
 * Clipboard settings and the preference storage behind them
 */

pub mod config;
pub mod preferences;

pub use config::{ClipboardSettings, SettingChange};
pub use preferences::{JsonFilePreferences, MemoryPreferences, PreferenceStore};
