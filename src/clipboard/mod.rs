/*!
 * Clipboard Module
 * Ordered clipboard history with pinning, retention, and change notifications
 */

pub mod history;
pub mod listener;
pub mod manager;
pub mod persistence;
pub mod platform;
pub mod retention;
pub mod types;

pub use history::ClipboardHistory;
pub use listener::{HistoryChange, HistoryChangeListener};
pub use manager::{ClipboardHistoryManager, ClipboardHistoryManagerBuilder};
pub use persistence::{PinnedClipStore, PINNED_CLIPS_KEY};
pub use platform::{ClipData, ClipItem, MemoryClipboard, PlatformClipboard};
pub use retention::RetentionTask;
pub use types::{ClipboardContent, ClipboardEntry, ClipboardFormat, ClipboardStats, ImageClip};
