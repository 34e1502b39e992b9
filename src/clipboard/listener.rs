/*!
 * History Change Notifications
 * Index deltas a list view can replay as insert/remove/move animations
 */

use serde::{Deserialize, Serialize};

/// A single change to the ordered history.
///
/// Indices are valid against the history as it was right after the change,
/// with earlier changes of the same batch already applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryChange {
    Added { at: usize },
    Removed { pos: usize, count: usize },
    Moved { from: usize, to: usize },
}

impl HistoryChange {
    /// Deliver this change to a listener
    pub fn dispatch(&self, listener: &dyn HistoryChangeListener) {
        match *self {
            Self::Added { at } => listener.on_entry_added(at),
            Self::Removed { pos, count } => listener.on_entries_removed(pos, count),
            Self::Moved { from, to } => listener.on_entry_moved(from, to),
        }
    }
}

/// Receiver of history deltas, usually the clipboard list view
///
/// Callbacks may call back into the manager. Changes they make are
/// delivered after the rest of the batch in progress, and indices they pass
/// to the manager refer to its current history, not the view's.
pub trait HistoryChangeListener: Send + Sync {
    fn on_entry_added(&self, at: usize);

    fn on_entries_removed(&self, pos: usize, count: usize);

    fn on_entry_moved(&self, from: usize, to: usize);
}
