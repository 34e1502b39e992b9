/*!
 * Pinned Clip Persistence
 * Pinned entries survive restarts as a JSON array in preference storage
 */

use super::types::ClipboardEntry;
use crate::core::errors::ClipboardResult;
use crate::settings::PreferenceStore;
use std::sync::Arc;
use tracing::debug;

/// Preference key holding the pinned clips
pub const PINNED_CLIPS_KEY: &str = "pinned_clips";

#[derive(Clone)]
pub struct PinnedClipStore {
    prefs: Arc<dyn PreferenceStore>,
}

impl PinnedClipStore {
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        Self { prefs }
    }

    /// Read the persisted pinned clips. Absent or blank values are empty.
    pub fn load(&self) -> ClipboardResult<Vec<ClipboardEntry>> {
        let raw = match self.prefs.get_string(PINNED_CLIPS_KEY)? {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(Vec::new()),
        };
        let mut entries: Vec<ClipboardEntry> = serde_json::from_str(&raw)?;
        for entry in &mut entries {
            entry.pinned = true;
        }
        debug!(count = entries.len(), "Loaded pinned clips");
        Ok(entries)
    }

    /// Persist the pinned subset of `entries`
    pub fn save<'a, I>(&self, entries: I) -> ClipboardResult<()>
    where
        I: IntoIterator<Item = &'a ClipboardEntry>,
    {
        let pinned: Vec<&ClipboardEntry> = entries.into_iter().filter(|e| e.pinned).collect();
        let raw = serde_json::to_string(&pinned)?;
        self.prefs.put_string(PINNED_CLIPS_KEY, &raw)?;
        debug!(count = pinned.len(), "Saved pinned clips");
        Ok(())
    }
}
