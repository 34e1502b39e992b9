/*!
 * Clipboard History
 * Ordered, deduplicating, pin-aware entry list
 *
 * Entries are kept sorted by (pinned desc, timestamp desc). Every mutation
 * reports the index deltas it caused so a view can replay them.
 */

use super::listener::HistoryChange;
use super::types::{ClipboardContent, ClipboardEntry, ClipboardStats};
use crate::core::errors::{ClipboardError, ClipboardResult};
use crate::core::types::Timestamp;

#[derive(Debug, Clone, Default)]
pub struct ClipboardHistory {
    entries: Vec<ClipboardEntry>,
    /// 0 means unbounded
    max_entries: usize,
}

impl ClipboardHistory {
    /// Create an unbounded history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history bounded to `max_entries` (0 is unbounded)
    #[must_use]
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries,
        }
    }

    /// Sorted insertion point. `before_equal` places the entry ahead of
    /// entries sharing its sort key.
    fn insert_position(&self, entry: &ClipboardEntry, before_equal: bool) -> usize {
        let key = entry.sort_key();
        if before_equal {
            self.entries.partition_point(|e| e.sort_key() < key)
        } else {
            self.entries.partition_point(|e| e.sort_key() <= key)
        }
    }

    /// Record a clip. Re-copying known content only refreshes its timestamp.
    pub fn insert(&mut self, content: ClipboardContent, timestamp: Timestamp) -> Vec<HistoryChange> {
        if content.is_empty() {
            return Vec::new();
        }

        if let Some(from) = self.entries.iter().position(|e| e.content == content) {
            if self.entries[from].timestamp == timestamp {
                return Vec::new();
            }
            let mut entry = self.entries.remove(from);
            entry.timestamp = timestamp;
            let to = self.insert_position(&entry, true);
            self.entries.insert(to, entry);
            return vec![HistoryChange::Moved { from, to }];
        }

        let entry = ClipboardEntry::new(timestamp, content);
        let at = self.insert_position(&entry, false);
        self.entries.insert(at, entry);

        let mut changes = vec![HistoryChange::Added { at }];
        self.enforce_bound(&mut changes);
        changes
    }

    /// Add previously persisted pinned entries, skipping content already present
    pub fn restore_pinned<I>(&mut self, entries: I) -> Vec<HistoryChange>
    where
        I: IntoIterator<Item = ClipboardEntry>,
    {
        let mut changes = Vec::new();
        for mut entry in entries {
            if entry.content.is_empty() || self.entries.iter().any(|e| e.content == entry.content)
            {
                continue;
            }
            entry.pinned = true;
            let at = self.insert_position(&entry, false);
            self.entries.insert(at, entry);
            changes.push(HistoryChange::Added { at });
        }
        self.enforce_bound(&mut changes);
        changes
    }

    /// Flip the pinned flag of the entry with `timestamp`, restamping it with `now`
    pub fn toggle_pinned(
        &mut self,
        timestamp: Timestamp,
        now: Timestamp,
    ) -> ClipboardResult<Vec<HistoryChange>> {
        let from = self
            .position(timestamp)
            .ok_or(ClipboardError::NotFound(timestamp))?;

        let mut entry = self.entries.remove(from);
        entry.timestamp = now;
        entry.pinned = !entry.pinned;
        let to = self.insert_position(&entry, true);
        self.entries.insert(to, entry);

        let mut changes = vec![HistoryChange::Moved { from, to }];
        self.enforce_bound(&mut changes);
        Ok(changes)
    }

    /// Drop every unpinned entry
    pub fn clear_unpinned(&mut self) -> Option<HistoryChange> {
        // Unpinned entries always form the tail
        let pos = self.entries.iter().position(|e| !e.pinned)?;
        let count = self.entries.len() - pos;
        debug_assert!(self.entries[pos..].iter().all(|e| !e.pinned));
        self.entries.truncate(pos);
        Some(HistoryChange::Removed { pos, count })
    }

    #[must_use]
    pub fn can_remove(&self, index: usize) -> bool {
        matches!(self.entries.get(index), Some(entry) if !entry.pinned)
    }

    /// Remove a single unpinned entry
    pub fn remove(&mut self, index: usize) -> ClipboardResult<HistoryChange> {
        match self.entries.get(index) {
            None => Err(ClipboardError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            }),
            Some(entry) if entry.pinned => Err(ClipboardError::Pinned(index)),
            Some(_) => {
                self.entries.remove(index);
                Ok(HistoryChange::Removed {
                    pos: index,
                    count: 1,
                })
            }
        }
    }

    /// Drop unpinned entries older than `retention_ms`. 0 disables retention.
    pub fn expire(&mut self, now: Timestamp, retention_ms: u64) -> Option<HistoryChange> {
        if retention_ms == 0 {
            return None;
        }
        // Unpinned entries are sorted newest first, so the expired ones are a suffix
        let pos = self
            .entries
            .iter()
            .position(|e| !e.pinned && now.saturating_sub(e.timestamp) > retention_ms)?;
        let count = self.entries.len() - pos;
        debug_assert!(self.entries[pos..]
            .iter()
            .all(|e| !e.pinned && now.saturating_sub(e.timestamp) > retention_ms));
        self.entries.truncate(pos);
        Some(HistoryChange::Removed { pos, count })
    }

    /// Change the bound and evict immediately if needed
    pub fn set_max_entries(&mut self, max_entries: usize) -> Vec<HistoryChange> {
        self.max_entries = max_entries;
        let mut changes = Vec::new();
        self.enforce_bound(&mut changes);
        changes
    }

    /// Evict the oldest unpinned entries until the bound holds. Pinned
    /// entries are never evicted, so a history full of pins may exceed it.
    fn enforce_bound(&mut self, changes: &mut Vec<HistoryChange>) {
        if self.max_entries == 0 {
            return;
        }
        while self.entries.len() > self.max_entries {
            let Some(pos) = self.entries.iter().rposition(|e| !e.pinned) else {
                break;
            };
            self.entries.remove(pos);
            changes.push(HistoryChange::Removed { pos, count: 1 });
        }
    }

    #[must_use]
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ClipboardEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn position(&self, timestamp: Timestamp) -> Option<usize> {
        self.entries.iter().position(|e| e.timestamp == timestamp)
    }

    #[must_use]
    pub fn find(&self, timestamp: Timestamp) -> Option<&ClipboardEntry> {
        self.entries.iter().find(|e| e.timestamp == timestamp)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClipboardEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn entries(&self) -> &[ClipboardEntry] {
        &self.entries
    }

    #[must_use]
    pub fn pinned_entries(&self) -> Vec<ClipboardEntry> {
        self.entries.iter().filter(|e| e.pinned).cloned().collect()
    }

    #[must_use]
    pub fn stats(&self) -> ClipboardStats {
        self.entries
            .iter()
            .fold(ClipboardStats::default(), |mut stats, entry| {
                stats.total_entries += 1;
                stats.total_size += entry.size();
                if entry.pinned {
                    stats.pinned_entries += 1;
                }
                if matches!(entry.content, ClipboardContent::Image(_)) {
                    stats.image_entries += 1;
                }
                stats
            })
    }
}
