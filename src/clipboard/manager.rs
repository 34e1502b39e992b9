/*!
 * Clipboard History Manager
 * Observes the platform clipboard and keeps the ordered history, its
 * retention schedule, and the persisted pinned clips in sync
 */

use super::history::ClipboardHistory;
use super::listener::{HistoryChange, HistoryChangeListener};
use super::persistence::PinnedClipStore;
use super::platform::{MemoryClipboard, PlatformClipboard};
use super::retention::RetentionTask;
use super::types::{ClipboardEntry, ClipboardStats};
use crate::core::errors::{ClipboardError, ClipboardResult};
use crate::core::types::{Clock, SystemClock, Timestamp, MAX_ENTRY_SIZE};
use crate::settings::{ClipboardSettings, MemoryPreferences, PreferenceStore, SettingChange};
use arc_swap::ArcSwap;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

struct Shared {
    history: Mutex<ClipboardHistory>,
    settings: ArcSwap<ClipboardSettings>,
    platform: Arc<dyn PlatformClipboard>,
    pinned_store: PinnedClipStore,
    clock: Arc<dyn Clock>,
    listener: RwLock<Option<Arc<dyn HistoryChangeListener>>>,
    retention: Mutex<Option<RetentionTask>>,
    /// Serializes each mutation with the delivery of its notifications.
    /// Reentrant so a listener may call back into the manager.
    gate: ReentrantMutex<()>,
    delivery: Mutex<Delivery>,
}

/// Deltas waiting for the listener. Changes made from inside a callback
/// are queued behind the batch being delivered.
#[derive(Default)]
struct Delivery {
    queue: VecDeque<HistoryChange>,
    active: bool,
}

/// Ends a delivery run, also when a listener panics
struct DeliveryRun<'a>(&'a Mutex<Delivery>);

impl Drop for DeliveryRun<'_> {
    fn drop(&mut self) {
        let mut delivery = self.0.lock();
        delivery.active = false;
        delivery.queue.clear();
    }
}

/// Clipboard history manager
///
/// Cheap to clone; clones share the same history.
#[derive(Clone)]
pub struct ClipboardHistoryManager {
    shared: Arc<Shared>,
}

impl ClipboardHistoryManager {
    /// Create a manager with in-memory collaborators and default settings
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    #[must_use]
    pub fn builder() -> ClipboardHistoryManagerBuilder {
        ClipboardHistoryManagerBuilder::new()
    }

    fn from_weak(weak: &Weak<Shared>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    // ------------------------------------------------------------------
    // Host lifecycle
    // ------------------------------------------------------------------

    /// Start observing: restore pinned clips, pick up the current clip,
    /// and start the retention schedule
    pub fn on_create(&self) {
        let is_empty = self.shared.history.lock().is_empty();
        if is_empty {
            self.load_pinned_clips();
        }
        if self.settings().history_enabled {
            self.on_primary_clip_changed();
        }
        self.schedule_retention_check();
    }

    pub fn on_destroy(&self) {
        self.cancel_retention_check();
    }

    /// Platform callback for a new primary clip
    pub fn on_primary_clip_changed(&self) {
        let _gate = self.shared.gate.lock();
        if !self.settings().history_enabled {
            return;
        }
        if let Err(e) = self.fetch_primary_clip() {
            warn!(error = %e, "Primary clip not recorded");
        }
    }

    /// Settings-provider callback for a changed preference
    pub fn on_setting_changed(&self, change: SettingChange) {
        let _gate = self.shared.gate.lock();
        let previous = self
            .shared
            .settings
            .rcu(|current| Arc::new(current.with_change(change)));
        debug!(?change, "Clipboard setting changed");

        match change {
            SettingChange::HistoryEnabled(true) => {
                self.schedule_retention_check();
            }
            SettingChange::HistoryEnabled(false) => {
                self.cancel_retention_check();
                self.clear_history();
            }
            SettingChange::RetentionMinutes(0) => self.cancel_retention_check(),
            SettingChange::RetentionMinutes(_) if previous.retention_minutes == 0 => {
                self.schedule_retention_check();
            }
            SettingChange::RetentionMinutes(_) | SettingChange::ClearPrimaryClipboard(_) => {}
            SettingChange::MaxEntries(max) => {
                let changes = self.shared.history.lock().set_max_entries(max);
                self.notify(&changes);
            }
        }
    }

    /// Restore pinned clips handed over by the host
    pub fn on_pinned_clips_available(&self, pinned: Vec<ClipboardEntry>) {
        let _gate = self.shared.gate.lock();
        let changes = self.shared.history.lock().restore_pinned(pinned);
        debug!(added = changes.len(), "Pinned clips restored");
        self.notify(&changes);
    }

    // ------------------------------------------------------------------
    // History mutations
    // ------------------------------------------------------------------

    /// Record the platform's primary clip
    pub fn fetch_primary_clip(&self) -> ClipboardResult<()> {
        let Some(clip) = self.shared.platform.primary_clip() else {
            return Ok(());
        };
        let Some(content) = clip.to_content() else {
            trace!(mime_types = ?clip.mime_types, "Ignoring unsupported clip");
            return Ok(());
        };

        let size = content.size();
        if size > MAX_ENTRY_SIZE {
            return Err(ClipboardError::TooLarge {
                size,
                max: MAX_ENTRY_SIZE,
            });
        }

        let timestamp = clip
            .timestamp
            .unwrap_or_else(|| self.shared.clock.now_millis());

        let _gate = self.shared.gate.lock();
        let changes = self.shared.history.lock().insert(content, timestamp);
        debug!(timestamp, size, changes = changes.len(), "Primary clip fetched");
        self.notify(&changes);
        Ok(())
    }

    /// Pin or unpin the entry with `timestamp` and persist the pinned set
    pub fn toggle_clip_pinned(&self, timestamp: Timestamp) -> ClipboardResult<()> {
        let _gate = self.shared.gate.lock();
        let now = self.shared.clock.now_millis();
        let (changes, pinned) = {
            let mut history = self.shared.history.lock();
            let changes = history.toggle_pinned(timestamp, now)?;
            (changes, history.pinned_entries())
        };
        debug!(timestamp, now, "Toggled pinned clip");
        self.notify(&changes);
        self.shared.pinned_store.save(&pinned)
    }

    /// Clear the platform clip and every unpinned entry
    pub fn clear_history(&self) {
        self.shared.platform.clear_primary_clip();

        let _gate = self.shared.gate.lock();
        let change = self.shared.history.lock().clear_unpinned();
        if let Some(change) = change {
            info!(?change, "Clipboard history cleared");
            self.notify(&[change]);
        }
    }

    #[must_use]
    pub fn can_remove(&self, index: usize) -> bool {
        self.shared.history.lock().can_remove(index)
    }

    /// Remove one unpinned entry
    pub fn remove_entry(&self, index: usize) -> ClipboardResult<()> {
        let _gate = self.shared.gate.lock();
        let change = self.shared.history.lock().remove(index)?;
        self.notify(&[change]);
        Ok(())
    }

    /// Purge unpinned entries older than the retention window
    pub fn check_retention_elapsed(&self) {
        let settings = self.settings();
        if settings.clear_primary_clipboard {
            self.shared.platform.clear_primary_clip();
        }

        let _gate = self.shared.gate.lock();
        let now = self.shared.clock.now_millis();
        let change = self
            .shared
            .history
            .lock()
            .expire(now, settings.retention_ms());
        if let Some(change) = change {
            debug!(?change, now, "Expired clips removed");
            self.notify(&[change]);
        }
    }

    // ------------------------------------------------------------------
    // Retention schedule
    // ------------------------------------------------------------------

    /// Start the periodic retention check. Returns whether a new schedule
    /// was started.
    pub fn schedule_retention_check(&self) -> bool {
        let settings = self.settings();
        let period = settings.retention_ms();

        let mut slot = self.shared.retention.lock();
        if slot.as_ref().is_some_and(RetentionTask::is_running)
            || !settings.history_enabled
            || period == 0
        {
            return false;
        }

        let weak = Arc::downgrade(&self.shared);
        let task = RetentionTask::spawn(Duration::from_millis(period), move || {
            let manager = Self::from_weak(&weak)?;
            manager.check_retention_elapsed();
            let settings = manager.settings();
            (settings.history_enabled && settings.retention_ms() > 0)
                .then(|| Duration::from_millis(settings.retention_ms()))
        });

        match task {
            Some(task) => {
                *slot = Some(task);
                true
            }
            None => false,
        }
    }

    pub fn cancel_retention_check(&self) {
        if let Some(task) = self.shared.retention.lock().take() {
            task.cancel();
        }
    }

    #[must_use]
    pub fn is_retention_check_scheduled(&self) -> bool {
        self.shared
            .retention
            .lock()
            .as_ref()
            .is_some_and(RetentionTask::is_running)
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    #[must_use]
    pub fn history_size(&self) -> usize {
        self.shared.history.lock().len()
    }

    #[must_use]
    pub fn history_entry(&self, index: usize) -> Option<ClipboardEntry> {
        self.shared.history.lock().get(index).cloned()
    }

    pub fn history_entry_content(&self, timestamp: Timestamp) -> ClipboardResult<ClipboardEntry> {
        self.shared
            .history
            .lock()
            .find(timestamp)
            .cloned()
            .ok_or(ClipboardError::NotFound(timestamp))
    }

    /// Snapshot of the ordered history
    #[must_use]
    pub fn entries(&self) -> Vec<ClipboardEntry> {
        self.shared.history.lock().entries().to_vec()
    }

    #[must_use]
    pub fn stats(&self) -> ClipboardStats {
        self.shared.history.lock().stats()
    }

    #[must_use]
    pub fn settings(&self) -> Arc<ClipboardSettings> {
        self.shared.settings.load_full()
    }

    /// Text of the platform's current clip, or empty
    #[must_use]
    pub fn retrieve_clipboard_content(&self) -> String {
        self.shared
            .platform
            .primary_clip()
            .and_then(|clip| clip.items.first().map(|item| item.coerce_to_text().to_string()))
            .unwrap_or_default()
    }

    /// Register the single change listener, or detach it with `None`
    pub fn set_history_change_listener(&self, listener: Option<Arc<dyn HistoryChangeListener>>) {
        *self.shared.listener.write() = listener;
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn load_pinned_clips(&self) {
        match self.shared.pinned_store.load() {
            Ok(pinned) if pinned.is_empty() => {}
            Ok(pinned) => self.on_pinned_clips_available(pinned),
            Err(e) => warn!(error = %e, "Could not load pinned clips"),
        }
    }

    /// Deliver deltas in order. Must be called under the gate with the
    /// history lock released.
    fn notify(&self, changes: &[HistoryChange]) {
        if changes.is_empty() {
            return;
        }
        {
            let mut delivery = self.shared.delivery.lock();
            delivery.queue.extend(changes.iter().copied());
            if delivery.active {
                return;
            }
            delivery.active = true;
        }

        let _run = DeliveryRun(&self.shared.delivery);
        loop {
            let Some(change) = self.shared.delivery.lock().queue.pop_front() else {
                break;
            };
            let listener = self.shared.listener.read().clone();
            if let Some(listener) = listener {
                trace!(?change, "Notifying history listener");
                change.dispatch(listener.as_ref());
            }
        }
    }
}

impl Default for ClipboardHistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for ClipboardHistoryManager
pub struct ClipboardHistoryManagerBuilder {
    platform: Option<Arc<dyn PlatformClipboard>>,
    preferences: Option<Arc<dyn PreferenceStore>>,
    settings: ClipboardSettings,
    clock: Option<Arc<dyn Clock>>,
}

impl ClipboardHistoryManagerBuilder {
    pub fn new() -> Self {
        Self {
            platform: None,
            preferences: None,
            settings: ClipboardSettings::default(),
            clock: None,
        }
    }

    /// Use the given platform clipboard
    pub fn with_platform(mut self, platform: Arc<dyn PlatformClipboard>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Persist pinned clips in the given preference store
    pub fn with_preferences(mut self, preferences: Arc<dyn PreferenceStore>) -> Self {
        self.preferences = Some(preferences);
        self
    }

    pub fn with_settings(mut self, settings: ClipboardSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the ClipboardHistoryManager
    pub fn build(self) -> ClipboardHistoryManager {
        let platform = self
            .platform
            .unwrap_or_else(|| Arc::new(MemoryClipboard::new()));
        let preferences = self
            .preferences
            .unwrap_or_else(|| Arc::new(MemoryPreferences::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        info!(
            enabled = self.settings.history_enabled,
            retention_minutes = self.settings.retention_minutes,
            max_entries = self.settings.max_entries,
            "Clipboard history manager initialized"
        );

        ClipboardHistoryManager {
            shared: Arc::new(Shared {
                history: Mutex::new(ClipboardHistory::with_max_entries(self.settings.max_entries)),
                settings: ArcSwap::from_pointee(self.settings),
                platform,
                pinned_store: PinnedClipStore::new(preferences),
                clock,
                listener: RwLock::new(None),
                retention: Mutex::new(None),
                gate: ReentrantMutex::new(()),
                delivery: Mutex::new(Delivery::default()),
            }),
        }
    }
}

impl Default for ClipboardHistoryManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
