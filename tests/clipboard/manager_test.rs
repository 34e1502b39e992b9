/*!
 * Clipboard Manager Tests
 * History recording, deduplication, pinning, and change notifications
 */

use crate::support::Fixture;
use ime_clipboard::{
    ClipboardContent, ClipboardError, ClipboardHistoryManager, ClipboardSettings, HistoryChange,
    HistoryChangeListener, SettingChange,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;

#[test]
fn test_copies_are_listed_newest_first() {
    let fx = Fixture::new();

    fx.copy("First");
    fx.clock.advance(10);
    fx.copy("Second");
    fx.clock.advance(10);
    fx.copy("Third");

    assert_eq!(fx.texts(), vec!["Third", "Second", "First"]);
    assert_eq!(
        fx.listener.take(),
        vec![
            HistoryChange::Added { at: 0 },
            HistoryChange::Added { at: 0 },
            HistoryChange::Added { at: 0 }
        ]
    );
}

#[test]
fn test_recopy_moves_entry_to_top() {
    let fx = Fixture::new();
    fx.copy("a");
    fx.clock.advance(10);
    fx.copy("b");
    fx.clock.advance(10);
    fx.listener.take();

    let ts = fx.copy("a");

    assert_eq!(fx.texts(), vec!["a", "b"]);
    assert_eq!(fx.manager.history_entry(0).unwrap().timestamp, ts);
    assert_eq!(fx.listener.take(), vec![HistoryChange::Moved { from: 1, to: 0 }]);
}

#[test]
fn test_repeated_clip_notification_is_ignored() {
    let fx = Fixture::new();
    fx.copy("same");
    fx.manager.on_primary_clip_changed();
    fx.manager.on_primary_clip_changed();

    assert_eq!(fx.manager.history_size(), 1);
    assert_eq!(fx.listener.take(), vec![HistoryChange::Added { at: 0 }]);
}

#[test]
fn test_platform_timestamp_is_preferred() {
    let fx = Fixture::new();
    fx.clipboard
        .set_primary_clip(ime_clipboard::ClipData::text("stamped").with_timestamp(42));
    fx.manager.on_primary_clip_changed();

    assert_eq!(fx.manager.history_entry(0).unwrap().timestamp, 42);
    assert!(fx.manager.history_entry_content(42).is_ok());
}

#[test]
fn test_image_clips_are_recorded() {
    let fx = Fixture::new();
    fx.clipboard.set_image("content://media/1", "image/png");
    fx.manager.on_primary_clip_changed();

    let entry = fx.manager.history_entry(0).unwrap();
    assert_eq!(
        entry.content,
        ClipboardContent::image("content://media/1", "image/png")
    );
    assert_eq!(fx.manager.stats().image_entries, 1);
}

#[test]
fn test_toggle_pinned_moves_and_persists() {
    let fx = Fixture::new();
    let first = fx.copy("pin me");
    fx.clock.advance(10);
    fx.copy("other");
    fx.listener.take();

    fx.clock.advance(10);
    fx.manager.toggle_clip_pinned(first).unwrap();

    assert_eq!(fx.texts(), vec!["pin me", "other"]);
    assert!(fx.manager.history_entry(0).unwrap().pinned);
    assert_eq!(fx.listener.take(), vec![HistoryChange::Moved { from: 1, to: 0 }]);

    let stored = ime_clipboard::PreferenceStore::get_string(
        fx.prefs.as_ref(),
        ime_clipboard::clipboard::PINNED_CLIPS_KEY,
    )
    .unwrap()
    .unwrap();
    assert!(stored.contains("pin me"));
    assert!(!stored.contains("other"));
}

#[test]
fn test_toggle_unknown_entry() {
    let fx = Fixture::new();
    assert_eq!(
        fx.manager.toggle_clip_pinned(7),
        Err(ClipboardError::NotFound(7))
    );
}

#[test]
fn test_clear_history_keeps_pinned() {
    let fx = Fixture::new();
    let pinned = fx.copy("keep");
    fx.clock.advance(10);
    fx.copy("drop 1");
    fx.clock.advance(10);
    fx.copy("drop 2");
    fx.clock.advance(10);
    fx.manager.toggle_clip_pinned(pinned).unwrap();
    fx.listener.take();

    fx.manager.clear_history();

    assert_eq!(fx.texts(), vec!["keep"]);
    assert_eq!(
        fx.listener.take(),
        vec![HistoryChange::Removed { pos: 1, count: 2 }]
    );
    assert_eq!(fx.manager.retrieve_clipboard_content(), "");
}

#[test]
fn test_clear_empty_history_is_silent() {
    let fx = Fixture::new();
    fx.manager.clear_history();
    assert!(fx.listener.take().is_empty());
}

#[test]
fn test_remove_entry() {
    let fx = Fixture::new();
    let pinned = fx.copy("pinned");
    fx.clock.advance(10);
    fx.copy("loose");
    fx.clock.advance(10);
    fx.manager.toggle_clip_pinned(pinned).unwrap();
    fx.listener.take();

    assert!(!fx.manager.can_remove(0));
    assert!(fx.manager.can_remove(1));
    assert_eq!(fx.manager.remove_entry(0), Err(ClipboardError::Pinned(0)));

    fx.manager.remove_entry(1).unwrap();
    assert_eq!(fx.texts(), vec!["pinned"]);
    assert_eq!(
        fx.listener.take(),
        vec![HistoryChange::Removed { pos: 1, count: 1 }]
    );
}

#[test]
fn test_retention_check_purges_old_unpinned() {
    let settings = ClipboardSettings {
        retention_minutes: 1,
        ..ClipboardSettings::default()
    };
    let fx = Fixture::with_settings(settings);
    let old_pinned = fx.copy("old pinned");
    fx.manager.toggle_clip_pinned(old_pinned).unwrap();
    fx.copy("old");
    fx.clock.advance(50_000);
    fx.copy("recent");
    fx.listener.take();

    fx.clock.advance(20_000);
    fx.manager.check_retention_elapsed();

    assert_eq!(fx.texts(), vec!["old pinned", "recent"]);
    assert_eq!(
        fx.listener.take(),
        vec![HistoryChange::Removed { pos: 2, count: 1 }]
    );
}

#[test]
fn test_retention_check_clears_primary_when_configured() {
    let settings = ClipboardSettings {
        clear_primary_clipboard: true,
        ..ClipboardSettings::default()
    };
    let fx = Fixture::with_settings(settings);
    fx.copy("sensitive");

    fx.manager.check_retention_elapsed();
    assert_eq!(fx.manager.retrieve_clipboard_content(), "");
    // the entry itself is still within the retention window
    assert_eq!(fx.manager.history_size(), 1);
}

#[test]
fn test_disabling_history_clears_it() {
    let fx = Fixture::new();
    fx.copy("a");
    fx.listener.take();

    fx.manager
        .on_setting_changed(SettingChange::HistoryEnabled(false));

    assert_eq!(fx.manager.history_size(), 0);
    assert!(!fx.manager.settings().history_enabled);
    assert_eq!(
        fx.listener.take(),
        vec![HistoryChange::Removed { pos: 0, count: 1 }]
    );

    fx.copy("ignored");
    assert_eq!(fx.manager.history_size(), 0);
}

#[test]
fn test_max_entries_bounds_history() {
    let settings = ClipboardSettings {
        max_entries: 2,
        ..ClipboardSettings::default()
    };
    let fx = Fixture::with_settings(settings);
    for text in ["a", "b", "c"] {
        fx.copy(text);
        fx.clock.advance(10);
    }

    assert_eq!(fx.texts(), vec!["c", "b"]);

    fx.listener.take();
    fx.manager.on_setting_changed(SettingChange::MaxEntries(1));
    assert_eq!(fx.texts(), vec!["c"]);
    assert_eq!(
        fx.listener.take(),
        vec![HistoryChange::Removed { pos: 1, count: 1 }]
    );
}

#[test]
fn test_detached_listener_receives_nothing() {
    let fx = Fixture::new();
    fx.manager.set_history_change_listener(None);
    fx.copy("quiet");
    assert!(fx.listener.take().is_empty());
}

/// Listener that reads the manager back from inside its callback
struct ReadBackListener {
    manager: OnceLock<ClipboardHistoryManager>,
    seen: Mutex<Vec<(usize, String)>>,
}

impl HistoryChangeListener for ReadBackListener {
    fn on_entry_added(&self, at: usize) {
        let manager = self.manager.get().unwrap();
        let entry = manager.history_entry(at).unwrap();
        self.seen
            .lock()
            .push((manager.history_size(), entry.content.to_string()));
    }

    fn on_entries_removed(&self, _pos: usize, _count: usize) {}

    fn on_entry_moved(&self, _from: usize, _to: usize) {}
}

#[test]
fn test_listener_can_read_back_manager() {
    let fx = Fixture::new();
    let listener = Arc::new(ReadBackListener {
        manager: OnceLock::new(),
        seen: Mutex::new(Vec::new()),
    });
    let _ = listener.manager.set(fx.manager.clone());
    fx.manager.set_history_change_listener(Some(listener.clone()));

    fx.copy("hello");
    fx.clock.advance(1);
    fx.copy("world");

    assert_eq!(
        *listener.seen.lock(),
        vec![(1, "hello".to_string()), (2, "world".to_string())]
    );
    fx.manager.set_history_change_listener(None);
}

/// Records deltas and removes the second row while the first added row is
/// being delivered
struct RemovingListener {
    manager: OnceLock<ClipboardHistoryManager>,
    changes: Mutex<Vec<HistoryChange>>,
    removed: AtomicBool,
}

impl HistoryChangeListener for RemovingListener {
    fn on_entry_added(&self, at: usize) {
        self.changes.lock().push(HistoryChange::Added { at });
        if !self.removed.swap(true, Ordering::SeqCst) {
            self.manager.get().unwrap().remove_entry(1).unwrap();
        }
    }

    fn on_entries_removed(&self, pos: usize, count: usize) {
        self.changes.lock().push(HistoryChange::Removed { pos, count });
    }

    fn on_entry_moved(&self, from: usize, to: usize) {
        self.changes.lock().push(HistoryChange::Moved { from, to });
    }
}

#[test]
fn test_listener_mutation_is_delivered_after_current_batch() {
    let fx = Fixture::with_settings(ClipboardSettings {
        max_entries: 2,
        ..ClipboardSettings::default()
    });
    fx.copy("a");
    fx.clock.advance(1);
    fx.copy("b");
    fx.clock.advance(1);

    let listener = Arc::new(RemovingListener {
        manager: OnceLock::new(),
        changes: Mutex::new(Vec::new()),
        removed: AtomicBool::new(false),
    });
    let _ = listener.manager.set(fx.manager.clone());
    fx.manager.set_history_change_listener(Some(listener.clone()));

    fx.copy("c");

    let changes = listener.changes.lock().clone();
    assert_eq!(
        changes,
        vec![
            HistoryChange::Added { at: 0 },
            HistoryChange::Removed { pos: 2, count: 1 },
            HistoryChange::Removed { pos: 1, count: 1 },
        ]
    );

    // Replay on the rows the view showed before the copy
    let mut rows = vec!["b".to_string(), "a".to_string()];
    for change in changes {
        match change {
            HistoryChange::Added { at } => rows.insert(at, "c".to_string()),
            HistoryChange::Removed { pos, count } => {
                assert!(pos + count <= rows.len(), "removal out of range: {change:?}");
                rows.drain(pos..pos + count);
            }
            HistoryChange::Moved { .. } => unreachable!(),
        }
    }
    assert_eq!(rows, fx.texts());
    assert_eq!(fx.texts(), vec!["c"]);
    fx.manager.set_history_change_listener(None);
}

#[test]
fn test_concurrent_setting_changes_are_all_kept() {
    for _ in 0..20 {
        let fx = Fixture::new();
        let toggler = fx.manager.clone();
        let retention = fx.manager.clone();

        let a = thread::spawn(move || {
            for i in 0..200 {
                toggler.on_setting_changed(SettingChange::ClearPrimaryClipboard(i % 2 == 0));
            }
        });
        let b = thread::spawn(move || {
            for _ in 0..200 {
                retention.on_setting_changed(SettingChange::RetentionMinutes(7));
            }
        });
        a.join().unwrap();
        b.join().unwrap();

        let settings = fx.manager.settings();
        assert_eq!(settings.retention_minutes, 7);
        assert!(!settings.clear_primary_clipboard);
    }
}
