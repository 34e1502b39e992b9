/*!
 * Retention schedule tests
 * Runs on paused tokio time; the manual clock is advanced alongside it
 */

use crate::support::Fixture;
use ime_clipboard::{ClipboardSettings, HistoryChange, SettingChange};
use pretty_assertions::assert_eq;
use std::time::Duration;

const MINUTE: Duration = Duration::from_secs(60);

fn one_minute_retention() -> ClipboardSettings {
    ClipboardSettings {
        retention_minutes: 1,
        ..ClipboardSettings::default()
    }
}

/// Advance both tokio time and the manager's clock
async fn elapse(fx: &Fixture, by: Duration) {
    fx.clock.advance(by.as_millis() as u64);
    tokio::time::sleep(by).await;
    tokio::task::yield_now().await;
}

#[tokio::test(start_paused = true)]
async fn test_on_create_schedules_and_expires() {
    let fx = Fixture::with_settings(one_minute_retention());
    fx.manager.on_create();
    assert!(fx.manager.is_retention_check_scheduled());

    fx.copy("short lived");
    fx.listener.take();

    // first check at one minute: entry is exactly one minute old, kept
    elapse(&fx, MINUTE).await;
    assert_eq!(fx.manager.history_size(), 1);

    // second check at two minutes: entry is older than the window
    elapse(&fx, MINUTE).await;
    assert_eq!(fx.manager.history_size(), 0);
    assert_eq!(
        fx.listener.take(),
        vec![HistoryChange::Removed { pos: 0, count: 1 }]
    );

    fx.manager.on_destroy();
    assert!(!fx.manager.is_retention_check_scheduled());
}

#[tokio::test(start_paused = true)]
async fn test_schedule_is_idempotent() {
    let fx = Fixture::with_settings(one_minute_retention());
    assert!(fx.manager.schedule_retention_check());
    assert!(!fx.manager.schedule_retention_check());
    fx.manager.cancel_retention_check();
    assert!(fx.manager.schedule_retention_check());
    fx.manager.on_destroy();
}

#[tokio::test(start_paused = true)]
async fn test_zero_retention_cancels_and_keeps_clips() {
    let fx = Fixture::with_settings(one_minute_retention());
    fx.manager.on_create();
    fx.copy("keep forever");

    fx.manager
        .on_setting_changed(SettingChange::RetentionMinutes(0));
    assert!(!fx.manager.is_retention_check_scheduled());

    elapse(&fx, MINUTE * 10).await;
    fx.manager.check_retention_elapsed();
    assert_eq!(fx.manager.history_size(), 1);

    // re-enabling retention restarts the schedule
    fx.manager
        .on_setting_changed(SettingChange::RetentionMinutes(1));
    assert!(fx.manager.is_retention_check_scheduled());

    elapse(&fx, MINUTE + Duration::from_millis(1)).await;
    assert_eq!(fx.manager.history_size(), 0);
    fx.manager.on_destroy();
}

#[tokio::test(start_paused = true)]
async fn test_toggling_history_controls_schedule() {
    let fx = Fixture::with_settings(one_minute_retention());
    fx.manager.on_create();

    fx.manager
        .on_setting_changed(SettingChange::HistoryEnabled(false));
    assert!(!fx.manager.is_retention_check_scheduled());

    fx.manager
        .on_setting_changed(SettingChange::HistoryEnabled(true));
    assert!(fx.manager.is_retention_check_scheduled());
    fx.manager.on_destroy();
}

#[tokio::test(start_paused = true)]
async fn test_pinned_entries_outlive_retention() {
    let fx = Fixture::with_settings(one_minute_retention());
    fx.manager.on_create();
    let ts = fx.copy("pinned");
    fx.manager.toggle_clip_pinned(ts).unwrap();

    elapse(&fx, MINUTE * 5).await;
    assert_eq!(fx.manager.history_size(), 1);
    fx.manager.on_destroy();
}

#[tokio::test(start_paused = true)]
async fn test_task_stops_when_manager_dropped() {
    let fx = Fixture::with_settings(one_minute_retention());
    fx.manager.on_create();
    let Fixture {
        manager, listener, ..
    } = fx;
    manager.set_history_change_listener(None);
    drop(listener);
    drop(manager);

    // nothing left to check; the runtime must simply stay quiet
    tokio::time::sleep(MINUTE * 3).await;
}
