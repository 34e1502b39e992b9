/*!
 * Clipboard Shell - Headless Host
 *
 * Drives the clipboard history manager from line commands on stdin:
 * - Feeds clips into an in-process platform clipboard
 * - Forwards setting changes
 * - Logs every history delta the manager emits
 */

use anyhow::{bail, Context, Result};
use ime_clipboard::monitoring::span_command;
use ime_clipboard::{
    init_tracing, ClipboardHistoryManager, ClipboardSettings, HistoryChangeListener,
    JsonFilePreferences, MemoryClipboard, SettingChange,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

const HELP: &str = "\
commands:
  copy <text>            put text on the clipboard
  image <uri> [mime]     put an image reference on the clipboard
  pin <timestamp>        toggle pinned state of an entry
  remove <index>         remove an unpinned entry
  clear                  clear unpinned history and the clipboard
  list                   show the history
  paste                  show the current clipboard text
  enable on|off          toggle history recording
  retention <minutes>    set the retention window (0 keeps clips)
  clear-primary on|off   clear the clipboard on each retention check
  max <n>                set the history bound (0 is unbounded)
  expire                 run the retention check now
  stats                  show history statistics
  quit                   exit";

/// Logs history deltas the way a list view would consume them
struct LoggingListener;

impl HistoryChangeListener for LoggingListener {
    fn on_entry_added(&self, at: usize) {
        info!(at, "entry added");
    }

    fn on_entries_removed(&self, pos: usize, count: usize) {
        info!(pos, count, "entries removed");
    }

    fn on_entry_moved(&self, from: usize, to: usize) {
        info!(from, to, "entry moved");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let prefs_path = std::env::var("CLIPBOARD_PREFS_PATH")
        .unwrap_or_else(|_| "/tmp/ime-clipboard/preferences.json".to_string());
    info!(prefs_path = %prefs_path, "Opening preference storage");
    let preferences = JsonFilePreferences::open(&prefs_path)
        .with_context(|| format!("opening preferences at {prefs_path}"))?;

    let settings = ClipboardSettings::from_env();
    info!(?settings, "Settings loaded");

    let clipboard = Arc::new(MemoryClipboard::new());
    let manager = ClipboardHistoryManager::builder()
        .with_platform(clipboard.clone())
        .with_preferences(Arc::new(preferences))
        .with_settings(settings)
        .build();
    manager.set_history_change_listener(Some(Arc::new(LoggingListener)));
    manager.on_create();

    info!("Clipboard shell ready, type `help` for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, args) = line.split_once(' ').unwrap_or((line, ""));
        if command == "quit" || command == "exit" {
            break;
        }

        let span = span_command(command);
        let _entered = span.enter();
        if let Err(e) = run_command(&manager, &clipboard, command, args.trim()) {
            error!(command, error = %e, "command failed");
        }
    }

    manager.on_destroy();
    info!("Clipboard shell stopped");
    Ok(())
}

fn run_command(
    manager: &ClipboardHistoryManager,
    clipboard: &MemoryClipboard,
    command: &str,
    args: &str,
) -> Result<()> {
    match command {
        "help" => println!("{HELP}"),
        "copy" => {
            clipboard.set_text(args);
            manager.on_primary_clip_changed();
        }
        "image" => {
            let mut parts = args.split_whitespace();
            let Some(uri) = parts.next() else {
                bail!("usage: image <uri> [mime]");
            };
            clipboard.set_image(uri, parts.next().unwrap_or("image/png"));
            manager.on_primary_clip_changed();
        }
        "pin" => {
            let timestamp = args.parse().context("timestamp must be a number")?;
            manager.toggle_clip_pinned(timestamp)?;
        }
        "remove" => {
            let index = args.parse().context("index must be a number")?;
            manager.remove_entry(index)?;
        }
        "clear" => manager.clear_history(),
        "list" => {
            for (index, entry) in manager.entries().iter().enumerate() {
                let marker = if entry.pinned { "*" } else { " " };
                println!("{index:>3} {marker} {:>13}  {}", entry.timestamp, entry.content);
            }
        }
        "paste" => println!("{}", manager.retrieve_clipboard_content()),
        "enable" => manager.on_setting_changed(SettingChange::HistoryEnabled(parse_switch(args)?)),
        "retention" => {
            let minutes = args.parse().context("minutes must be a number")?;
            manager.on_setting_changed(SettingChange::RetentionMinutes(minutes));
        }
        "clear-primary" => {
            manager.on_setting_changed(SettingChange::ClearPrimaryClipboard(parse_switch(args)?));
        }
        "max" => {
            let max = args.parse().context("max must be a number")?;
            manager.on_setting_changed(SettingChange::MaxEntries(max));
        }
        "expire" => manager.check_retention_elapsed(),
        "stats" => {
            let stats = manager.stats();
            println!(
                "{} entries ({} pinned, {} images), {} bytes, retention scheduled: {}",
                stats.total_entries,
                stats.pinned_entries,
                stats.image_entries,
                stats.total_size,
                manager.is_retention_check_scheduled()
            );
        }
        other => bail!("unknown command `{other}`, try `help`"),
    }
    Ok(())
}

fn parse_switch(value: &str) -> Result<bool> {
    match value {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        other => bail!("expected on/off, got `{other}`"),
    }
}
