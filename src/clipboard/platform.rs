/*!
 * Platform Clipboard
 * Abstraction over the system clipboard the history observes
 */

use super::types::ClipboardContent;
use crate::core::types::Timestamp;
use parking_lot::RwLock;

/// One item of a clip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipItem {
    Text(String),
    Uri(String),
}

impl ClipItem {
    /// Best-effort text representation of the item
    #[must_use]
    pub fn coerce_to_text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Uri(text) => text,
        }
    }
}

/// Snapshot of the platform's primary clip
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipData {
    pub mime_types: Vec<String>,
    pub items: Vec<ClipItem>,
    /// Time the platform recorded the clip, when it reports one
    pub timestamp: Option<Timestamp>,
}

impl ClipData {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            mime_types: vec!["text/plain".to_string()],
            items: vec![ClipItem::Text(text.into())],
            timestamp: None,
        }
    }

    #[must_use]
    pub fn image(uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            mime_types: vec![mime_type.into()],
            items: vec![ClipItem::Uri(uri.into())],
            timestamp: None,
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Check whether any of the clip's mime types matches `pattern`.
    /// `*/*` and `type/*` wildcards are honoured on either side.
    #[must_use]
    pub fn has_mime_type(&self, pattern: &str) -> bool {
        self.mime_types
            .iter()
            .any(|mime| mime_matches(mime, pattern) || mime_matches(pattern, mime))
    }

    fn first_mime_matching(&self, pattern: &str) -> Option<&str> {
        self.mime_types
            .iter()
            .find(|mime| mime_matches(mime, pattern))
            .map(String::as_str)
    }

    /// Convert the first item into history content.
    ///
    /// Text clips are coerced to text. Image clips are kept only when the
    /// item is a URI. Anything else is not recorded.
    #[must_use]
    pub fn to_content(&self) -> Option<ClipboardContent> {
        let item = self.items.first()?;

        if self.has_mime_type("text/*") {
            let text = item.coerce_to_text();
            return (!text.is_empty()).then(|| ClipboardContent::text(text));
        }

        if let (Some(mime_type), ClipItem::Uri(uri)) = (self.first_mime_matching("image/*"), item)
        {
            if !uri.is_empty() {
                return Some(ClipboardContent::image(uri.as_str(), mime_type));
            }
        }

        None
    }
}

fn mime_matches(concrete: &str, pattern: &str) -> bool {
    if pattern == "*/*" {
        return true;
    }
    match pattern.split_once('/') {
        Some((kind, "*")) => concrete
            .split_once('/')
            .is_some_and(|(concrete_kind, _)| concrete_kind.eq_ignore_ascii_case(kind)),
        _ => concrete.eq_ignore_ascii_case(pattern),
    }
}

/// The system clipboard seen by the history manager
pub trait PlatformClipboard: Send + Sync {
    /// Current primary clip, if any
    fn primary_clip(&self) -> Option<ClipData>;

    /// Clear the primary clip
    fn clear_primary_clip(&self);
}

/// In-process clipboard for headless hosts
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    primary: RwLock<Option<ClipData>>,
}

impl MemoryClipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_primary_clip(&self, clip: ClipData) {
        *self.primary.write() = Some(clip);
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.set_primary_clip(ClipData::text(text));
    }

    pub fn set_image(&self, uri: impl Into<String>, mime_type: impl Into<String>) {
        self.set_primary_clip(ClipData::image(uri, mime_type));
    }
}

impl PlatformClipboard for MemoryClipboard {
    fn primary_clip(&self) -> Option<ClipData> {
        self.primary.read().clone()
    }

    fn clear_primary_clip(&self) {
        self.primary.write().take();
    }
}
