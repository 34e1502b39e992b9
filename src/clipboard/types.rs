/*!
 * Clipboard Types
 * Clipboard entries, content variants, and their persisted JSON shape
 */

use crate::core::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::fmt;

/// Clipboard format types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ClipboardFormat {
    /// Plain text
    Text,
    /// Image referenced by URI
    Image { mime_type: String },
}

impl ClipboardFormat {
    /// Get MIME type string
    #[must_use]
    pub fn mime_type(&self) -> &str {
        match self {
            Self::Text => "text/plain",
            Self::Image { mime_type } => mime_type,
        }
    }
}

/// Image clip stored by reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageClip {
    pub uri: String,
    pub mime_type: String,
}

/// Clip content.
///
/// Untagged so that text clips persist as a bare JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClipboardContent {
    Text(String),
    Image(ImageClip),
}

impl ClipboardContent {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    #[must_use]
    pub fn image(uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self::Image(ImageClip {
            uri: uri.into(),
            mime_type: mime_type.into(),
        })
    }

    /// Get the format of this content
    #[must_use]
    pub fn format(&self) -> ClipboardFormat {
        match self {
            Self::Text(_) => ClipboardFormat::Text,
            Self::Image(image) => ClipboardFormat::Image {
                mime_type: image.mime_type.clone(),
            },
        }
    }

    /// Get size in bytes
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Text(s) => s.len(),
            Self::Image(image) => image.uri.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Image(image) => image.uri.is_empty(),
        }
    }

    /// Text to commit when the clip is pasted
    #[must_use]
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(s) => s,
            Self::Image(image) => &image.uri,
        }
    }
}

impl fmt::Display for ClipboardContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Image(image) => write!(f, "[{}] {}", image.mime_type, image.uri),
        }
    }
}

/// Clipboard history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardEntry {
    /// Time the clip was made (or last re-copied / toggled)
    #[serde(rename = "timeStamp")]
    pub timestamp: Timestamp,
    pub content: ClipboardContent,
    /// Pinned entries survive clearing and retention
    #[serde(rename = "isPinned", default)]
    pub pinned: bool,
}

impl ClipboardEntry {
    #[must_use]
    pub fn new(timestamp: Timestamp, content: ClipboardContent) -> Self {
        Self {
            timestamp,
            content,
            pinned: false,
        }
    }

    #[must_use]
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    /// History order: pinned first, then newest first
    #[inline]
    #[must_use]
    pub fn sort_key(&self) -> (Reverse<bool>, Reverse<Timestamp>) {
        (Reverse(self.pinned), Reverse(self.timestamp))
    }

    #[must_use]
    pub fn order(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.content.size()
    }

    #[must_use]
    pub fn format(&self) -> ClipboardFormat {
        self.content.format()
    }
}

/// Clipboard statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardStats {
    pub total_entries: usize,
    pub pinned_entries: usize,
    pub image_entries: usize,
    /// Total content size in bytes
    pub total_size: usize,
}
