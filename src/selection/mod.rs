//! Selection capture and caching.
//!
//! [`SelectionCache`] bridges an asynchronous user action (selecting text)
//! and a later asynchronous completion (a proofreading or transcription
//! result arriving).  [`capture`](SelectionCache::capture) inspects the page
//! once and stores a tagged [`SelectionTarget`]; [`consume`](SelectionCache::consume)
//! hands it out exactly once.
//!
//! One cache instance exists per content context — no module-level state —
//! so a cached selection can never leak across contexts.

pub mod replace;

pub use replace::{ReplaceError, ReplacePolicy, TextMutator};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::page::{EditableField, HostPage, TextRange};

// ---------------------------------------------------------------------------
// UTF-16 offset helpers
// ---------------------------------------------------------------------------

/// Length of `value` in UTF-16 code units (the native field offset space).
pub(crate) fn utf16_len(value: &str) -> usize {
    value.encode_utf16().count()
}

/// Substring of `value` covering UTF-16 code units `[start, end)`.
///
/// Offsets are clamped to the value length; a start past the end yields an
/// empty string.
pub(crate) fn utf16_slice(value: &str, start: usize, end: usize) -> String {
    let units: Vec<u16> = value.encode_utf16().collect();
    let start = start.min(units.len());
    let end = end.min(units.len()).max(start);
    String::from_utf16_lossy(&units[start..end])
}

/// Splice `insert` into `value` between UTF-16 code units `start` and `end`.
pub(crate) fn utf16_splice(value: &str, start: usize, end: usize, insert: &str) -> String {
    let units: Vec<u16> = value.encode_utf16().collect();
    let start = start.min(units.len());
    let end = end.min(units.len()).max(start);

    let mut out: Vec<u16> = Vec::with_capacity(units.len() + utf16_len(insert));
    out.extend_from_slice(&units[..start]);
    out.extend(insert.encode_utf16());
    out.extend_from_slice(&units[end..]);
    String::from_utf16_lossy(&out)
}

// ---------------------------------------------------------------------------
// SelectionSnapshot
// ---------------------------------------------------------------------------

/// Which kind of target a selection was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    /// A native text-input-like control with internal offsets.
    EditableField,
    /// A generic page selection range.
    GenericRange,
}

/// Read-only result of a [`SelectionCache::capture`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSnapshot {
    /// The selected text itself (empty when nothing was selected).
    pub selected_text: String,
    /// Surrounding context: the full field value for editable fields, the
    /// selected text itself otherwise.
    pub context_text: String,
    pub source_type: SourceType,
}

// ---------------------------------------------------------------------------
// SelectionTarget / CachedSelectionInfo
// ---------------------------------------------------------------------------

/// Tagged handle to the place a replacement must land, decided once at
/// capture time.
pub enum SelectionTarget {
    /// An editable field plus the offsets and value observed at capture time.
    Field {
        field: Arc<dyn EditableField>,
        /// UTF-16 code-unit offsets of the selection at capture time.
        start: usize,
        end: usize,
        /// Full field value at capture time — the splice source, so a page
        /// script mutating the field in between does not shift the offsets.
        value: String,
    },
    /// A generic page range.
    Range { range: Arc<dyn TextRange> },
}

impl std::fmt::Debug for SelectionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionTarget::Field { start, end, value, .. } => f
                .debug_struct("Field")
                .field("start", start)
                .field("end", end)
                .field("value", value)
                .finish_non_exhaustive(),
            SelectionTarget::Range { .. } => f.debug_struct("Range").finish_non_exhaustive(),
        }
    }
}

/// The single live cached selection, consumed (read-once) by
/// [`TextMutator::replace`].
#[derive(Debug)]
pub struct CachedSelectionInfo {
    pub target: SelectionTarget,
}

// ---------------------------------------------------------------------------
// SelectionCache
// ---------------------------------------------------------------------------

/// Owns at most one live [`CachedSelectionInfo`] at a time.
///
/// Every [`capture`](Self::capture) overwrites the previous entry;
/// [`consume`](Self::consume) clears it, so a stale selection can never be
/// replaced into twice.
#[derive(Debug, Default)]
pub struct SelectionCache {
    cached: Option<CachedSelectionInfo>,
}

impl SelectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the page and capture the current selection.
    ///
    /// Editable fields win over generic ranges: when the focused element is a
    /// field, its internal offsets and full value are recorded.  Otherwise the
    /// active page range is cached when one exists; when neither is available
    /// the cache is left empty and the snapshot carries empty text.
    pub fn capture(&mut self, page: &dyn HostPage) -> SelectionSnapshot {
        if let Some(field) = page.focused_field() {
            let (start, end) = field.selection_range();
            let value = field.value();
            let selected_text = utf16_slice(&value, start, end);

            self.cached = Some(CachedSelectionInfo {
                target: SelectionTarget::Field {
                    field,
                    start,
                    end,
                    value: value.clone(),
                },
            });

            return SelectionSnapshot {
                selected_text,
                context_text: value,
                source_type: SourceType::EditableField,
            };
        }

        let selected_text = page.selection_text();
        match page.active_range() {
            Some(range) => {
                self.cached = Some(CachedSelectionInfo {
                    target: SelectionTarget::Range { range },
                });
            }
            None => {
                log::debug!("selection: no active range to capture");
                self.cached = None;
            }
        }

        SelectionSnapshot {
            context_text: selected_text.clone(),
            selected_text,
            source_type: SourceType::GenericRange,
        }
    }

    /// Take the cached entry, clearing the cache.
    ///
    /// A second call without an intervening [`capture`](Self::capture)
    /// returns `None`.
    pub fn consume(&mut self) -> Option<CachedSelectionInfo> {
        self.cached.take()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{MemoryField, MemoryPage};

    #[test]
    fn utf16_slice_basic() {
        assert_eq!(utf16_slice("Hello world", 6, 11), "world");
        assert_eq!(utf16_slice("Hello", 0, 0), "");
        assert_eq!(utf16_slice("Hello", 3, 99), "lo");
    }

    #[test]
    fn utf16_splice_counts_surrogate_pairs() {
        // "𝄞" is one char but two UTF-16 code units.
        let value = "𝄞abc";
        assert_eq!(utf16_len(value), 5);
        assert_eq!(utf16_splice(value, 2, 3, "X"), "𝄞Xbc");
    }

    #[test]
    fn capture_field_returns_selected_substring_and_full_context() {
        let page = MemoryPage::new();
        let field = MemoryField::new("Hello world");
        field.select(6, 11);
        page.focus_field(field);

        let mut cache = SelectionCache::new();
        let snap = cache.capture(&page);

        assert_eq!(snap.selected_text, "world");
        assert_eq!(snap.context_text, "Hello world");
        assert_eq!(snap.source_type, SourceType::EditableField);
    }

    #[test]
    fn capture_range_uses_selection_text_as_context() {
        let page = MemoryPage::new();
        page.set_document("some page text");
        page.select_in_document("page");

        let mut cache = SelectionCache::new();
        let snap = cache.capture(&page);

        assert_eq!(snap.selected_text, "page");
        assert_eq!(snap.context_text, "page");
        assert_eq!(snap.source_type, SourceType::GenericRange);
    }

    #[test]
    fn capture_with_nothing_selected_leaves_cache_empty() {
        let page = MemoryPage::new();
        let mut cache = SelectionCache::new();

        let snap = cache.capture(&page);
        assert_eq!(snap.selected_text, "");
        assert!(cache.consume().is_none());
    }

    #[test]
    fn consume_returns_snapshot_exactly_once() {
        let page = MemoryPage::new();
        let field = MemoryField::new("abc");
        field.select(0, 3);
        page.focus_field(field);

        let mut cache = SelectionCache::new();
        cache.capture(&page);

        assert!(cache.consume().is_some());
        assert!(cache.consume().is_none());
    }

    #[test]
    fn new_capture_overwrites_previous_entry() {
        let page = MemoryPage::new();
        let field = MemoryField::new("first");
        field.select(0, 5);
        page.focus_field(field);

        let mut cache = SelectionCache::new();
        cache.capture(&page);

        let field2 = MemoryField::new("second");
        field2.select(0, 6);
        page.focus_field(field2);
        cache.capture(&page);

        let info = cache.consume().expect("cached entry");
        match info.target {
            SelectionTarget::Field { value, .. } => assert_eq!(value, "second"),
            SelectionTarget::Range { .. } => panic!("expected field target"),
        }
        assert!(cache.consume().is_none());
    }

    #[test]
    fn source_type_serializes_kebab_case() {
        let json = serde_json::to_string(&SourceType::EditableField).unwrap();
        assert_eq!(json, "\"editable-field\"");
        let json = serde_json::to_string(&SourceType::GenericRange).unwrap();
        assert_eq!(json, "\"generic-range\"");
    }
}
