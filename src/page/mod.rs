//! Host-page abstraction — the surface the selection and replacement code
//! operates on.
//!
//! The crate never talks to a concrete document model directly.  Everything
//! goes through three traits:
//!
//! * [`EditableField`] — a native text-input-like control with its own
//!   internal selection offsets (UTF-16 code units, matching the field's
//!   native offset semantics).
//! * [`TextRange`] — a selection spanning arbitrary page content, manipulated
//!   by replacing its contents as a whole.
//! * [`HostPage`] — the page itself: focused field, active range, alerts and
//!   the temporary selection highlight.
//!
//! [`memory`] provides a headless in-memory implementation used by the demo
//! binary and the test suite.

pub mod memory;

pub use memory::{MemoryField, MemoryPage, MemoryRange};

use std::sync::Arc;

// ---------------------------------------------------------------------------
// EditableField
// ---------------------------------------------------------------------------

/// Handle to a focused editable field (text input / textarea equivalent).
///
/// All offsets are **UTF-16 code units** — the native offset space of such
/// fields — not bytes and not chars.
pub trait EditableField: Send + Sync {
    /// Full current value of the field.
    fn value(&self) -> String;

    /// Overwrite the full value of the field.
    fn set_value(&self, value: &str);

    /// Current `(start, end)` selection offsets.  `start == end` means a
    /// collapsed caret.
    fn selection_range(&self) -> (usize, usize);

    /// Move the selection (or caret, when `start == end`).
    fn set_selection_range(&self, start: usize, end: usize);

    /// Raise a synthetic input-changed notification so host-page reactive
    /// frameworks observe the mutation.
    fn notify_input(&self);
}

// ---------------------------------------------------------------------------
// TextRange
// ---------------------------------------------------------------------------

/// Handle to a generic selection range over page content.
pub trait TextRange: Send + Sync {
    /// Text currently covered by the range.
    fn text(&self) -> String;

    /// Delete the range's contents and insert `text` in their place.  The
    /// range afterwards covers the inserted text.
    fn replace_contents(&self, text: &str);

    /// Restore the page selection so it covers this range.
    fn reselect(&self);

    /// Collapse the page selection to a caret immediately after this range.
    fn collapse_after(&self);
}

// ---------------------------------------------------------------------------
// HostPage
// ---------------------------------------------------------------------------

/// The page a content context is attached to.
pub trait HostPage: Send + Sync {
    /// The focused element, when it is an editable field.
    fn focused_field(&self) -> Option<Arc<dyn EditableField>>;

    /// First range of the active page selection, when one exists.
    fn active_range(&self) -> Option<Arc<dyn TextRange>>;

    /// Plain-text rendering of the active page selection (empty when none).
    fn selection_text(&self) -> String;

    /// Surface a user-facing message (the extension equivalent of `alert`).
    fn alert(&self, message: &str);

    /// Apply the temporary replaced-text highlight style.  The page removes
    /// it on its own when the selection changes or becomes empty.
    fn apply_selection_highlight(&self);

    /// Remove the temporary highlight style, if present.
    fn clear_selection_highlight(&self);
}
