//! Headless in-memory [`HostPage`] implementation.
//!
//! Backs the demo binary and the test suite: a page with one optional
//! focused [`MemoryField`] and a plain-text document whose selection is
//! exposed as a [`MemoryRange`].  Alerts and input notifications are
//! recorded so tests can assert on them.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use super::{EditableField, HostPage, TextRange};

// ---------------------------------------------------------------------------
// MemoryField
// ---------------------------------------------------------------------------

struct FieldState {
    value: String,
    start: usize,
    end: usize,
}

/// In-memory editable field with UTF-16 selection offsets.
pub struct MemoryField {
    state: Mutex<FieldState>,
    input_events: AtomicUsize,
}

impl MemoryField {
    /// Create a field holding `value` with a collapsed caret at offset 0.
    pub fn new(value: &str) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FieldState {
                value: value.to_string(),
                start: 0,
                end: 0,
            }),
            input_events: AtomicUsize::new(0),
        })
    }

    /// Select `[start, end)` in UTF-16 code units.
    pub fn select(&self, start: usize, end: usize) {
        self.set_selection_range(start, end);
    }

    /// Number of synthetic input notifications raised so far.
    pub fn input_events(&self) -> usize {
        self.input_events.load(Ordering::SeqCst)
    }

    fn utf16_len(value: &str) -> usize {
        value.encode_utf16().count()
    }
}

impl EditableField for MemoryField {
    fn value(&self) -> String {
        self.state.lock().unwrap().value.clone()
    }

    fn set_value(&self, value: &str) {
        self.state.lock().unwrap().value = value.to_string();
    }

    fn selection_range(&self) -> (usize, usize) {
        let st = self.state.lock().unwrap();
        (st.start, st.end)
    }

    fn set_selection_range(&self, start: usize, end: usize) {
        let mut st = self.state.lock().unwrap();
        let len = Self::utf16_len(&st.value);
        st.start = start.min(len);
        st.end = end.min(len).max(st.start);
    }

    fn notify_input(&self) {
        self.input_events.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// MemoryRange
// ---------------------------------------------------------------------------

struct DocState {
    text: String,
    /// Byte offsets of the current selection range.
    sel_start: usize,
    sel_end: usize,
    /// Whether the page selection currently covers the range (vs. a caret).
    selected: bool,
}

/// Range over the page document's current selection.
pub struct MemoryRange {
    doc: Arc<Mutex<DocState>>,
}

impl TextRange for MemoryRange {
    fn text(&self) -> String {
        let doc = self.doc.lock().unwrap();
        doc.text[doc.sel_start..doc.sel_end].to_string()
    }

    fn replace_contents(&self, text: &str) {
        let mut doc = self.doc.lock().unwrap();
        let (start, end) = (doc.sel_start, doc.sel_end);
        doc.text.replace_range(start..end, text);
        doc.sel_end = start + text.len();
    }

    fn reselect(&self) {
        self.doc.lock().unwrap().selected = true;
    }

    fn collapse_after(&self) {
        let mut doc = self.doc.lock().unwrap();
        doc.sel_start = doc.sel_end;
        doc.selected = false;
    }
}

// ---------------------------------------------------------------------------
// MemoryPage
// ---------------------------------------------------------------------------

/// In-memory page: one optional focused field plus a plain-text document.
pub struct MemoryPage {
    focused: Mutex<Option<Arc<MemoryField>>>,
    doc: Arc<Mutex<DocState>>,
    alerts: Mutex<Vec<String>>,
    highlight: AtomicBool,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self {
            focused: Mutex::new(None),
            doc: Arc::new(Mutex::new(DocState {
                text: String::new(),
                sel_start: 0,
                sel_end: 0,
                selected: false,
            })),
            alerts: Mutex::new(Vec::new()),
            highlight: AtomicBool::new(false),
        }
    }

    /// Give keyboard focus to `field`.
    pub fn focus_field(&self, field: Arc<MemoryField>) {
        *self.focused.lock().unwrap() = Some(field);
    }

    /// Remove focus from any field.
    pub fn blur(&self) {
        *self.focused.lock().unwrap() = None;
    }

    /// Replace the document text and clear any selection.
    pub fn set_document(&self, text: &str) {
        {
            let mut doc = self.doc.lock().unwrap();
            doc.text = text.to_string();
            doc.sel_start = 0;
            doc.sel_end = 0;
            doc.selected = false;
        }
        // A real page drops the replaced-text style once the selection is gone.
        self.clear_selection_highlight();
    }

    /// Select the first occurrence of `needle` in the document.  Returns
    /// `false` when the document does not contain it.
    pub fn select_in_document(&self, needle: &str) -> bool {
        let found = {
            let mut doc = self.doc.lock().unwrap();
            match doc.text.find(needle) {
                Some(pos) => {
                    doc.sel_start = pos;
                    doc.sel_end = pos + needle.len();
                    doc.selected = true;
                    true
                }
                None => false,
            }
        };
        if found {
            self.clear_selection_highlight();
        }
        found
    }

    pub fn document_text(&self) -> String {
        self.doc.lock().unwrap().text.clone()
    }

    /// All alerts surfaced so far, oldest first.
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    /// Whether the replaced-text highlight is currently applied.
    pub fn highlight_active(&self) -> bool {
        self.highlight.load(Ordering::SeqCst)
    }
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl HostPage for MemoryPage {
    fn focused_field(&self) -> Option<Arc<dyn EditableField>> {
        self.focused.lock().unwrap().as_ref().map(|f| {
            let field: Arc<dyn EditableField> = f.clone();
            field
        })
    }

    fn active_range(&self) -> Option<Arc<dyn TextRange>> {
        let doc = self.doc.lock().unwrap();
        if doc.selected && doc.sel_end > doc.sel_start {
            Some(Arc::new(MemoryRange {
                doc: Arc::clone(&self.doc),
            }))
        } else {
            None
        }
    }

    fn selection_text(&self) -> String {
        let doc = self.doc.lock().unwrap();
        if doc.selected {
            doc.text[doc.sel_start..doc.sel_end].to_string()
        } else {
            String::new()
        }
    }

    fn alert(&self, message: &str) {
        log::info!("page alert: {message}");
        self.alerts.lock().unwrap().push(message.to_string());
    }

    fn apply_selection_highlight(&self) {
        self.highlight.store(true, Ordering::SeqCst);
    }

    fn clear_selection_highlight(&self) {
        self.highlight.store(false, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
