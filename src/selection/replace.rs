//! In-place replacement of a previously captured selection.
//!
//! [`TextMutator::replace`] takes the consumed [`CachedSelectionInfo`] and
//! splices the replacement text into the original location: a UTF-16
//! code-unit splice for editable fields, a range content replacement
//! otherwise.  A synthetic input notification is raised afterwards so
//! host-page reactive frameworks observe the mutation.

use thiserror::Error;

use crate::page::HostPage;

use super::{utf16_len, utf16_splice, CachedSelectionInfo, SelectionTarget};

// ---------------------------------------------------------------------------
// ReplacePolicy
// ---------------------------------------------------------------------------

/// Where the selection lands after a replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum ReplacePolicy {
    /// Collapse the caret immediately after the inserted text.
    #[default]
    CaretAfter,
    /// Keep the inserted text selected and apply the temporary highlight
    /// style (removed by the page when the selection changes).
    KeepSelected,
}

// ---------------------------------------------------------------------------
// ReplaceError
// ---------------------------------------------------------------------------

/// Errors surfaced by [`TextMutator::replace`].
#[derive(Debug, Error)]
pub enum ReplaceError {
    /// `replace` was called with no consumed selection — the cache was empty.
    #[error("Selection was lost. Please try again.")]
    SelectionLost,
}

// ---------------------------------------------------------------------------
// TextMutator
// ---------------------------------------------------------------------------

/// Performs the in-place substitution for a consumed selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextMutator {
    policy: ReplacePolicy,
}

impl TextMutator {
    pub fn new(policy: ReplacePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ReplacePolicy {
        self.policy
    }

    /// Replace the captured selection with `text`.
    ///
    /// `info` is the entry returned by [`SelectionCache::consume`]
    /// (`crate::selection::SelectionCache::consume`); passing `None`
    /// returns [`ReplaceError::SelectionLost`] and mutates nothing.
    pub fn replace(
        &self,
        page: &dyn HostPage,
        info: Option<CachedSelectionInfo>,
        text: &str,
    ) -> Result<(), ReplaceError> {
        let info = info.ok_or(ReplaceError::SelectionLost)?;

        match info.target {
            SelectionTarget::Field {
                field,
                start,
                end,
                value,
            } => {
                let new_value = utf16_splice(&value, start, end, text);
                field.set_value(&new_value);

                match self.policy {
                    ReplacePolicy::CaretAfter => {
                        let caret = start + utf16_len(text);
                        field.set_selection_range(caret, caret);
                    }
                    ReplacePolicy::KeepSelected => {
                        field.set_selection_range(start, start + utf16_len(text));
                        page.apply_selection_highlight();
                    }
                }

                field.notify_input();
            }

            SelectionTarget::Range { range } => {
                range.replace_contents(text);

                match self.policy {
                    ReplacePolicy::CaretAfter => range.collapse_after(),
                    ReplacePolicy::KeepSelected => {
                        range.reselect();
                        page.apply_selection_highlight();
                    }
                }
            }
        }

        log::debug!("replace: inserted {} chars", text.chars().count());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
