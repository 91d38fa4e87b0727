//! View/edit state machine for document fields.
//!
//! Every field starts in `Viewing`; at most one field is `Editing` at a time.
//! The edit buffer is scratch text and is written back only on commit.

use tracing::debug;

use crate::document::{display_rows, format_for_display, DocumentError, ResumeDocument};
use crate::errors::EditorError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldState {
    #[default]
    Viewing,
    Editing {
        field: String,
        buffer: String,
        seed: String,
    },
}

/// Result of leaving `Editing` through commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub field: String,
    /// False when the buffer still held the seed text and nothing was written.
    pub changed: bool,
}

/// Which entry of a list field has input focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFocus {
    pub field: String,
    pub index: usize,
}

#[derive(Debug, Default)]
pub struct FieldEditStateMachine {
    state: FieldState,
    list_focus: Option<ListFocus>,
}

impl FieldEditStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FieldState {
        &self.state
    }

    pub fn active_field(&self) -> Option<&str> {
        match &self.state {
            FieldState::Editing { field, .. } => Some(field),
            FieldState::Viewing => None,
        }
    }

    pub fn buffer(&self) -> Option<&str> {
        match &self.state {
            FieldState::Editing { buffer, .. } => Some(buffer),
            FieldState::Viewing => None,
        }
    }

    /// Enters `Editing` for `field`, seeding the buffer with its display text.
    /// A different field already in edit is committed first, as a blur would.
    pub fn activate(
        &mut self,
        document: &mut ResumeDocument,
        field: &str,
    ) -> Result<Option<Commit>, EditorError> {
        let value = document
            .get(field)
            .ok_or_else(|| DocumentError::UnknownField(field.to_string()))?;
        if self.active_field() == Some(field) {
            return Ok(None);
        }
        let seed = format_for_display(value);

        let previous = self.commit(document);
        debug!("Editing '{field}'");
        self.state = FieldState::Editing {
            field: field.to_string(),
            buffer: seed.clone(),
            seed,
        };
        self.list_focus = None;
        Ok(previous)
    }

    pub fn replace_buffer(&mut self, text: &str) -> Result<(), EditorError> {
        let buffer = self.buffer_mut()?;
        buffer.clear();
        buffer.push_str(text);
        Ok(())
    }

    /// Appends one line of typed text to the buffer.
    pub fn push_line(&mut self, line: &str) -> Result<(), EditorError> {
        let buffer = self.buffer_mut()?;
        if !buffer.is_empty() {
            buffer.push('\n');
        }
        buffer.push_str(line);
        Ok(())
    }

    /// Leaves `Editing`, writing the buffer through `set_field` unless it is
    /// unchanged from its seed. Returns `None` when nothing was in edit.
    pub fn commit(&mut self, document: &mut ResumeDocument) -> Option<Commit> {
        match std::mem::take(&mut self.state) {
            FieldState::Viewing => None,
            FieldState::Editing {
                field,
                buffer,
                seed,
            } => {
                let changed = buffer != seed;
                if changed {
                    document.set_field(&field, &buffer);
                }
                debug!("Committed '{field}' (changed: {changed})");
                Some(Commit { field, changed })
            }
        }
    }

    /// Leaves `Editing` without writing. Returns the field that was in edit.
    pub fn cancel(&mut self) -> Option<String> {
        match std::mem::take(&mut self.state) {
            FieldState::Viewing => None,
            FieldState::Editing { field, .. } => Some(field),
        }
    }

    /// Display rows for `field`: from the buffer while it is in edit, from the
    /// committed value otherwise.
    pub fn rows(&self, document: &ResumeDocument, field: &str) -> usize {
        match &self.state {
            FieldState::Editing { field: f, buffer, .. } if f == field => display_rows(buffer),
            _ => document
                .get(field)
                .map(|value| display_rows(&format_for_display(value)))
                .unwrap_or_else(|| display_rows("")),
        }
    }

    pub fn list_focus(&self) -> Option<&ListFocus> {
        self.list_focus.as_ref()
    }

    pub fn focus_list_entry(&mut self, field: &str, index: usize) {
        self.list_focus = Some(ListFocus {
            field: field.to_string(),
            index,
        });
    }

    /// Keeps focus on the same entry after `removed` is taken out of `field`.
    /// Removing the focused entry clears focus instead of moving it.
    pub fn on_list_entry_removed(&mut self, field: &str, removed: usize) {
        let Some(focus) = self.list_focus.as_mut() else {
            return;
        };
        if focus.field != field {
            return;
        }
        if focus.index == removed {
            self.list_focus = None;
        } else if focus.index > removed {
            focus.index -= 1;
        }
    }

    fn buffer_mut(&mut self) -> Result<&mut String, EditorError> {
        match &mut self.state {
            FieldState::Editing { buffer, .. } => Ok(buffer),
            FieldState::Viewing => Err(EditorError::Validation(
                "No field is being edited".to_string(),
            )),
        }
    }
}
