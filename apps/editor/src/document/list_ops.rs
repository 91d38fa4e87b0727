//! Entry-level edits for `ScalarList` fields (the skills chips).

use super::{DocumentError, FieldValue, ResumeDocument};

impl ResumeDocument {
    /// Appends an empty placeholder entry and returns its index.
    pub fn append_list_entry(&mut self, field: &str) -> Result<usize, DocumentError> {
        let items = self.list_mut(field)?;
        items.push(String::new());
        Ok(items.len() - 1)
    }

    /// Replaces the entry at `index` with `text`, stored as typed.
    pub fn update_list_entry(
        &mut self,
        field: &str,
        index: usize,
        text: &str,
    ) -> Result<(), DocumentError> {
        let items = self.list_mut(field)?;
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or_else(|| DocumentError::IndexOutOfRange {
                field: field.to_string(),
                index,
                len,
            })?;
        *slot = text.to_string();
        Ok(())
    }

    /// Removes the entry at `index`; later entries move down by one.
    pub fn remove_list_entry(&mut self, field: &str, index: usize) -> Result<String, DocumentError> {
        let items = self.list_mut(field)?;
        if index >= items.len() {
            return Err(DocumentError::IndexOutOfRange {
                field: field.to_string(),
                index,
                len: items.len(),
            });
        }
        Ok(items.remove(index))
    }

    fn list_mut(&mut self, field: &str) -> Result<&mut Vec<String>, DocumentError> {
        match self.get_mut(field) {
            Some(FieldValue::ScalarList(items)) => Ok(items),
            Some(_) => Err(DocumentError::NotAList(field.to_string())),
            None => Err(DocumentError::UnknownField(field.to_string())),
        }
    }
}
