//! Transient per-view editing state.
//!
//! An `EditSession` is created with the document and dropped with it. It owns
//! the field edit state machine, the enhancement pending set and the save/export
//! gate, plus a per-field revision counter bumped by manual edits.

pub mod field_edit;

use std::collections::HashMap;

use crate::enhance::EnhancementOrchestrator;
use crate::persistence::PersistenceGateway;

pub use field_edit::{Commit, FieldEditStateMachine, FieldState, ListFocus};

#[derive(Debug)]
pub struct EditSession {
    pub fields: FieldEditStateMachine,
    pub enhancement: EnhancementOrchestrator,
    pub persistence: PersistenceGateway,
    revisions: HashMap<String, u64>,
}

impl EditSession {
    pub fn new(default_filename: impl Into<String>) -> Self {
        Self {
            fields: FieldEditStateMachine::new(),
            enhancement: EnhancementOrchestrator::new(),
            persistence: PersistenceGateway::new(default_filename),
            revisions: HashMap::new(),
        }
    }

    pub fn active_field(&self) -> Option<&str> {
        self.fields.active_field()
    }

    pub fn pending_enhancement(&self) -> Vec<&str> {
        self.enhancement.pending().collect()
    }

    pub fn last_saved_filename(&self) -> Option<&str> {
        self.persistence.last_saved_filename()
    }

    pub fn download_enabled(&self) -> bool {
        self.persistence.download_enabled()
    }

    pub fn revision(&self, field: &str) -> u64 {
        self.revisions.get(field).copied().unwrap_or(0)
    }

    /// Records a manual change to `field`.
    pub fn bump_revision(&mut self, field: &str) {
        *self.revisions.entry(field.to_string()).or_insert(0) += 1;
    }
}
