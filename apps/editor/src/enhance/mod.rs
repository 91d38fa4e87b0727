//! Enhancement orchestration: per-field "rewrite this text" requests.
//!
//! Flow: `begin()` validates and marks the field pending → the caller runs the
//! request against an `EnhanceService` off the event loop → `complete()` applies
//! the result on the event loop and clears the pending mark.
//!
//! There is no global lock: each field has at most one request in flight, and
//! different fields may be in flight together.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::document::{flatten_for_enhancement, FieldValue, ResumeDocument};
use crate::errors::EditorError;
use crate::remote_client::RemoteCallError;

/// Identity, contact and skills fields are never offered for enhancement.
pub const NON_ENHANCEABLE_FIELDS: &[&str] = &["name", "email", "phone", "skills"];

pub fn is_enhanceable(field: &str) -> bool {
    !NON_ENHANCEABLE_FIELDS
        .iter()
        .any(|excluded| excluded.eq_ignore_ascii_case(field))
}

/// Wire payload of an enhancement call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhanceRequest {
    pub section: String,
    pub content: String,
}

/// The enhancement backend. Implemented over HTTP by `ApiClient`; tests
/// substitute their own.
#[async_trait]
pub trait EnhanceService: Send + Sync {
    async fn enhance(&self, request: &EnhanceRequest) -> Result<String, RemoteCallError>;
}

/// An accepted request. `revision` is the field's edit revision when the
/// request started, used to notice completions that land after a manual edit.
#[derive(Debug, Clone)]
pub struct EnhanceTicket {
    pub field: String,
    pub request: EnhanceRequest,
    pub revision: u64,
}

#[derive(Debug, Default)]
pub struct EnhancementOrchestrator {
    pending: BTreeSet<String>,
}

impl EnhancementOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self, field: &str) -> bool {
        self.pending.contains(field)
    }

    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    /// Whether the enhance action should be shown as available for `field`.
    pub fn can_offer(&self, field: &str) -> bool {
        is_enhanceable(field) && !self.is_pending(field)
    }

    /// Validates and registers a request for `field`. Rejections never reach
    /// the network and leave all state untouched.
    pub fn begin(
        &mut self,
        field: &str,
        current: &FieldValue,
        revision: u64,
    ) -> Result<EnhanceTicket, EditorError> {
        if !is_enhanceable(field) {
            return Err(EditorError::NotEnhanceable(field.to_string()));
        }
        if self.is_pending(field) {
            return Err(EditorError::AlreadyPending(field.to_string()));
        }

        let content = flatten_for_enhancement(current);
        if content.trim().is_empty() {
            return Err(EditorError::Validation(format!(
                "Cannot enhance empty {field} field"
            )));
        }

        self.pending.insert(field.to_string());
        info!("Enhancing '{field}' ({} chars)", content.len());

        Ok(EnhanceTicket {
            field: field.to_string(),
            request: EnhanceRequest {
                section: field.to_string(),
                content,
            },
            revision,
        })
    }

    /// Applies a finished request. On success the field becomes the returned
    /// text verbatim; on failure the document is untouched. Either way the
    /// field is no longer pending.
    pub fn complete(
        &mut self,
        document: &mut ResumeDocument,
        ticket: EnhanceTicket,
        result: Result<String, RemoteCallError>,
        current_revision: u64,
    ) -> Result<(), EditorError> {
        self.pending.remove(&ticket.field);

        match result {
            Ok(enhanced) => {
                if current_revision != ticket.revision {
                    warn!(
                        "Enhancement for '{}' overwrites an edit made while it was in flight",
                        ticket.field
                    );
                }
                document.replace(&ticket.field, FieldValue::Scalar(enhanced));
                info!("Enhanced '{}'", ticket.field);
                Ok(())
            }
            Err(e) => {
                warn!("Enhancement for '{}' failed: {e}", ticket.field);
                Err(EditorError::remote(
                    e,
                    &format!("Failed to enhance {}", ticket.field),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> ResumeDocument {
        ResumeDocument::from_value(json!({
            "name": "Ada",
            "objective": "I build things",
            "summary": "   ",
            "accomplishments": [],
            "projects": [{"title": "Shop", "link": "x.dev"}]
        }))
        .unwrap()
    }

    fn begin(
        orch: &mut EnhancementOrchestrator,
        d: &ResumeDocument,
        field: &str,
    ) -> Result<EnhanceTicket, EditorError> {
        orch.begin(field, d.get(field).unwrap(), 0)
    }

    #[test]
    fn test_excluded_fields_are_never_offered() {
        let orch = EnhancementOrchestrator::new();
        for field in ["name", "email", "phone", "skills", "Skills"] {
            assert!(!orch.can_offer(field), "{field} must not be offered");
        }
        assert!(orch.can_offer("objective"));
    }

    #[test]
    fn test_begin_rejects_excluded_field() {
        let mut orch = EnhancementOrchestrator::new();
        let d = doc();
        assert!(matches!(
            begin(&mut orch, &d, "name"),
            Err(EditorError::NotEnhanceable(_))
        ));
        assert_eq!(orch.pending().count(), 0);
    }

    #[test]
    fn test_begin_rejects_empty_values() {
        let mut orch = EnhancementOrchestrator::new();
        let d = doc();
        for field in ["summary", "accomplishments"] {
            let err = begin(&mut orch, &d, field).unwrap_err();
            assert!(matches!(err, EditorError::Validation(_)));
            assert!(!orch.is_pending(field));
        }
    }

    #[test]
    fn test_begin_flattens_records() {
        let mut orch = EnhancementOrchestrator::new();
        let ticket = begin(&mut orch, &doc(), "projects").unwrap();
        assert_eq!(
            ticket.request,
            EnhanceRequest {
                section: "projects".into(),
                content: "title: Shop, link: x.dev".into()
            }
        );
    }

    #[test]
    fn test_pending_is_per_field() {
        let mut orch = EnhancementOrchestrator::new();
        let d = doc();
        begin(&mut orch, &d, "objective").unwrap();
        begin(&mut orch, &d, "projects").unwrap();
        assert!(matches!(
            begin(&mut orch, &d, "objective"),
            Err(EditorError::AlreadyPending(_))
        ));
        assert_eq!(orch.pending().collect::<Vec<_>>(), vec!["objective", "projects"]);
    }

    #[test]
    fn test_complete_success_replaces_value_verbatim() {
        let mut orch = EnhancementOrchestrator::new();
        let mut d = doc();
        let objective = begin(&mut orch, &d, "objective").unwrap();
        begin(&mut orch, &d, "projects").unwrap();

        let enhanced = r#"["looks", "like", "json"]"#.to_string();
        orch.complete(&mut d, objective, Ok(enhanced.clone()), 0).unwrap();

        assert_eq!(d.get("objective"), Some(&FieldValue::Scalar(enhanced)));
        assert!(!orch.is_pending("objective"));
        assert!(orch.is_pending("projects"));
    }

    #[test]
    fn test_complete_failure_keeps_value_and_clears_pending() {
        let mut orch = EnhancementOrchestrator::new();
        let mut d = doc();
        let before = d.clone();
        let ticket = begin(&mut orch, &d, "objective").unwrap();

        let err = orch
            .complete(&mut d, ticket, Err(RemoteCallError::EmptyContent), 0)
            .unwrap_err();

        assert_eq!(err.to_string(), "No enhanced content received");
        assert_eq!(d, before);
        assert!(!orch.is_pending("objective"));
        assert!(begin(&mut orch, &d, "objective").is_ok(), "retry must be possible");
    }

    #[test]
    fn test_complete_after_newer_edit_still_wins() {
        let mut orch = EnhancementOrchestrator::new();
        let mut d = doc();
        let ticket = begin(&mut orch, &d, "objective").unwrap();
        d.set_field("objective", "typed meanwhile");

        orch.complete(&mut d, ticket, Ok("from service".into()), 1).unwrap();
        assert_eq!(d.get("objective"), Some(&FieldValue::Scalar("from service".into())));
    }
}
