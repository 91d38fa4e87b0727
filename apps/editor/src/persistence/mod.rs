//! Persistence gateway: remote save and the local export it unlocks.
//!
//! Ordering contract: export is available only after a save succeeds, and
//! every new save attempt withdraws it until that attempt succeeds.

pub mod export;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::document::ResumeDocument;
use crate::errors::EditorError;
use crate::remote_client::RemoteCallError;

pub use export::{write_export, ExportJob, EXPORT_EXTENSION};

pub const DEFAULT_SAVE_MESSAGE: &str = "Resume saved successfully!";
pub const DEFAULT_SAVE_FAILURE: &str = "Failed to save resume";

/// Wire payload of a save call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveRequest {
    pub resume: Value,
    pub filename: String,
}

/// Success body of a save call. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SaveReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

/// The remote store. Implemented over HTTP by `ApiClient`.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn save(&self, request: &SaveRequest) -> Result<SaveReceipt, RemoteCallError>;
}

/// Filename dialog state, resolved by a single submit or cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenamePrompt {
    pub awaiting_filename: bool,
    pub proposed_filename: String,
}

#[derive(Debug, Clone)]
pub struct SaveTicket {
    pub attempt: u64,
    pub request: SaveRequest,
}

/// What the user is told after a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveConfirmation {
    pub filename: String,
    pub message: String,
    pub download_url: Option<String>,
    pub saved_at: DateTime<Utc>,
    /// False when a newer save attempt started before this one finished;
    /// such a confirmation does not unlock export.
    pub current: bool,
}

#[derive(Debug)]
pub struct PersistenceGateway {
    prompt: FilenamePrompt,
    last_saved_filename: Option<String>,
    last_saved_at: Option<DateTime<Utc>>,
    download_enabled: bool,
    latest_attempt: u64,
    in_flight: bool,
}

impl PersistenceGateway {
    pub fn new(default_filename: impl Into<String>) -> Self {
        Self {
            prompt: FilenamePrompt {
                awaiting_filename: false,
                proposed_filename: default_filename.into(),
            },
            last_saved_filename: None,
            last_saved_at: None,
            download_enabled: false,
            latest_attempt: 0,
            in_flight: false,
        }
    }

    pub fn prompt(&self) -> &FilenamePrompt {
        &self.prompt
    }

    pub fn last_saved_filename(&self) -> Option<&str> {
        self.last_saved_filename.as_deref()
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    pub fn download_enabled(&self) -> bool {
        self.download_enabled
    }

    pub fn save_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Opens the filename dialog, pre-filled with the last used name.
    pub fn open_prompt(&mut self) -> &FilenamePrompt {
        self.prompt.awaiting_filename = true;
        &self.prompt
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt.awaiting_filename = false;
    }

    /// Resolves the dialog. A blank submission keeps it open.
    pub fn submit_filename(
        &mut self,
        input: &str,
        document: &ResumeDocument,
    ) -> Result<SaveTicket, EditorError> {
        if !self.prompt.awaiting_filename {
            return Err(EditorError::Validation("No save is awaiting a filename".to_string()));
        }
        let ticket = self.begin_save(document, input)?;
        self.prompt.awaiting_filename = false;
        Ok(ticket)
    }

    /// Starts a save attempt: withdraws export, snapshots the document.
    pub fn begin_save(
        &mut self,
        document: &ResumeDocument,
        filename: &str,
    ) -> Result<SaveTicket, EditorError> {
        let filename = validate_filename(filename)?;

        self.download_enabled = false;
        self.latest_attempt += 1;
        self.in_flight = true;
        self.prompt.proposed_filename = filename.clone();

        info!("Saving resume as '{filename}' (attempt {})", self.latest_attempt);

        Ok(SaveTicket {
            attempt: self.latest_attempt,
            request: SaveRequest {
                resume: document.to_json_value(),
                filename,
            },
        })
    }

    pub fn complete_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<SaveReceipt, RemoteCallError>,
    ) -> Result<SaveConfirmation, EditorError> {
        let current = ticket.attempt == self.latest_attempt;
        if current {
            self.in_flight = false;
        }
        let filename = ticket.request.filename;

        match result {
            Ok(receipt) => {
                let saved_at = Utc::now();
                if current {
                    self.last_saved_filename = Some(filename.clone());
                    self.last_saved_at = Some(saved_at);
                    self.download_enabled = true;
                    info!("Saved resume as '{filename}'");
                } else {
                    info!("Save of '{filename}' finished after a newer attempt started");
                }
                Ok(SaveConfirmation {
                    filename,
                    message: receipt
                        .message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| DEFAULT_SAVE_MESSAGE.to_string()),
                    download_url: receipt.download_url,
                    saved_at,
                    current,
                })
            }
            Err(e) => {
                warn!("Save of '{filename}' failed: {e}");
                Err(EditorError::remote(e, DEFAULT_SAVE_FAILURE))
            }
        }
    }

    /// Prepares the local export of `document` under the last saved name.
    pub fn export_local(&self, document: &ResumeDocument) -> Result<ExportJob, EditorError> {
        match (&self.last_saved_filename, self.download_enabled) {
            (Some(filename), true) => ExportJob::new(document, filename),
            _ => Err(EditorError::ExportUnavailable),
        }
    }
}

fn validate_filename(input: &str) -> Result<String, EditorError> {
    let filename = input.trim();
    if filename.is_empty() {
        return Err(EditorError::Validation("Filename cannot be empty".to_string()));
    }
    if filename.contains(['/', '\\']) {
        return Err(EditorError::Validation(
            "Filename cannot contain path separators".to_string(),
        ));
    }
    Ok(filename.to_string())
}
