//! Editor: owns the document and session and reacts to discrete events.
//!
//! Everything that mutates the document runs on the caller's task. Network
//! calls, the export write and preview loading are spawned; their results come
//! back as `Completion`s through an unbounded channel and are applied with
//! `apply()`. An in-flight request therefore never blocks editing, another
//! enhancement, or a save.

pub mod command;
pub mod view;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

use crate::document::{DocumentError, ResumeDocument};
use crate::enhance::{EnhanceService, EnhanceTicket};
use crate::errors::EditorError;
use crate::persistence::{
    write_export, FilenamePrompt, ResumeStore, SaveReceipt, SaveTicket,
};
use crate::preview::{PreviewSignal, PreviewSource, PreviewState};
use crate::remote_client::RemoteCallError;
use crate::session::{Commit, EditSession};

/// Name of the list field with chip-style entry editing.
pub const SKILLS_FIELD: &str = "skills";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl From<&EditorError> for Notice {
    fn from(err: &EditorError) -> Self {
        Notice::error(err.to_string())
    }
}

/// Result of work that ran off the event loop.
#[derive(Debug)]
pub enum Completion {
    Enhanced {
        ticket: EnhanceTicket,
        result: Result<String, RemoteCallError>,
    },
    Saved {
        ticket: SaveTicket,
        result: Result<SaveReceipt, RemoteCallError>,
    },
    Exported {
        result: Result<PathBuf, EditorError>,
    },
    PreviewLoaded(PreviewSignal),
}

pub struct Editor {
    document: ResumeDocument,
    session: EditSession,
    preview: PreviewState,
    enhancer: Arc<dyn EnhanceService>,
    store: Arc<dyn ResumeStore>,
    export_dir: PathBuf,
    completions_tx: UnboundedSender<Completion>,
    completions_rx: UnboundedReceiver<Completion>,
}

impl Editor {
    pub fn new(
        document: ResumeDocument,
        default_filename: impl Into<String>,
        enhancer: Arc<dyn EnhanceService>,
        store: Arc<dyn ResumeStore>,
        export_dir: impl Into<PathBuf>,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            document,
            session: EditSession::new(default_filename),
            preview: PreviewState::default(),
            enhancer,
            store,
            export_dir: export_dir.into(),
            completions_tx,
            completions_rx,
        }
    }

    pub fn document(&self) -> &ResumeDocument {
        &self.document
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn preview(&self) -> &PreviewState {
        &self.preview
    }

    // ── field editing ───────────────────────────────────────────────────────

    /// Puts `field` in edit and returns the seeded buffer.
    pub fn begin_edit(&mut self, field: &str) -> Result<String, EditorError> {
        let previous = self.session.fields.activate(&mut self.document, field)?;
        self.record_commit(previous);
        Ok(self.session.fields.buffer().unwrap_or_default().to_string())
    }

    pub fn push_line(&mut self, line: &str) -> Result<(), EditorError> {
        self.session.fields.push_line(line)
    }

    pub fn replace_buffer(&mut self, text: &str) -> Result<(), EditorError> {
        self.session.fields.replace_buffer(text)
    }

    /// Blur: writes the buffer back and returns to viewing.
    pub fn commit_edit(&mut self) -> Option<Commit> {
        let commit = self.session.fields.commit(&mut self.document);
        self.record_commit(commit.clone());
        commit
    }

    pub fn cancel_edit(&mut self) -> Option<String> {
        self.session.fields.cancel()
    }

    fn record_commit(&mut self, commit: Option<Commit>) {
        if let Some(Commit {
            field,
            changed: true,
        }) = commit
        {
            info!("Updated '{field}'");
            self.session.bump_revision(&field);
        }
    }

    // ── skills entries ──────────────────────────────────────────────────────

    fn skills_field(&self) -> Result<String, EditorError> {
        self.document
            .find_name(SKILLS_FIELD)
            .map(str::to_string)
            .ok_or_else(|| DocumentError::UnknownField(SKILLS_FIELD.to_string()).into())
    }

    /// Adds an empty skill and moves focus to it.
    pub fn add_skill(&mut self) -> Result<usize, EditorError> {
        self.commit_edit();
        let field = self.skills_field()?;
        let index = self.document.append_list_entry(&field)?;
        self.session.bump_revision(&field);
        self.session.fields.focus_list_entry(&field, index);
        Ok(index)
    }

    pub fn set_skill(&mut self, index: usize, text: &str) -> Result<(), EditorError> {
        self.commit_edit();
        let field = self.skills_field()?;
        self.document.update_list_entry(&field, index, text)?;
        self.session.bump_revision(&field);
        self.session.fields.focus_list_entry(&field, index);
        Ok(())
    }

    pub fn remove_skill(&mut self, index: usize) -> Result<String, EditorError> {
        self.commit_edit();
        let field = self.skills_field()?;
        let removed = self.document.remove_list_entry(&field, index)?;
        self.session.bump_revision(&field);
        self.session.fields.on_list_entry_removed(&field, index);
        Ok(removed)
    }

    // ── enhancement ─────────────────────────────────────────────────────────

    /// Starts an enhancement of `field`'s current value. Returns once the
    /// request is accepted; the result arrives later as a `Completion`.
    pub fn enhance(&mut self, field: &str) -> Result<(), EditorError> {
        if self.session.active_field() == Some(field) {
            self.commit_edit();
        }
        let current = self
            .document
            .get(field)
            .ok_or_else(|| DocumentError::UnknownField(field.to_string()))?;
        let revision = self.session.revision(field);
        let ticket = self.session.enhancement.begin(field, current, revision)?;

        let enhancer = Arc::clone(&self.enhancer);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = enhancer.enhance(&ticket.request).await;
            let _ = tx.send(Completion::Enhanced { ticket, result });
        });
        Ok(())
    }

    // ── save / export ───────────────────────────────────────────────────────

    pub fn open_save_prompt(&mut self) -> &FilenamePrompt {
        self.session.persistence.open_prompt()
    }

    pub fn cancel_save_prompt(&mut self) {
        self.session.persistence.cancel_prompt();
    }

    /// Resolves the filename prompt and sends the save.
    pub fn submit_filename(&mut self, input: &str) -> Result<String, EditorError> {
        self.commit_edit();
        let ticket = self
            .session
            .persistence
            .submit_filename(input, &self.document)?;
        Ok(self.spawn_save(ticket))
    }

    /// Saves without going through the prompt.
    pub fn save(&mut self, filename: &str) -> Result<String, EditorError> {
        self.commit_edit();
        let ticket = self.session.persistence.begin_save(&self.document, filename)?;
        Ok(self.spawn_save(ticket))
    }

    fn spawn_save(&self, ticket: SaveTicket) -> String {
        let filename = ticket.request.filename.clone();
        let store = Arc::clone(&self.store);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = store.save(&ticket.request).await;
            let _ = tx.send(Completion::Saved { ticket, result });
        });
        filename
    }

    /// Writes the current document to `<last saved name>.json` in the export
    /// directory. Only allowed while export is unlocked.
    pub fn export(&mut self) -> Result<PathBuf, EditorError> {
        self.commit_edit();
        let job = self.session.persistence.export_local(&self.document)?;
        let target = self.export_dir.join(job.file_name());
        let dir = self.export_dir.clone();
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = write_export(job, &dir).await;
            let _ = tx.send(Completion::Exported { result });
        });
        Ok(target)
    }

    // ── preview ─────────────────────────────────────────────────────────────

    pub fn load_preview(&mut self, source: Arc<dyn PreviewSource>) {
        self.preview = PreviewState::Loading;
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let signal = match tokio::task::spawn_blocking(move || source.load()).await {
                Ok(signal) => signal,
                Err(e) => {
                    error!("Preview loader panicked: {e}");
                    PreviewSignal::LoadError {
                        cause: crate::preview::PREVIEW_LOAD_FAILURE.to_string(),
                    }
                }
            };
            let _ = tx.send(Completion::PreviewLoaded(signal));
        });
    }

    pub fn go_to_page(&mut self, page: u32) -> Result<u32, EditorError> {
        self.preview.go_to_page(page)
    }

    // ── completions ─────────────────────────────────────────────────────────

    /// Waits for the next finished background operation.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completions_rx.recv().await
    }

    /// Applies a completion to the document and session.
    pub fn apply(&mut self, completion: Completion) -> Notice {
        match completion {
            Completion::Enhanced { ticket, result } => {
                let field = ticket.field.clone();
                let revision = self.session.revision(&field);
                match self
                    .session
                    .enhancement
                    .complete(&mut self.document, ticket, result, revision)
                {
                    Ok(()) => Notice::success(format!("{field} enhanced successfully!")),
                    Err(e) => Notice::from(&e),
                }
            }
            Completion::Saved { ticket, result } => {
                match self.session.persistence.complete_save(ticket, result) {
                    Ok(confirmation) => {
                        let mut message = confirmation.message;
                        if let Some(url) = confirmation.download_url {
                            message.push_str(&format!(" ({url})"));
                        }
                        Notice::success(message)
                    }
                    Err(e) => Notice::from(&e),
                }
            }
            Completion::Exported { result } => match result {
                Ok(path) => Notice::success(format!("Resume downloaded to {}", path.display())),
                Err(e) => Notice::from(&e),
            },
            Completion::PreviewLoaded(signal) => match self.preview.apply(signal) {
                Ok(()) => Notice::info(self.preview.status_line()),
                Err(e) => Notice::from(&e),
            },
        }
    }
}
