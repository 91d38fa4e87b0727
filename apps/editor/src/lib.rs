//! Resume editor core: document model, field editing, AI enhancement requests
//! and the save/export workflow.

pub mod config;
pub mod document;
pub mod editor;
pub mod enhance;
pub mod errors;
pub mod persistence;
pub mod preview;
pub mod remote_client;
pub mod session;

pub use document::{parse_or_fallback, FieldValue, Record, ResumeDocument};
pub use editor::{Completion, Editor, Notice, NoticeLevel};
pub use errors::EditorError;
