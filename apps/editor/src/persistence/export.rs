use std::path::{Path, PathBuf};

use tracing::info;

use crate::document::ResumeDocument;
use crate::errors::EditorError;

pub const EXPORT_EXTENSION: &str = "json";

/// A serialized document waiting to be written to `<filename>.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    file_name: String,
    contents: String,
}

impl ExportJob {
    pub fn new(document: &ResumeDocument, filename: &str) -> Result<Self, EditorError> {
        Ok(Self {
            file_name: format!("{filename}.{EXPORT_EXTENSION}"),
            contents: document.to_pretty_json()?,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }
}

/// Writes the export into `dir`, replacing any previous file of that name.
pub async fn write_export(job: ExportJob, dir: &Path) -> Result<PathBuf, EditorError> {
    let path = dir.join(&job.file_name);
    tokio::fs::write(&path, job.contents.as_bytes()).await?;
    info!("Exported resume to {}", path.display());
    Ok(path)
}
