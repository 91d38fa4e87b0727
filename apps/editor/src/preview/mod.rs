//! Preview of the uploaded document.
//!
//! Rendering pages belongs to the viewer; the editor only consumes its two
//! signals (loaded with a page count, or failed with a cause) and tracks the
//! page the user asked for. Loading parses the whole file, so callers run
//! `PreviewSource::load` inside `tokio::task::spawn_blocking`.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::errors::EditorError;

pub const PREVIEW_LOAD_FAILURE: &str = "Failed to load PDF. Please check if the file is valid.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewSignal {
    LoadSuccess { page_count: u32 },
    LoadError { cause: String },
}

/// Something that can open the uploaded document and report on it.
pub trait PreviewSource: Send + Sync {
    fn load(&self) -> PreviewSignal;
}

/// Opens a PDF from disk and counts its pages.
pub struct PdfFilePreview {
    path: PathBuf,
}

impl PdfFilePreview {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreviewSource for PdfFilePreview {
    fn load(&self) -> PreviewSignal {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Could not read {}: {e}", self.path.display());
                return load_error();
            }
        };
        count_pages(&bytes)
    }
}

/// Reports the page count of an in-memory PDF.
pub fn count_pages(bytes: &[u8]) -> PreviewSignal {
    match lopdf::Document::load_mem(bytes) {
        Ok(doc) => match doc.get_pages().len() {
            0 => {
                warn!("PDF has no pages");
                load_error()
            }
            n => PreviewSignal::LoadSuccess {
                page_count: n as u32,
            },
        },
        Err(e) => {
            warn!("PDF parse failed: {e}");
            load_error()
        }
    }
}

fn load_error() -> PreviewSignal {
    PreviewSignal::LoadError {
        cause: PREVIEW_LOAD_FAILURE.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewState {
    /// Nothing was uploaded.
    #[default]
    Empty,
    Loading,
    Loaded {
        page_count: u32,
        current_page: u32,
    },
    Failed {
        cause: String,
    },
}

impl PreviewState {
    /// Applies a viewer signal. A failure is returned so it can be shown
    /// inline; it never touches the document.
    pub fn apply(&mut self, signal: PreviewSignal) -> Result<(), EditorError> {
        match signal {
            PreviewSignal::LoadSuccess { page_count } => {
                info!("Preview loaded ({page_count} pages)");
                *self = PreviewState::Loaded {
                    page_count,
                    current_page: 1,
                };
                Ok(())
            }
            PreviewSignal::LoadError { cause } => {
                *self = PreviewState::Failed {
                    cause: cause.clone(),
                };
                Err(EditorError::PreviewLoad(cause))
            }
        }
    }

    pub fn go_to_page(&mut self, page: u32) -> Result<u32, EditorError> {
        match self {
            PreviewState::Loaded {
                page_count,
                current_page,
            } if (1..=*page_count).contains(&page) => {
                *current_page = page;
                Ok(page)
            }
            PreviewState::Loaded { page_count, .. } => Err(EditorError::Validation(format!(
                "Page {page} is out of range (1-{page_count})"
            ))),
            _ => Err(EditorError::Validation("No preview is loaded".to_string())),
        }
    }

    pub fn status_line(&self) -> String {
        match self {
            PreviewState::Empty => "No document uploaded".to_string(),
            PreviewState::Loading => "Loading PDF...".to_string(),
            PreviewState::Loaded {
                page_count,
                current_page,
            } => format!("Page {current_page} of {page_count}"),
            PreviewState::Failed { cause } => cause.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Dictionary, Document, Object};

    fn create_test_pdf(num_pages: u32) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let page_ids: Vec<_> = (0..num_pages)
            .map(|_| {
                doc.add_object(Dictionary::from_iter(vec![
                    ("Type", Object::Name(b"Page".to_vec())),
                    ("Parent", Object::Reference(pages_id)),
                    (
                        "MediaBox",
                        Object::Array(vec![
                            Object::Integer(0),
                            Object::Integer(0),
                            Object::Integer(612),
                            Object::Integer(792),
                        ]),
                    ),
                ]))
            })
            .collect();

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(num_pages as i64)),
            (
                "Kids",
                Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_count_pages_of_valid_pdf() {
        assert_eq!(
            count_pages(&create_test_pdf(3)),
            PreviewSignal::LoadSuccess { page_count: 3 }
        );
    }

    #[test]
    fn test_count_pages_of_garbage() {
        assert_eq!(
            count_pages(b"definitely not a pdf"),
            PreviewSignal::LoadError {
                cause: PREVIEW_LOAD_FAILURE.to_string()
            }
        );
    }

    #[test]
    fn test_pdf_file_preview_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        std::fs::write(&path, create_test_pdf(2)).unwrap();

        assert_eq!(
            PdfFilePreview::new(&path).load(),
            PreviewSignal::LoadSuccess { page_count: 2 }
        );
        assert!(matches!(
            PdfFilePreview::new(dir.path().join("missing.pdf")).load(),
            PreviewSignal::LoadError { .. }
        ));
    }

    #[test]
    fn test_page_navigation_is_bounded() {
        let mut state = PreviewState::Loading;
        state
            .apply(PreviewSignal::LoadSuccess { page_count: 2 })
            .unwrap();
        assert_eq!(state.status_line(), "Page 1 of 2");

        assert_eq!(state.go_to_page(2).unwrap(), 2);
        assert!(state.go_to_page(0).is_err());
        assert!(state.go_to_page(3).is_err());
        assert_eq!(state.status_line(), "Page 2 of 2");
    }

    #[test]
    fn test_load_error_is_reported_and_kept() {
        let mut state = PreviewState::Loading;
        let err = state
            .apply(PreviewSignal::LoadError {
                cause: "bad file".into(),
            })
            .unwrap_err();
        assert!(matches!(err, EditorError::PreviewLoad(_)));
        assert_eq!(state.status_line(), "bad file");
        assert!(state.go_to_page(1).is_err());
    }
}
