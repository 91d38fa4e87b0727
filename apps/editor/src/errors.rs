use thiserror::Error;

use crate::document::DocumentError;
use crate::remote_client::RemoteCallError;

/// Editor-level error type.
/// Every variant is recoverable: the front end turns it into a `Notice` and
/// the session returns to an idle, fully interactive state.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("'{0}' cannot be enhanced")]
    NotEnhanceable(String),

    #[error("An enhancement for '{0}' is already in progress")]
    AlreadyPending(String),

    /// `message` is the most specific text available: the server's detail
    /// when it sent one, otherwise the caller's fallback.
    #[error("{message}")]
    Remote {
        message: String,
        #[source]
        source: RemoteCallError,
    },

    #[error("Save the resume before exporting it")]
    ExportUnavailable,

    #[error("Export failed: {0}")]
    Export(#[from] std::io::Error),

    #[error("Could not serialize resume: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0}")]
    PreviewLoad(String),
}

impl EditorError {
    pub fn remote(source: RemoteCallError, fallback: &str) -> Self {
        let message = source
            .detail()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string());
        EditorError::Remote { message, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_prefers_server_detail() {
        let err = EditorError::remote(
            RemoteCallError::Api {
                status: 500,
                detail: Some("disk full".to_string()),
            },
            "Failed to save resume",
        );
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn test_remote_falls_back_without_detail() {
        let err = EditorError::remote(
            RemoteCallError::Api {
                status: 502,
                detail: None,
            },
            "Failed to save resume",
        );
        assert_eq!(err.to_string(), "Failed to save resume");
    }
}
