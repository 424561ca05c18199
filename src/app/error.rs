use thiserror::Error;

#[derive(Error, Debug)]
pub enum GazetteError {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Invalid asset reference: {0}")]
    InvalidAssetReference(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification used by views and the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    StoreUnavailable,
    Query,
    InvalidAssetReference,
    NotFound,
    Other,
}

impl GazetteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GazetteError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            GazetteError::Query(_) | GazetteError::Json(_) => ErrorKind::Query,
            GazetteError::InvalidAssetReference(_) => ErrorKind::InvalidAssetReference,
            GazetteError::DocumentNotFound(_) => ErrorKind::NotFound,
            GazetteError::Http(e) => match e.status() {
                Some(status) if status.is_client_error() && status.as_u16() != 429 => {
                    ErrorKind::Query
                }
                _ if e.is_decode() => ErrorKind::Query,
                _ => ErrorKind::StoreUnavailable,
            },
            GazetteError::InvalidUrl(_) | GazetteError::Io(_) | GazetteError::Config(_) => {
                ErrorKind::Other
            }
        }
    }

    /// Whether retrying the same fetch later can succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::StoreUnavailable
    }
}

pub type Result<T> = std::result::Result<T, GazetteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            GazetteError::StoreUnavailable("down".into()).kind(),
            ErrorKind::StoreUnavailable
        );
        assert_eq!(GazetteError::Query("bad".into()).kind(), ErrorKind::Query);
        assert_eq!(
            GazetteError::DocumentNotFound("abc".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(GazetteError::Config("x".into()).kind(), ErrorKind::Other);
    }

    #[test]
    fn test_json_error_is_query_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(GazetteError::from(err).kind(), ErrorKind::Query);
    }

    #[test]
    fn test_only_store_unavailable_is_retryable() {
        assert!(GazetteError::StoreUnavailable("timeout".into()).is_retryable());
        assert!(!GazetteError::Query("parse".into()).is_retryable());
    }
}
