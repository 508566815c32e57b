use thiserror::Error;

use crate::catalog::CatalogError;
use crate::external_catalog::BggError;

/// Errors surfaced by cached lookups and searches.
///
/// Nothing is retried or recovered at this layer.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Transport failure or non-success status from BGG.
    #[error("Catalog service unavailable: {0}")]
    RemoteUnavailable(String),

    /// The BGG payload could not be decoded.
    #[error("Malformed catalog response: {0}")]
    MalformedResponse(String),

    /// The local store failed to read or write.
    #[error("Catalog persistence failed: {0}")]
    PersistenceFailure(#[from] CatalogError),
}

impl From<BggError> for LookupError {
    fn from(err: BggError) -> Self {
        match err {
            BggError::ParseError(message) => LookupError::MalformedResponse(message),
            other => LookupError::RemoteUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_is_malformed() {
        let err: LookupError = BggError::ParseError("bad xml".to_string()).into();
        assert!(matches!(err, LookupError::MalformedResponse(m) if m == "bad xml"));
    }

    #[test]
    fn test_status_errors_are_remote_unavailable() {
        let err: LookupError = BggError::ApiError {
            status: 503,
            message: "down".to_string(),
        }
        .into();
        assert!(matches!(err, LookupError::RemoteUnavailable(_)));

        let err: LookupError = BggError::RateLimitExceeded.into();
        assert!(matches!(err, LookupError::RemoteUnavailable(_)));
    }

    #[test]
    fn test_store_error_is_persistence_failure() {
        let err: LookupError = CatalogError::Database("disk full".to_string()).into();
        assert!(matches!(err, LookupError::PersistenceFailure(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
