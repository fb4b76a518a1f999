//! Catalog error taxonomy

use std::time::Duration;

/// Result alias for catalog calls
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failures of a catalog call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Credential missing, expired or rejected (401); the session is over
    #[error("authentication required: {0}")]
    Authentication(String),

    /// Credential valid but not allowed (403); the session stays
    #[error("not authorized: {0}")]
    Authorization(String),

    /// Detail resource does not exist (404)
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// Request rejected before or by the server (400/409/422)
    #[error("validation failed: {0}")]
    Validation(String),

    /// Transport failure
    #[error("network error: {0}")]
    Network(String),

    /// No response within the configured timeout
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Unexpected status
    #[error("server responded with status {status}: {message}")]
    Server { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl CatalogError {
    /// Transport-level failure; may succeed if the user tries again
    ///
    /// Nothing retries automatically.
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }

    /// Whether the global sign-out callback must run
    #[inline]
    #[must_use]
    pub fn requires_sign_out(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Whether a 404 was the cause
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Shorthand for a validation failure
    #[inline]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Map a non-success status to the taxonomy
    ///
    /// `resource`/`id` name the target for 404s; `message` is the first
    /// line of the response body, if any.
    #[must_use]
    pub fn from_status(status: u16, resource: &'static str, id: &str, message: String) -> Self {
        match status {
            401 => Self::Authentication(or_default(message, "session expired")),
            403 => Self::Authorization(or_default(message, "forbidden")),
            404 => Self::NotFound {
                resource,
                id: id.to_string(),
            },
            400 | 409 | 422 => Self::Validation(or_default(message, "request rejected")),
            408 | 504 => Self::Network(or_default(message, "gateway timeout")),
            _ => Self::Server { status, message },
        }
    }
}

fn or_default(message: String, fallback: &str) -> String {
    if message.is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let e = |status| CatalogError::from_status(status, "diagram", "d1", String::new());

        assert!(e(401).requires_sign_out());
        assert!(matches!(e(403), CatalogError::Authorization(_)));
        assert!(!e(403).requires_sign_out());
        assert_eq!(
            e(404),
            CatalogError::NotFound {
                resource: "diagram",
                id: "d1".into()
            }
        );
        assert!(matches!(e(422), CatalogError::Validation(_)));
        assert!(e(504).is_transient());
        assert_eq!(
            e(500),
            CatalogError::Server {
                status: 500,
                message: String::new()
            }
        );
    }

    #[test]
    fn server_message_is_kept() {
        let err = CatalogError::from_status(400, "diagram", "d1", "name taken".into());
        assert_eq!(err.to_string(), "validation failed: name taken");
    }

    #[test]
    fn only_transport_failures_are_transient() {
        assert!(CatalogError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(CatalogError::Network("reset".into()).is_transient());
        assert!(!CatalogError::Decode("eof".into()).is_transient());
        assert!(!CatalogError::validation("empty name").is_transient());
    }
}
