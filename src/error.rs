//! Library error types.
//!
//! Everything fallible in the crate returns [`Error`]. Failures are never
//! retried; each one surfaces to the direct caller.

use thiserror::Error;

/// Errors raised by the client.
#[derive(Debug, Error)]
pub enum Error {
    /// The Tracker API answered with a non-success status.
    #[error("Tracker API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
        endpoint: Option<String>,
    },

    /// The request never produced a server response.
    #[error("Network error: {message}")]
    Network { message: String },

    /// A timestamp carried a textual zone abbreviation the fixed table
    /// does not know.
    #[error("Unknown time zone: {zone}")]
    UnknownTimeZone { zone: String },

    /// The datetime fragment of a timestamp could not be parsed.
    #[error("Malformed timestamp: {value:?}")]
    MalformedTimestamp { value: String },

    /// A wire field could not be mapped onto its domain representation.
    #[error("Invalid field {field}: {message}")]
    InvalidField { message: String, field: String },

    /// XML (de)serialization failed.
    #[error("XML error: {message}")]
    Xml { message: String },

    /// The operation is not implemented by this client.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// A sub-resource id was not found in the local snapshot. Raised
    /// before any remote call is attempted.
    #[error("Not found: {resource}")]
    NotFound {
        resource: String,
        id: Option<String>,
    },
}

impl Error {
    /// Create an API error without response context.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            status_code: None,
            endpoint: None,
        }
    }

    /// Create an API error with status code and endpoint.
    pub fn api_full(
        message: impl Into<String>,
        status_code: u16,
        endpoint: impl Into<String>,
    ) -> Self {
        Self::Api {
            message: message.into(),
            status_code: Some(status_code),
            endpoint: Some(endpoint.into()),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an unknown-time-zone error.
    pub fn unknown_time_zone(zone: impl Into<String>) -> Self {
        Self::UnknownTimeZone { zone: zone.into() }
    }

    /// Create a malformed-timestamp error.
    pub fn malformed_timestamp(value: impl Into<String>) -> Self {
        Self::MalformedTimestamp {
            value: value.into(),
        }
    }

    /// Create an invalid-field error.
    pub fn invalid_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidField {
            message: message.into(),
            field: field.into(),
        }
    }

    /// Create an unsupported-operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: None,
        }
    }

    /// Create a not-found error with the missing id.
    pub fn not_found_with_id(resource: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: Some(id.to_string()),
        }
    }

    /// Status code of the server response, when this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Check if this error came from the remote API.
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}

// Conversions from collaborator error types

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network("Failed to connect to server")
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<quick_xml::DeError> for Error {
    fn from(err: quick_xml::DeError) -> Self {
        Self::Xml {
            message: err.to_string(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_full() {
        let err = Error::api_full("Story not found", 404, "/projects/1/stories/2");
        assert_eq!(err.status_code(), Some(404));
        assert!(err.is_api());
        assert_eq!(format!("{}", err), "Tracker API error: Story not found");
    }

    #[test]
    fn test_not_found_with_id() {
        let err = Error::not_found_with_id("task", 42);
        match err {
            Error::NotFound { resource, id } => {
                assert_eq!(resource, "task");
                assert_eq!(id.as_deref(), Some("42"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_display_impl() {
        let err = Error::unknown_time_zone("XYZ");
        assert_eq!(format!("{}", err), "Unknown time zone: XYZ");

        let err = Error::unsupported("paged iteration fetch");
        assert_eq!(
            format!("{}", err),
            "Unsupported operation: paged iteration fetch"
        );
    }
}
