// ABOUTME: Platform error type with the SNAFU pattern.
// ABOUTME: Every compute, autoscaling and secret-store failure surfaces through this one enum.

use snafu::Snafu;

/// A failed call to the compute, autoscaling or secret-store API.
///
/// Deploy logic never retries these; they propagate to the caller as-is.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PlatformError {
    #[snafu(display("{operation} failed: {message}"))]
    Api {
        operation: &'static str,
        message: String,
    },

    #[snafu(display("service {service} not found in cluster {cluster}"))]
    ServiceNotFound { service: String, cluster: String },

    #[snafu(display("{operation} response is missing {field}"))]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    #[snafu(display("secret {secret_id} has no string value"))]
    EmptySecret { secret_id: String },

    #[snafu(display("secret {secret_id} is not a JSON object: {source}"))]
    MalformedSecret {
        secret_id: String,
        source: serde_json::Error,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformErrorKind {
    /// The API call itself was rejected or could not be sent.
    Api,
    /// The named service does not exist.
    NotFound,
    /// The API answered with something this tool cannot interpret.
    UnexpectedResponse,
    /// Secret-store content was missing or unreadable.
    Secret,
}

impl PlatformError {
    pub fn kind(&self) -> PlatformErrorKind {
        match self {
            PlatformError::Api { .. } => PlatformErrorKind::Api,
            PlatformError::ServiceNotFound { .. } => PlatformErrorKind::NotFound,
            PlatformError::MissingField { .. } => PlatformErrorKind::UnexpectedResponse,
            PlatformError::EmptySecret { .. } | PlatformError::MalformedSecret { .. } => {
                PlatformErrorKind::Secret
            }
        }
    }

    pub fn api(operation: &'static str, message: impl Into<String>) -> Self {
        PlatformError::Api {
            operation,
            message: message.into(),
        }
    }
}
