//! Error types for the plantdoc library.
//!
//! Everything that can go wrong between "the user picked a file" and "the
//! report is on screen" is a [`PlantDocError`]. The report renderer is not
//! part of that list: classification is total over every possible line, so
//! [`crate::report::render`] has no error branch at all.
//!
//! Variants fall into five user-facing categories, exposed through
//! [`PlantDocError::kind`]:
//!
//! * [`ErrorKind::Configuration`]: no credential configured; the user can fix it.
//! * [`ErrorKind::Auth`]: the service rejected the credential.
//! * [`ErrorKind::Service`]: any other remote failure. Never retried.
//! * [`ErrorKind::Read`] / [`ErrorKind::Encoding`]: local file handling.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the plantdoc library.
#[derive(Debug, Error)]
pub enum PlantDocError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Image file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The underlying read failed.
    #[error("Failed to read file '{path}' for base64 conversion: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The read succeeded but produced nothing to encode.
    #[error("Failed to extract base64 data from file: {detail}")]
    EncodingError { detail: String },

    /// The file is not one of the accepted image containers.
    #[error("Unsupported image '{path}': {detail}\nAccepted formats: PNG, JPEG, GIF, WebP.")]
    UnsupportedImage { path: PathBuf, detail: String },

    /// The file is larger than the configured upload limit.
    #[error("Image '{path}' is {size} bytes, above the {limit}-byte limit")]
    ImageTooLarge { path: PathBuf, size: u64, limit: u64 },

    /// `analyze` was called on a session with nothing selected.
    #[error("Please select an image first.")]
    NoImageSelected,

    // ── Inference errors ──────────────────────────────────────────────────
    /// No API credential is available.
    #[error("Gemini API key is not configured. {hint}")]
    ConfigurationError { hint: String },

    /// The remote service rejected the credential.
    #[error("Invalid Gemini API key. Please check your configuration. ({detail})")]
    AuthError { detail: String },

    /// Any other remote failure: transport, timeout, non-2xx, blocked or empty reply.
    #[error("Failed to get analysis from Gemini API: {message}")]
    ServiceError {
        message: String,
        status: Option<u16>,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse error category, one per failure class the user can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Auth,
    Service,
    Read,
    Encoding,
    /// Caller misuse or local output problems.
    Other,
}

impl PlantDocError {
    /// Map this error to its category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlantDocError::ConfigurationError { .. } => ErrorKind::Configuration,
            PlantDocError::AuthError { .. } => ErrorKind::Auth,
            PlantDocError::ServiceError { .. } => ErrorKind::Service,
            PlantDocError::FileNotFound { .. }
            | PlantDocError::PermissionDenied { .. }
            | PlantDocError::ReadError { .. } => ErrorKind::Read,
            PlantDocError::EncodingError { .. }
            | PlantDocError::UnsupportedImage { .. }
            | PlantDocError::ImageTooLarge { .. } => ErrorKind::Encoding,
            PlantDocError::NoImageSelected
            | PlantDocError::OutputWriteFailed { .. }
            | PlantDocError::InvalidConfig(_)
            | PlantDocError::Internal(_) => ErrorKind::Other,
        }
    }

    /// The dismissable alert text shown to the user.
    ///
    /// Pipeline failures keep their kind but are wrapped with a hint about the
    /// credential; a missing selection is shown as-is.
    pub fn user_message(&self) -> String {
        match self {
            PlantDocError::NoImageSelected => self.to_string(),
            other => format!(
                "Failed to analyze plant: {}. Ensure your API key is correctly configured.",
                other.to_string().trim_end_matches('.')
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_display() {
        let e = PlantDocError::ConfigurationError {
            hint: "Set GEMINI_API_KEY.".into(),
        };
        assert!(e.to_string().contains("not configured"));
        assert!(e.to_string().contains("GEMINI_API_KEY"));
        assert_eq!(e.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn auth_error_display() {
        let e = PlantDocError::AuthError {
            detail: "API key not valid".into(),
        };
        assert!(e.to_string().contains("Invalid Gemini API key"));
        assert_eq!(e.kind(), ErrorKind::Auth);
    }

    #[test]
    fn service_error_kind() {
        let e = PlantDocError::ServiceError {
            message: "HTTP 503".into(),
            status: Some(503),
        };
        assert_eq!(e.kind(), ErrorKind::Service);
        assert!(e.to_string().contains("HTTP 503"));
    }

    #[test]
    fn file_errors_are_read_kind() {
        let e = PlantDocError::FileNotFound {
            path: PathBuf::from("/nope.png"),
        };
        assert_eq!(e.kind(), ErrorKind::Read);
        let e = PlantDocError::EncodingError {
            detail: "empty file".into(),
        };
        assert_eq!(e.kind(), ErrorKind::Encoding);
    }

    #[test]
    fn user_message_wraps_pipeline_errors() {
        let e = PlantDocError::ServiceError {
            message: "boom".into(),
            status: None,
        };
        let msg = e.user_message();
        assert!(msg.starts_with("Failed to analyze plant: "), "got: {msg}");
        assert!(msg.ends_with("Ensure your API key is correctly configured."));
    }

    #[test]
    fn user_message_has_single_period() {
        let e = PlantDocError::ConfigurationError {
            hint: "Set GEMINI_API_KEY or pass --api-key.".into(),
        };
        let msg = e.user_message();
        assert!(!msg.contains(".."), "got: {msg}");
        assert!(msg.contains("--api-key. Ensure"), "got: {msg}");
    }

    #[test]
    fn user_message_no_selection_is_plain() {
        assert_eq!(
            PlantDocError::NoImageSelected.user_message(),
            "Please select an image first."
        );
    }
}
