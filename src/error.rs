//! Error types for the contact book.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=file, 3=not_found, 4=validation, 5=auth, 6=transport, ...)
//! - Retryability flags so the shell knows when to re-prompt
//! - Context-aware recovery hints
//! - Structured JSON output for `--json` consumers

use std::path::PathBuf;
use thiserror::Error;

use crate::validate::Field;

/// Result type alias for contact book operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Contacts file (exit 2)
    NoContactsFile,
    ContactsFileNotFound,
    AlreadyInitialized,

    // Not Found (exit 3)
    ContactNotFound,
    RemoteNotFound,

    // Validation (exit 4)
    ValidationFailed,
    UnknownField,
    FieldNotAllowed,
    InvalidArgument,
    FormatError,

    // Auth (exit 5)
    InvalidCode,
    TokenRequestFailed,
    TokenMissing,
    NotAuthenticated,

    // Transport (exit 6)
    TransportError,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NoContactsFile => "NO_CONTACTS_FILE",
            Self::ContactsFileNotFound => "CONTACTS_FILE_NOT_FOUND",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::ContactNotFound => "CONTACT_NOT_FOUND",
            Self::RemoteNotFound => "REMOTE_NOT_FOUND",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::UnknownField => "UNKNOWN_FIELD",
            Self::FieldNotAllowed => "FIELD_NOT_ALLOWED",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::FormatError => "FORMAT_ERROR",
            Self::InvalidCode => "INVALID_CODE",
            Self::TokenRequestFailed => "TOKEN_REQUEST_FAILED",
            Self::TokenMissing => "TOKEN_MISSING",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::TransportError => "TRANSPORT_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NoContactsFile | Self::ContactsFileNotFound | Self::AlreadyInitialized => 2,
            Self::ContactNotFound | Self::RemoteNotFound => 3,
            Self::ValidationFailed
            | Self::UnknownField
            | Self::FieldNotAllowed
            | Self::InvalidArgument
            | Self::FormatError => 4,
            Self::InvalidCode
            | Self::TokenRequestFailed
            | Self::TokenMissing
            | Self::NotAuthenticated => 5,
            Self::TransportError => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether the caller should retry with corrected input.
    ///
    /// True for field validation failures and bad authorization codes,
    /// plus transport failures (the operation left no state behind).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed
                | Self::UnknownField
                | Self::FieldNotAllowed
                | Self::InvalidArgument
                | Self::InvalidCode
                | Self::TransportError
        )
    }
}

// ── Auth Error ────────────────────────────────────────────────

/// Failures of the OAuth credential exchange.
///
/// Any of these aborts the current sync session; the registry stays local.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid authorization code: {0}")]
    InvalidCode(String),

    #[error("token request failed: {0}")]
    TokenRequestFailed(String),

    #[error("token missing in response: {0}")]
    TokenMissingInResponse(String),
}

impl AuthError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidCode(_) => ErrorCode::InvalidCode,
            Self::TokenRequestFailed(_) => ErrorCode::TokenRequestFailed,
            Self::TokenMissingInResponse(_) => ErrorCode::TokenMissing,
        }
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in contact book operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("No contacts file given: pass --file or set CB_FILE")]
    NoContactsFile,

    #[error("Contacts file not found: {}", path.display())]
    ContactsFileNotFound { path: PathBuf },

    #[error("Contacts file already exists at {}", path.display())]
    AlreadyInitialized { path: PathBuf },

    #[error("Contact not found: {id}")]
    ContactNotFound { id: u32 },

    #[error("Remote object not found: {path}")]
    RemoteNotFound { path: String },

    #[error("Invalid {field}: '{value}'")]
    Validation { field: Field, value: String },

    #[error("Unknown field: {input}")]
    UnknownField {
        input: String,
        suggestion: Option<String>,
    },

    #[error("Field {field} is not supported by {operation}")]
    FieldNotAllowed {
        field: Field,
        operation: &'static str,
    },

    #[error("Malformed contact line: {line}")]
    Format { line: String },

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Not authenticated with the remote store")]
    NotAuthenticated,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NoContactsFile => ErrorCode::NoContactsFile,
            Self::ContactsFileNotFound { .. } => ErrorCode::ContactsFileNotFound,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::ContactNotFound { .. } => ErrorCode::ContactNotFound,
            Self::RemoteNotFound { .. } => ErrorCode::RemoteNotFound,
            Self::Validation { .. } => ErrorCode::ValidationFailed,
            Self::UnknownField { .. } => ErrorCode::UnknownField,
            Self::FieldNotAllowed { .. } => ErrorCode::FieldNotAllowed,
            Self::Format { .. } => ErrorCode::FormatError,
            Self::Auth(e) => e.error_code(),
            Self::NotAuthenticated => ErrorCode::NotAuthenticated,
            Self::Transport(_) => ErrorCode::TransportError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NoContactsFile => Some(
                "Point at a contacts file: cb --file contacts.txt list\n  \
                 Create one:  cb --file contacts.txt init"
                    .to_string(),
            ),

            Self::ContactsFileNotFound { path } => Some(format!(
                "Create it with `cb --file {} init`.",
                path.display()
            )),

            Self::AlreadyInitialized { path } => Some(format!(
                "{} already exists. Use `--force` to truncate it.",
                path.display()
            )),

            Self::ContactNotFound { id } => Some(format!(
                "No contact with ID {id}. Use `cb list` to see available contacts."
            )),

            Self::RemoteNotFound { path } => Some(format!(
                "Nothing stored at '{path}' yet. Run `cb sync upload` first."
            )),

            Self::Validation { field, .. } => Some(field.format_hint().to_string()),

            Self::UnknownField { suggestion, .. } => {
                let mut hint = String::from(
                    "Valid fields: first_name, second_name, phone, email, date_of_birth",
                );
                if let Some(s) = suggestion {
                    hint.push_str(&format!(". Did you mean: {s}?"));
                }
                Some(hint)
            }

            Self::FieldNotAllowed { operation, .. } => Some(format!(
                "`{operation}` accepts: {}",
                if *operation == "search" {
                    "first_name, second_name, phone"
                } else {
                    "first_name, second_name, phone, email, date_of_birth"
                }
            )),

            Self::Auth(AuthError::InvalidCode(_)) => Some(
                "The confirmation code is 10-20 letters or digits. \
                 Open the URL from `cb sync auth-url` to get a fresh one."
                    .to_string(),
            ),

            Self::Auth(_) | Self::NotAuthenticated => Some(
                "Check CB_CLIENT_ID / CB_CLIENT_SECRET, or pass a ready token with --token."
                    .to_string(),
            ),

            Self::Format { .. }
            | Self::Transport(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::ContactNotFound { id: 3 }.exit_code(), 3);
        assert_eq!(
            Error::Validation {
                field: Field::Phone,
                value: "123".into()
            }
            .exit_code(),
            4
        );
        assert_eq!(Error::Auth(AuthError::InvalidCode("x".into())).exit_code(), 5);
        assert_eq!(Error::Transport("down".into()).exit_code(), 6);
    }

    #[test]
    fn test_auth_variants_have_distinct_codes() {
        let codes = [
            AuthError::InvalidCode(String::new()).error_code(),
            AuthError::TokenRequestFailed(String::new()).error_code(),
            AuthError::TokenMissingInResponse(String::new()).error_code(),
        ];
        assert_ne!(codes[0], codes[1]);
        assert_ne!(codes[1], codes[2]);
        assert_ne!(codes[0], codes[2]);
    }

    #[test]
    fn test_structured_json_carries_hint() {
        let err = Error::Validation {
            field: Field::Email,
            value: "nope".into(),
        };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
        assert_eq!(json["error"]["retryable"], true);
        assert!(json["error"]["hint"].is_string());
    }
}
