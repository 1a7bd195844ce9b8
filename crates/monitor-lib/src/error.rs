//! Error types shared by the provisioners and the validator
//!
//! Provider failures are carried as a `{kind, message}` pair so callers can
//! branch on the condition (e.g. a create conflict) instead of the text.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Abstract classification of a provider error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    PermissionDenied,
    Unauthenticated,
    InvalidArgument,
    FailedPrecondition,
    Unavailable,
    /// The request never got a response (DNS, TLS, connection reset)
    Transport,
    /// The response body did not match the expected shape
    Decode,
    Other,
}

impl ErrorKind {
    /// Classify a Google API error from its canonical status string and HTTP code.
    ///
    /// The canonical status wins; the HTTP code is used when the body carries
    /// no status. The "already exists" message match is the last resort for
    /// endpoints that return neither.
    pub fn classify(status: Option<&str>, http_code: Option<u16>, message: &str) -> Self {
        let by_status = status.and_then(|s| match s {
            "ALREADY_EXISTS" => Some(ErrorKind::AlreadyExists),
            "NOT_FOUND" => Some(ErrorKind::NotFound),
            "PERMISSION_DENIED" => Some(ErrorKind::PermissionDenied),
            "UNAUTHENTICATED" => Some(ErrorKind::Unauthenticated),
            "INVALID_ARGUMENT" | "OUT_OF_RANGE" => Some(ErrorKind::InvalidArgument),
            "FAILED_PRECONDITION" => Some(ErrorKind::FailedPrecondition),
            "UNAVAILABLE" | "DEADLINE_EXCEEDED" => Some(ErrorKind::Unavailable),
            _ => None,
        });
        if let Some(kind) = by_status {
            return kind;
        }

        let by_code = http_code.and_then(|code| match code {
            409 => Some(ErrorKind::AlreadyExists),
            404 => Some(ErrorKind::NotFound),
            403 => Some(ErrorKind::PermissionDenied),
            401 => Some(ErrorKind::Unauthenticated),
            400 => Some(ErrorKind::InvalidArgument),
            503 | 504 => Some(ErrorKind::Unavailable),
            _ => None,
        });
        if let Some(kind) = by_code {
            return kind;
        }

        if message.to_lowercase().contains("already exists") {
            ErrorKind::AlreadyExists
        } else {
            ErrorKind::Other
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::NotFound => "not_found",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::FailedPrecondition => "failed_precondition",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Transport => "transport",
            ErrorKind::Decode => "decode",
            ErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// A failed call to a cloud management API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({kind})")]
pub struct CloudError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CloudError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind == ErrorKind::AlreadyExists
    }
}

impl From<reqwest::Error> for CloudError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_decode() {
            ErrorKind::Decode
        } else if err.is_timeout() {
            ErrorKind::Unavailable
        } else {
            ErrorKind::Transport
        };
        CloudError::new(kind, err.to_string())
    }
}

/// Fatal conditions that terminate a tool
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("billing is not enabled for project {project}")]
    BillingNotEnabled { project: String },

    #[error("configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("failed to parse {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("failed to initialize cloud client: {0}")]
    ClientInit(String),

    #[error("invalid settings: {0}")]
    Settings(#[from] config::ConfigError),

    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T, E = MonitorError> = std::result::Result<T, E>;
