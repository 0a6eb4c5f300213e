//! Error types for the onboarding core.

use std::collections::BTreeMap;

use crate::wizard::step::StepId;

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Backend error: {0}")]
    Api(#[from] ApiError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wizard navigation errors. All recoverable — the draft is never lost.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WizardError {
    /// The active step has validation errors; navigation forward is denied.
    /// Carries the per-field error messages for inline display.
    #[error("Step {step} has {} validation error(s)", errors.len())]
    ValidationBlocked {
        step: StepId,
        errors: BTreeMap<String, String>,
    },

    /// A jump was attempted past an incomplete predecessor step.
    #[error("Step {step} is locked: complete {first_incomplete} first")]
    StepLocked {
        step: StepId,
        first_incomplete: StepId,
    },

    /// The wizard has already reached the terminal submitted state.
    #[error("Onboarding already submitted; no further navigation")]
    AlreadySubmitted,

    /// A draft value needed for submission was missing or malformed.
    #[error("Draft field {step}.{field} is missing or malformed")]
    InvalidDraftField { step: StepId, field: String },
}

/// File screening errors. Per-file and recoverable — the user re-selects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("File {file_name} rejected: {reason}")]
    Rejected {
        file_name: String,
        reason: RejectReason,
    },

    #[error("Could not read {file_name}: {message}")]
    Unreadable { file_name: String, message: String },
}

/// Why a file was rejected before any transfer was attempted.
///
/// Serializable because screened candidates (and their outcomes) live in the
/// draft, which the file draft policy writes to disk.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "code", rename_all = "kebab-case")]
pub enum RejectReason {
    #[error("{size} bytes exceeds the {limit}-byte per-file limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("type {mime} is not an accepted document format")]
    UnsupportedType { mime: String },

    #[error("step already holds the maximum of {max} files")]
    TooManyFiles { max: usize },
}

impl RejectReason {
    /// Stable machine-readable code, mirroring the backend's failure signals.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FileTooLarge { .. } => "file-too-large",
            Self::UnsupportedType { .. } => "unsupported-type",
            Self::TooManyFiles { .. } => "too-many-files",
        }
    }
}

/// Backend API errors, mapped from HTTP status and transport failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication failed for {endpoint} (session token rejected)")]
    Auth { endpoint: String },

    #[error("Not found: {endpoint}")]
    NotFound { endpoint: String },

    #[error("Backend rejected the payload for {endpoint}: {detail}")]
    Validation { endpoint: String, detail: String },

    #[error("Backend error {status} on {endpoint}: {detail}")]
    Provider {
        endpoint: String,
        status: u16,
        detail: String,
    },

    #[error("Network unreachable: {0}")]
    Network(String),

    #[error("Invalid response body from {endpoint}: {detail}")]
    Decode { endpoint: String, detail: String },

    #[error("Invalid backend base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// Transient failures where a retry is encouraged and the draft is kept.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Provider { .. })
    }
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
