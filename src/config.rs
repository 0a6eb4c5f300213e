//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// What happens to the in-progress draft between sessions.
///
/// The backend never sees a draft; this only controls local persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftPolicy {
    /// Draft lives in memory only; a restart loses it.
    Memory,
    /// Draft is saved as JSON at the given path on request.
    File(PathBuf),
}

/// Onboarding configuration.
#[derive(Debug, Clone)]
pub struct OnboardConfig {
    /// Backend base URL, e.g. `https://api.example.com`.
    pub api_base_url: String,
    /// Per-file upload size limit in bytes.
    pub per_file_limit_bytes: u64,
    /// Accepted document MIME types.
    pub accepted_mime_types: Vec<String>,
    /// Maximum accepted documents on the documents step.
    pub max_files_per_step: usize,
    /// Cap on simultaneous document transfers during submission.
    pub max_concurrent_uploads: usize,
    /// Per-request timeout for backend calls.
    pub request_timeout: Duration,
    /// Local draft persistence policy.
    pub draft_policy: DraftPolicy,
}

impl Default for OnboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            per_file_limit_bytes: 10 * 1024 * 1024, // 10 MiB
            accepted_mime_types: vec![
                "application/pdf".to_string(),
                "image/png".to_string(),
                "image/jpeg".to_string(),
            ],
            max_files_per_step: 5,
            max_concurrent_uploads: 5, // matches max_files_per_step
            request_timeout: Duration::from_secs(30),
            draft_policy: DraftPolicy::Memory,
        }
    }
}

impl OnboardConfig {
    /// Build a config from `ONBOARD_*` environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// - `ONBOARD_API_URL` — backend base URL
    /// - `ONBOARD_FILE_LIMIT_BYTES` — per-file upload limit
    /// - `ONBOARD_MAX_FILES` — max documents per step
    /// - `ONBOARD_MAX_CONCURRENT_UPLOADS` — simultaneous transfer cap
    /// - `ONBOARD_TIMEOUT_SECS` — per-request timeout
    /// - `ONBOARD_DRAFT_PATH` — if set, drafts are saved to this file
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("ONBOARD_API_URL") {
            config.api_base_url = url;
        }
        if let Ok(raw) = std::env::var("ONBOARD_FILE_LIMIT_BYTES") {
            config.per_file_limit_bytes =
                raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "ONBOARD_FILE_LIMIT_BYTES".to_string(),
                    message: format!("not a byte count: {raw}"),
                })?;
        }
        if let Ok(raw) = std::env::var("ONBOARD_MAX_FILES") {
            config.max_files_per_step =
                raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "ONBOARD_MAX_FILES".to_string(),
                    message: format!("not a count: {raw}"),
                })?;
            // Keep the transfer cap in step with the file cap unless
            // explicitly overridden below.
            config.max_concurrent_uploads = config.max_files_per_step;
        }
        if let Ok(raw) = std::env::var("ONBOARD_MAX_CONCURRENT_UPLOADS") {
            config.max_concurrent_uploads =
                raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "ONBOARD_MAX_CONCURRENT_UPLOADS".to_string(),
                    message: format!("not a count: {raw}"),
                })?;
        }
        if let Ok(raw) = std::env::var("ONBOARD_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "ONBOARD_TIMEOUT_SECS".to_string(),
                message: format!("not a duration in seconds: {raw}"),
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Ok(path) = std::env::var("ONBOARD_DRAFT_PATH") {
            config.draft_policy = DraftPolicy::File(PathBuf::from(path));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits() {
        let config = OnboardConfig::default();
        assert_eq!(config.per_file_limit_bytes, 10 * 1024 * 1024);
        assert_eq!(config.max_files_per_step, 5);
        assert_eq!(config.max_concurrent_uploads, config.max_files_per_step);
        assert_eq!(config.draft_policy, DraftPolicy::Memory);
        assert!(config.accepted_mime_types.iter().any(|m| m == "application/pdf"));
    }
}
