//! Session token capability.
//!
//! The backend issues opaque session tokens; this wraps one so it can be
//! passed explicitly to the components that need it instead of living in
//! ambient global state.

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;

/// An opaque bearer token for the backend API.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Read the token from an environment variable.
    pub fn from_env(var: &str) -> Result<Self, ConfigError> {
        std::env::var(var)
            .map(Self::new)
            .map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    }

    /// The raw token, for attaching to a request's Authorization header.
    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}
