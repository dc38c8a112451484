//! Error types shared across the workspace.
//!
//! TigerStyle: explicit variants with context, using thiserror.

use thiserror::Error;

/// Result alias for Beacon operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Workspace-level error type.
///
/// The registries themselves report expected misses as `bool`/`Option`
/// return values rather than errors; this type covers configuration and
/// bootstrap failures.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {field}, reason: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn invalid_configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_configuration("http.bind_address", "missing port");
        assert!(err.to_string().contains("http.bind_address"));
        assert!(err.to_string().contains("missing port"));
    }
}
