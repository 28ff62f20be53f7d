//! Error types for turmite operations.
//!
//! The simulation core itself never fails: sparse rules fall back, lookups
//! return `None`, bad configuration is clamped. These errors only surface at
//! the I/O and naming boundaries (sessions, presets, config files).

use thiserror::Error;

/// Result type for turmite operations.
pub type Result<T> = std::result::Result<T, TurmiteError>;

/// Errors that can occur outside the tick loop.
#[derive(Debug, Clone, Error)]
pub enum TurmiteError {
    /// Session-related errors.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    /// Configuration errors.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// No preset with the requested name.
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
    /// I/O errors (wrapped).
    #[error("I/O error: {0}")]
    Io(String),
    /// Serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for TurmiteError {
    fn from(e: std::io::Error) -> Self {
        TurmiteError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for TurmiteError {
    fn from(e: serde_json::Error) -> Self {
        TurmiteError::Serialization(e.to_string())
    }
}

/// Session-related errors.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// Session file does not exist.
    #[error("Session not found: {0}")]
    NotFound(String),
    /// Session file could not be parsed.
    #[error("Session file corrupt: {0}")]
    Corrupt(String),
    /// Session was written by an incompatible format version.
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A value that cannot be clamped into range (e.g. an unknown strategy name).
    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

// Convenience constructors
impl TurmiteError {
    pub fn unknown_preset(name: impl Into<String>) -> Self {
        TurmiteError::UnknownPreset(name.into())
    }

    pub fn session_not_found(path: impl Into<String>) -> Self {
        TurmiteError::Session(SessionError::NotFound(path.into()))
    }

    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        TurmiteError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        let err = TurmiteError::unknown_preset("glider");
        assert_eq!(err.to_string(), "Unknown preset: glider");

        let err = TurmiteError::Session(SessionError::VersionMismatch {
            expected: "1".into(),
            found: "7".into(),
        });
        assert_eq!(
            err.to_string(),
            "Session error: Version mismatch: expected 1, found 7"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: TurmiteError = io.into();
        assert!(matches!(err, TurmiteError::Io(ref msg) if msg.contains("gone")));
    }
}
