//! Error types for fabric-cli

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// Profile, settings or selection problem. Raised before any network call.
    Config(String),
    /// Failure reported by the SDK backend, passed through as-is.
    Sdk(String),
    Usage(String),
    IoError(String),
    ParseError(String),
}

impl CliError {
    pub fn config(msg: impl Into<String>) -> Self {
        CliError::Config(msg.into())
    }

    pub fn sdk(msg: impl Into<String>) -> Self {
        CliError::Sdk(msg.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, CliError::Config(_))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "{}", msg),
            CliError::Sdk(msg) => write!(f, "{}", msg),
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::IoError(msg) => write!(f, "IO error: {}", msg),
            CliError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError(err.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        CliError::ParseError(err.to_string())
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::ParseError(err.to_string())
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> Self {
        CliError::Usage(err.to_string().trim_end().to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::ParseError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, CliError>;
