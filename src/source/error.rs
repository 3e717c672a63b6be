//! Source communication error types

use std::fmt;

/// Errors reported by a positioning source
#[derive(Debug, Clone, PartialEq)]
pub enum SourceError {
    /// Connection to the backing engine or service failed
    ConnectionFailed { details: String },
    /// The site configuration cannot drive this source
    ConfigurationRejected { reason: String },
    /// The source stopped being able to deliver samples
    Unavailable { details: String },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::ConnectionFailed { details } => {
                write!(f, "Source connection failed: {}", details)
            }
            SourceError::ConfigurationRejected { reason } => {
                write!(f, "Source rejected configuration: {}", reason)
            }
            SourceError::Unavailable { details } => {
                write!(f, "Source unavailable: {}", details)
            }
        }
    }
}

impl std::error::Error for SourceError {}

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;
