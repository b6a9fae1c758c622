//! Error types for token and settings input.

use core::fmt;

/// Malformed token input from the annotation collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenError {
    /// A word token arrived without any parts.
    EmptyWord { original: String },
    /// The JSON payload could not be decoded.
    Decode(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyWord { original } => {
                write!(f, "word token {:?} has no parts", original)
            }
            Self::Decode(msg) => write!(f, "token payload decode failed: {}", msg),
        }
    }
}

impl std::error::Error for TokenError {}

/// Settings rejected before layout begins.
#[derive(Clone, Debug, PartialEq)]
pub enum SettingsError {
    /// A dimension that must be positive is not.
    NonPositive { field: &'static str, value: f32 },
    /// Margins leave no room for content.
    NoContentArea {
        axis: &'static str,
        available: f32,
    },
    /// The JSON payload could not be decoded.
    Decode(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositive { field, value } => {
                write!(f, "{} must be positive (got {})", field, value)
            }
            Self::NoContentArea { axis, available } => write!(
                f,
                "margins leave no {} content area (available={})",
                axis, available
            ),
            Self::Decode(msg) => write!(f, "settings decode failed: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}
