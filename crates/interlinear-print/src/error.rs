use interlinear_layout::LayoutError;
use std::fmt;

/// Print composition failure.
#[derive(Debug)]
pub enum PrintError {
    Layout(LayoutError),
    Encode(String),
}

impl fmt::Display for PrintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(err) => write!(f, "layout failed: {}", err),
            Self::Encode(msg) => write!(f, "print job encoding failed: {}", msg),
        }
    }
}

impl std::error::Error for PrintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layout(err) => Some(err),
            Self::Encode(_) => None,
        }
    }
}

impl From<LayoutError> for PrintError {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

impl From<serde_json::Error> for PrintError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encode(err.to_string())
    }
}
