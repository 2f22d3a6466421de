use std::fmt::{self, Display};

/// Errors raised while reading a scheduling input. Solving itself never fails.
#[derive(Debug)]
pub enum InputError {
    /// The input file or stream could not be read.
    Io(std::io::Error),
    /// The input is not a valid scheduling document.
    Json(serde_json::Error),
    /// Nothing was received.
    Empty,
}

impl Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Could not read input: {e}"),
            Self::Json(e) => write!(f, "Error parsing JSON: {e}"),
            Self::Empty => write!(f, "No JSON input received"),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Empty => None,
        }
    }
}

impl From<std::io::Error> for InputError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for InputError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
