use crate::session::SessionError;

use std::{error::Error, fmt::Display};

/// Anything that can go wrong while the terminal is ours.
#[derive(Debug)]
pub enum GuiError {
    /// Drawing or reading keys failed
    IOError(std::io::Error),
    /// The session behind the monitor failed
    Session(SessionError),
}

impl Display for GuiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuiError::IOError(e) => write!(f, "terminal error: {}", e),
            GuiError::Session(e) => write!(f, "{}", e),
        }
    }
}

impl Error for GuiError {}

impl From<std::io::Error> for GuiError {
    fn from(value: std::io::Error) -> Self {
        Self::IOError(value)
    }
}

impl From<SessionError> for GuiError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}
