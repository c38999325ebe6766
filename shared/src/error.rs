//! Error types for the reservation functions.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling a reservation.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The messaging provider rejected or failed the relay.
    /// Carries the provider's description verbatim.
    #[error("{0}")]
    Relay(String),
}

impl Error {
    /// Get HTTP status code for this error.
    ///
    /// Request bodies are rejected with 400 before either of these can occur.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Config(_) | Error::Relay(_) => 500,
        }
    }
}
