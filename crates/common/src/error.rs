//! Error types for the common crate

/// Errors that can occur while reading or decoding user input
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A generic error with a message
    #[error("Error: {0}")]
    Generic(String),

    /// The input is not valid hex
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    /// An error that occurred while reading or writing a file
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
}
