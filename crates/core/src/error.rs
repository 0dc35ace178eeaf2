//! Error types for the judgy-core library.
//!
//! Local input errors (`InvalidInput`, `NoImageSelected`) are surfaced next to
//! the upload form and never leave `Idle`. `RequestFailed` carries the text
//! shown in the error panel after a failed analysis.

use thiserror::Error;

/// Shown whenever a failed request carries no usable server message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to analyze image. Please try again.";

/// Errors that can occur within the judgy-core library.
#[derive(Error, Debug)]
pub enum AppError {
    /// The selected file does not declare an image content type.
    #[error("{0}")]
    InvalidInput(String),

    /// Submit was attempted before any image was selected.
    #[error("Please select an image first")]
    NoImageSelected,

    /// The analysis request failed; the payload is the user-visible message.
    #[error("{0}")]
    RequestFailed(String),

    /// A request is already outstanding.
    #[error("An analysis is already in progress")]
    RequestInFlight,

    /// Configuration-related errors (invalid endpoint, bad values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Image decoding or encoding failed.
    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    /// UI-related errors (window creation, runtime access).
    #[error("UI error: {0}")]
    Ui(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Creates an invalid input error with the given message.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Creates a request failure carrying a user-visible message.
    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    /// Creates a request failure with the generic fallback message.
    pub fn generic_failure() -> Self {
        Self::RequestFailed(GENERIC_FAILURE_MESSAGE.to_string())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an image processing error with the given message.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::ImageProcessing(msg.into())
    }

    /// Creates a UI error with the given message.
    pub fn ui(msg: impl Into<String>) -> Self {
        Self::Ui(msg.into())
    }

    /// The text to put in front of the user for a failed analysis.
    ///
    /// Only `RequestFailed` carries a message meant for display; every other
    /// variant collapses to [`GENERIC_FAILURE_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            Self::RequestFailed(msg) => msg.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
