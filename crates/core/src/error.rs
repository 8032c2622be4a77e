//! Error types for the snapcaption-core library.
//!
//! This module provides granular error variants for different failure modes,
//! enabling precise error handling and user-friendly error messages.

use crate::notify::{Notification, Severity};
use thiserror::Error;

/// Errors that can occur within the snapcaption-core library.
///
/// Each variant represents a specific failure mode with contextual information
/// to help diagnose and handle errors appropriately.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing keys, invalid values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A non-image file was selected for upload.
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    /// Reading the selected file failed.
    #[error("Failed to read image file: {0}")]
    ImageRead(#[from] std::io::Error),

    /// Image inspection or encoding failed.
    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    /// The caption engine call itself failed (network/runtime).
    #[error("Caption engine error: {0}")]
    CaptionEngine(String),

    /// The caption engine did not respond within the configured deadline.
    #[error("Caption engine timed out after {0} seconds")]
    EngineTimeout(u64),

    /// The engine call succeeded but returned zero usable captions.
    #[error("The engine returned no captions")]
    NoCaptionsGenerated,

    /// Writing to the system clipboard failed.
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// An unexpected error during a share attempt (excluding user cancellation).
    #[error("Share failed: {0}")]
    Share(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an image processing error with the given message.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::ImageProcessing(msg.into())
    }

    /// Creates a caption engine error with the given message.
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::CaptionEngine(msg.into())
    }

    /// Creates a clipboard error with the given message.
    pub fn clipboard(msg: impl Into<String>) -> Self {
        Self::Clipboard(msg.into())
    }

    /// Creates a share error with the given message.
    pub fn share(msg: impl Into<String>) -> Self {
        Self::Share(msg.into())
    }

    /// Maps this error to the toast-style notification shown to the user.
    ///
    /// Wording follows the product copy: file-type and empty-result failures
    /// get specific guidance, everything else is a generic "something went
    /// wrong" so internal details never leak into the UI.
    pub fn notification(&self) -> Notification {
        match self {
            Self::InvalidFileType(_) => Notification::new(
                Severity::Error,
                "Invalid file type",
                "Please upload an image file.",
            ),
            Self::NoCaptionsGenerated => Notification::new(
                Severity::Error,
                "Something went wrong",
                "The AI couldn't generate captions for this image. Please try another one.",
            ),
            Self::Share(_) => Notification::new(
                Severity::Error,
                "Share failed",
                "Your photo couldn't be shared. Please try again.",
            ),
            _ => Notification::new(
                Severity::Error,
                "Something went wrong",
                "An unexpected error occurred. Please try again later.",
            ),
        }
    }
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
