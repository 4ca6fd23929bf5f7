/*!
 * Error types for the svg-slicer library.
 *
 * This module contains custom error types for the loader, the selection state
 * and the pin transport, using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

use crate::pins::{PinDirection, PinType};

/// Errors that can occur while loading a layered drawing
#[derive(Error, Debug)]
pub enum LoadError {
    /// The drawing file could not be read
    #[error("Failed to read drawing {path}: {source}")]
    Io {
        /// Path of the drawing
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The drawing is not well-formed markup
    #[error("Malformed drawing {path}: {message}")]
    Format {
        /// Path of the drawing
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// A layer group carries a missing or non-numeric id
    #[error("Layer group #{position} in {path} has invalid id {raw:?}, expected \"layer<integer>\"")]
    LayerId {
        /// Path of the drawing
        path: PathBuf,
        /// Zero-based position of the group among all layer groups
        position: usize,
        /// Raw id attribute, if present
        raw: Option<String>,
    },
}

impl LoadError {
    /// Short machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IO_ERROR",
            Self::Format { .. } => "FORMAT_ERROR",
            Self::LayerId { .. } => "LAYER_ID_ERROR",
        }
    }
}

/// Errors raised when a layer index is refused
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectError {
    /// The requested index is outside `[0, layer_count)`
    #[error("Layer {index} is out of range (document has {layer_count} layers)")]
    OutOfRange {
        /// Requested layer index
        index: i32,
        /// Layer count of the current document
        layer_count: usize,
    },
}

/// Errors that can occur on the pin transport
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PinError {
    /// A pin with this name already exists
    #[error("Pin already registered: {0}")]
    AlreadyRegistered(String),

    /// No pin with this name exists
    #[error("Unknown pin: {0}")]
    Unknown(String),

    /// The value type does not match the pin type
    #[error("Pin {name} has type {expected}, got {actual}")]
    TypeMismatch {
        /// Pin name
        name: String,
        /// Declared pin type
        expected: PinType,
        /// Type of the offered value
        actual: PinType,
    },

    /// The pin cannot be written from this side
    #[error("Pin {name} is an {direction} pin and cannot be driven externally")]
    WrongDirection {
        /// Pin name
        name: String,
        /// Declared direction
        direction: PinDirection,
    },

    /// The event channel has been closed
    #[error("Event channel closed, dropped change on {0}")]
    ChannelClosed(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from loading a drawing
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Error from selecting a layer
    #[error("Selection error: {0}")]
    Select(#[from] SelectError),

    /// Error from the pin transport
    #[error("Pin error: {0}")]
    Pin(#[from] PinError),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
