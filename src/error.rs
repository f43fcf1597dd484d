//! Error types for the resource layer

use ash::vk;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by device, buffer, and image operations
#[derive(Error, Debug)]
pub enum RenderError {
    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// Device or instance initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// No suitable memory type found for allocation
    #[error("No suitable memory type found")]
    NoSuitableMemoryType,

    /// Requested scalar type has no matching device format
    #[error("Unsupported format: {reason}")]
    UnsupportedFormat {
        /// Description of the scalar/format combination that was rejected
        reason: String,
    },

    /// Pixel data dimensions do not match the image's fixed dimensions
    #[error("Dimension mismatch: expected {expected_width}x{expected_height}, got {width}x{height}")]
    DimensionMismatch {
        /// Width the image was created with
        expected_width: u32,
        /// Height the image was created with
        expected_height: u32,
        /// Width of the offered pixel data
        width: u32,
        /// Height of the offered pixel data
        height: u32,
    },

    /// Image file could not be decoded into pixel data
    #[error("Failed to decode image {path:?}: {reason}")]
    DecodeFailed {
        /// Path of the offending file
        path: PathBuf,
        /// Decoder error description
        reason: String,
    },

    /// Invalid operation attempted
    #[error("Invalid operation: {reason}")]
    InvalidOperation {
        /// Description of why the operation is invalid
        reason: String,
    },
}

/// Result type for resource-layer operations
pub type RenderResult<T> = Result<T, RenderError>;
