#![deny(missing_docs)]
//! Image types for binary and grayscale pixel buffers

/// image representation for pixel buffers.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
