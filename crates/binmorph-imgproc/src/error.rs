use binmorph_image::{ImageError, ImageSize};

/// Errors raised by the image processing operations.
///
/// Every error is detected at call entry; operations never return partial results.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImgprocError {
    /// Two images, or an image and a kernel, have incompatible sizes.
    #[error("dimension mismatch: {0} vs {1}")]
    DimensionMismatch(ImageSize, ImageSize),

    /// The structuring element is empty, malformed, or does not match its partner.
    #[error("invalid kernel: {0}")]
    InvalidKernel(String),

    /// A blob record refers to a label missing from the label buffer.
    #[error("label {0} does not appear in the label buffer")]
    UnknownLabel(i32),

    /// The input image has zero width or height.
    #[error("image has zero width or height")]
    EmptyImage,

    /// Error forwarded from the image container.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Fail with [`ImgprocError::EmptyImage`] when `size` covers no pixels.
pub(crate) fn ensure_not_empty(size: ImageSize) -> Result<(), ImgprocError> {
    if size.is_empty() {
        return Err(ImgprocError::EmptyImage);
    }
    Ok(())
}

/// Fail with [`ImgprocError::DimensionMismatch`] when the two sizes differ.
pub(crate) fn ensure_same_size(a: ImageSize, b: ImageSize) -> Result<(), ImgprocError> {
    if a != b {
        return Err(ImgprocError::DimensionMismatch(a, b));
    }
    Ok(())
}
