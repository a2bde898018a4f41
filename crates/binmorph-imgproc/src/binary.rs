use binmorph_image::{Image, ImageSize};

use crate::color::luminance;
use crate::error::{ensure_not_empty, ensure_same_size, ImgprocError};
use crate::parallel;

/// Pixel value of a foreground pixel in a binary image.
pub const FOREGROUND: u8 = 255;

/// Pixel value of a background pixel in a binary image.
pub const BACKGROUND: u8 = 0;

/// Per-pixel foreground flags of an image, row-major.
///
/// This is the working representation of every morphological operator: inputs
/// are thresholded once into a mask and outputs are rendered back to `0`/`255`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BinaryMask {
    size: ImageSize,
    data: Vec<bool>,
}

impl BinaryMask {
    pub(crate) fn new(size: ImageSize, value: bool) -> Self {
        Self {
            size,
            data: vec![value; size.area()],
        }
    }

    pub(crate) fn from_vec(size: ImageSize, data: Vec<bool>) -> Self {
        debug_assert_eq!(data.len(), size.area());
        Self { size, data }
    }

    /// Foreground iff `luminance(pixel) >= threshold`.
    pub(crate) fn from_image<const C: usize>(
        src: &Image<u8, C>,
        threshold: u8,
    ) -> Result<Self, ImgprocError> {
        ensure_not_empty(src.size())?;
        let data = src
            .as_slice()
            .chunks_exact(C)
            .map(|px| luminance(px) >= threshold)
            .collect();
        Ok(Self::from_vec(src.size(), data))
    }

    /// Foreground iff the pixel is non-zero.
    pub(crate) fn from_nonzero(src: &Image<u8, 1>) -> Result<Self, ImgprocError> {
        ensure_not_empty(src.size())?;
        let data = src.as_slice().iter().map(|&v| v != BACKGROUND).collect();
        Ok(Self::from_vec(src.size(), data))
    }

    pub(crate) fn size(&self) -> ImageSize {
        self.size
    }

    pub(crate) fn width(&self) -> usize {
        self.size.width
    }

    pub(crate) fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.size.width + x]
    }

    /// Read a flag at signed coordinates, returning `outside` beyond the bounds.
    pub(crate) fn get_or(&self, x: isize, y: isize, outside: bool) -> bool {
        if x < 0 || y < 0 || x >= self.size.width as isize || y >= self.size.height as isize {
            return outside;
        }
        self.data[y as usize * self.size.width + x as usize]
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, value: bool) {
        let idx = y * self.size.width + x;
        self.data[idx] = value;
    }

    /// Number of foreground pixels.
    pub(crate) fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    pub(crate) fn has_foreground(&self) -> bool {
        self.data.iter().any(|&v| v)
    }

    pub(crate) fn invert(&self) -> Self {
        self.map(|v| !v)
    }

    pub(crate) fn union(&self, other: &Self) -> Self {
        self.zip(other, |a, b| a || b)
    }

    pub(crate) fn intersection(&self, other: &Self) -> Self {
        self.zip(other, |a, b| a && b)
    }

    pub(crate) fn difference(&self, other: &Self) -> Self {
        self.zip(other, |a, b| a && !b)
    }

    pub(crate) fn symmetric_difference(&self, other: &Self) -> Self {
        self.zip(other, |a, b| a != b)
    }

    fn map(&self, f: impl Fn(bool) -> bool) -> Self {
        Self::from_vec(self.size, self.data.iter().map(|&v| f(v)).collect())
    }

    fn zip(&self, other: &Self, f: impl Fn(bool, bool) -> bool) -> Self {
        debug_assert_eq!(self.size, other.size);
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Self::from_vec(self.size, data)
    }

    /// Render the mask as a `0`/`255` image.
    pub(crate) fn to_image(&self) -> Result<Image<u8, 1>, ImgprocError> {
        let data = self
            .data
            .iter()
            .map(|&v| if v { FOREGROUND } else { BACKGROUND })
            .collect();
        Ok(Image::new(self.size, data)?)
    }
}

fn binary_op(
    src1: &Image<u8, 1>,
    src2: &Image<u8, 1>,
    op: impl Fn(bool, bool) -> bool + Send + Sync,
) -> Result<Image<u8, 1>, ImgprocError> {
    ensure_same_size(src1.size(), src2.size())?;
    ensure_not_empty(src1.size())?;

    let mut dst = Image::<u8, 1>::from_size_val(src1.size(), BACKGROUND)?;

    parallel::par_iter_rows_val_two(src1, src2, &mut dst, |a, b, d| {
        *d = if op(*a != BACKGROUND, *b != BACKGROUND) {
            FOREGROUND
        } else {
            BACKGROUND
        };
    });

    Ok(dst)
}

/// Invert a binary image: foreground becomes background and vice versa.
///
/// Any non-zero pixel is treated as foreground.
///
/// # Errors
///
/// Returns [`ImgprocError::EmptyImage`] if the image has no pixels.
pub fn invert(src: &Image<u8, 1>) -> Result<Image<u8, 1>, ImgprocError> {
    BinaryMask::from_nonzero(src)?.invert().to_image()
}

/// Pixel-wise logical OR of two binary images.
///
/// # Errors
///
/// Returns [`ImgprocError::DimensionMismatch`] if the sizes differ.
pub fn union(src1: &Image<u8, 1>, src2: &Image<u8, 1>) -> Result<Image<u8, 1>, ImgprocError> {
    binary_op(src1, src2, |a, b| a || b)
}

/// Pixel-wise logical AND of two binary images.
///
/// # Errors
///
/// Returns [`ImgprocError::DimensionMismatch`] if the sizes differ.
pub fn intersection(
    src1: &Image<u8, 1>,
    src2: &Image<u8, 1>,
) -> Result<Image<u8, 1>, ImgprocError> {
    binary_op(src1, src2, |a, b| a && b)
}

/// Pixel-wise AND-NOT: foreground in `src1` and background in `src2`.
///
/// # Errors
///
/// Returns [`ImgprocError::DimensionMismatch`] if the sizes differ.
pub fn difference(
    src1: &Image<u8, 1>,
    src2: &Image<u8, 1>,
) -> Result<Image<u8, 1>, ImgprocError> {
    binary_op(src1, src2, |a, b| a && !b)
}

/// Absolute difference of the `0`/`255` values, i.e. pixel-wise XOR.
///
/// # Errors
///
/// Returns [`ImgprocError::DimensionMismatch`] if the sizes differ.
pub fn symmetric_difference(
    src1: &Image<u8, 1>,
    src2: &Image<u8, 1>,
) -> Result<Image<u8, 1>, ImgprocError> {
    binary_op(src1, src2, |a, b| a != b)
}
