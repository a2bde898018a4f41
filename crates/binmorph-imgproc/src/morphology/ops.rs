use binmorph_image::Image;

use super::{BorderMode, StructuringElement};
use crate::binary::BinaryMask;
use crate::error::ImgprocError;
use crate::parallel;

/// Fail with [`ImgprocError::InvalidKernel`] when the kernel has no set cell.
pub(crate) fn ensure_active(kernel: &StructuringElement) -> Result<(), ImgprocError> {
    if kernel.offsets().next().is_none() {
        return Err(ImgprocError::InvalidKernel(
            "all kernel elements are inactive".to_string(),
        ));
    }
    Ok(())
}

/// AND over the translated mask for every set kernel cell.
///
/// Cells translated outside of the image read `outside`.
pub(crate) fn erode_mask(
    src: &BinaryMask,
    kernel: &StructuringElement,
    outside: bool,
) -> BinaryMask {
    let offsets: Vec<(isize, isize)> = kernel.offsets().collect();
    let mut data = vec![false; src.size().area()];

    parallel::par_fill_rows(&mut data, src.width(), |y, row| {
        for (x, out) in row.iter_mut().enumerate() {
            *out = offsets
                .iter()
                .all(|&(dx, dy)| src.get_or(x as isize + dx, y as isize + dy, outside));
        }
    });

    BinaryMask::from_vec(src.size(), data)
}

/// OR over the translated mask for every set kernel cell.
///
/// Cells translated outside of the image read `outside`.
pub(crate) fn dilate_mask(
    src: &BinaryMask,
    kernel: &StructuringElement,
    outside: bool,
) -> BinaryMask {
    let offsets: Vec<(isize, isize)> = kernel.offsets().collect();
    let mut data = vec![false; src.size().area()];

    parallel::par_fill_rows(&mut data, src.width(), |y, row| {
        for (x, out) in row.iter_mut().enumerate() {
            *out = offsets
                .iter()
                .any(|&(dx, dy)| src.get_or(x as isize + dx, y as isize + dy, outside));
        }
    });

    BinaryMask::from_vec(src.size(), data)
}

pub(crate) fn open_mask(
    src: &BinaryMask,
    kernel: &StructuringElement,
    border: BorderMode,
) -> BinaryMask {
    let eroded = erode_mask(src, kernel, border.erosion_outside());
    dilate_mask(&eroded, &kernel.reflect(), border.dilation_outside())
}

pub(crate) fn close_mask(
    src: &BinaryMask,
    kernel: &StructuringElement,
    border: BorderMode,
) -> BinaryMask {
    let dilated = dilate_mask(src, &kernel.reflect(), border.dilation_outside());
    erode_mask(&dilated, kernel, border.erosion_outside())
}

/// Erode an image using a [`StructuringElement`].
///
/// A pixel is foreground in the output iff every set kernel cell, translated to
/// that pixel, lands on a foreground pixel of `src`. Foreground is
/// `luminance(pixel) >= threshold`.
///
/// # Arguments
///
/// * `src` - The source image with an arbitrary number of channels.
/// * `kernel` - The morphological structuring element.
/// * `threshold` - The luminance level separating background from foreground.
/// * `border` - What kernel cells read outside the image ([`BorderMode`]).
///
/// # Returns
///
/// A new binary (`0`/`255`) single channel image.
///
/// # Errors
///
/// [`ImgprocError::EmptyImage`] for an image without pixels,
/// [`ImgprocError::InvalidKernel`] for a kernel without set cells.
///
/// # Example
///
/// ```rust
/// use binmorph_image::{Image, ImageSize};
/// use binmorph_imgproc::morphology::{erode, BorderMode, KernelShape, StructuringElement};
///
/// #[rustfmt::skip]
/// let image = Image::<u8, 1>::new(ImageSize { width: 5, height: 5 }, vec![
///     0,   0,   0,   0, 0,
///     0, 255, 255, 255, 0,
///     0, 255, 255, 255, 0,
///     0, 255, 255, 255, 0,
///     0,   0,   0,   0, 0,
/// ]).unwrap();
///
/// let kernel = StructuringElement::new(KernelShape::Box { size: 3 }).unwrap();
/// let eroded = erode(&image, &kernel, 128, BorderMode::Background).unwrap();
/// assert_eq!(eroded.get_pixel(2, 2, 0).unwrap(), 255);
/// assert_eq!(eroded.as_slice().iter().filter(|&&v| v == 255).count(), 1);
/// ```
pub fn erode<const C: usize>(
    src: &Image<u8, C>,
    kernel: &StructuringElement,
    threshold: u8,
    border: BorderMode,
) -> Result<Image<u8, 1>, ImgprocError> {
    ensure_active(kernel)?;
    let mask = BinaryMask::from_image(src, threshold)?;
    erode_mask(&mask, kernel, border.erosion_outside()).to_image()
}

/// Dilate an image using a [`StructuringElement`].
///
/// A pixel is foreground in the output iff any set kernel cell, translated to
/// that pixel, lands on a foreground pixel of `src`.
///
/// # Arguments
///
/// * `src` - The source image with an arbitrary number of channels.
/// * `kernel` - The morphological structuring element.
/// * `threshold` - The luminance level separating background from foreground.
/// * `border` - What kernel cells read outside the image ([`BorderMode`]).
///
/// # Errors
///
/// [`ImgprocError::EmptyImage`] for an image without pixels,
/// [`ImgprocError::InvalidKernel`] for a kernel without set cells.
pub fn dilate<const C: usize>(
    src: &Image<u8, C>,
    kernel: &StructuringElement,
    threshold: u8,
    border: BorderMode,
) -> Result<Image<u8, 1>, ImgprocError> {
    ensure_active(kernel)?;
    let mask = BinaryMask::from_image(src, threshold)?;
    dilate_mask(&mask, kernel, border.dilation_outside()).to_image()
}

/// Opening: erosion followed by dilation.
///
/// Removes small objects and smooths object boundaries. The dilation step uses the
/// reflected element so the result is idempotent for asymmetric elements as well;
/// for symmetric elements this is exactly `dilate(erode(src))`.
///
/// # Errors
///
/// Same as [`erode`].
pub fn open<const C: usize>(
    src: &Image<u8, C>,
    kernel: &StructuringElement,
    threshold: u8,
    border: BorderMode,
) -> Result<Image<u8, 1>, ImgprocError> {
    ensure_active(kernel)?;
    let mask = BinaryMask::from_image(src, threshold)?;
    open_mask(&mask, kernel, border).to_image()
}

/// Closing: dilation followed by erosion.
///
/// Fills small holes and smooths object boundaries. The dilation step uses the
/// reflected element, mirroring [`open`].
///
/// # Errors
///
/// Same as [`erode`].
pub fn close<const C: usize>(
    src: &Image<u8, C>,
    kernel: &StructuringElement,
    threshold: u8,
    border: BorderMode,
) -> Result<Image<u8, 1>, ImgprocError> {
    ensure_active(kernel)?;
    let mask = BinaryMask::from_image(src, threshold)?;
    close_mask(&mask, kernel, border).to_image()
}

/// Morphological gradient: `|dilate(src) - erode(src)|` per pixel.
///
/// On binary images this is the symmetric difference of the two, which outlines
/// the object boundaries.
///
/// # Errors
///
/// Same as [`erode`].
pub fn gradient<const C: usize>(
    src: &Image<u8, C>,
    kernel: &StructuringElement,
    threshold: u8,
    border: BorderMode,
) -> Result<Image<u8, 1>, ImgprocError> {
    ensure_active(kernel)?;
    let mask = BinaryMask::from_image(src, threshold)?;
    let dilated = dilate_mask(&mask, kernel, border.dilation_outside());
    let eroded = erode_mask(&mask, kernel, border.erosion_outside());
    dilated.symmetric_difference(&eroded).to_image()
}

/// White top-hat: `src - open(src)`.
///
/// Keeps the foreground details smaller than the structuring element.
///
/// # Errors
///
/// Same as [`erode`].
pub fn top_hat<const C: usize>(
    src: &Image<u8, C>,
    kernel: &StructuringElement,
    threshold: u8,
    border: BorderMode,
) -> Result<Image<u8, 1>, ImgprocError> {
    ensure_active(kernel)?;
    let mask = BinaryMask::from_image(src, threshold)?;
    mask.difference(&open_mask(&mask, kernel, border))
        .to_image()
}

/// Black top-hat: `close(src) - src`.
///
/// Keeps the background details (holes, gaps) smaller than the structuring element.
///
/// # Errors
///
/// Same as [`erode`].
pub fn bottom_hat<const C: usize>(
    src: &Image<u8, C>,
    kernel: &StructuringElement,
    threshold: u8,
    border: BorderMode,
) -> Result<Image<u8, 1>, ImgprocError> {
    ensure_active(kernel)?;
    let mask = BinaryMask::from_image(src, threshold)?;
    close_mask(&mask, kernel, border)
        .difference(&mask)
        .to_image()
}
