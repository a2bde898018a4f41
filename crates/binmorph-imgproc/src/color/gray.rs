use crate::error::{ensure_not_empty, ImgprocError};
use crate::parallel;
use binmorph_image::Image;

/// Define the RGB weights for the luminance view, in hundredths.
const RW: u32 = 30;
const GW: u32 = 59;
const BW: u32 = 11;

/// Compute the luminance of a single pixel given its channels.
///
/// - 1 channel: the value itself.
/// - 2 channels: gray + alpha, the alpha is ignored.
/// - 3 channels: `Y = 0.3 * R + 0.59 * G + 0.11 * B`, truncated.
/// - 4 channels: RGBA, the alpha is ignored.
/// - any other count: the mean of the channels.
///
/// # Example
///
/// ```
/// use binmorph_imgproc::color::luminance;
///
/// assert_eq!(luminance(&[200]), 200);
/// assert_eq!(luminance(&[255, 255, 255]), 255);
/// assert_eq!(luminance(&[100, 0, 0, 255]), 30);
/// ```
pub fn luminance(pixel: &[u8]) -> u8 {
    match pixel {
        [] => 0,
        [v] | [v, _] => *v,
        [r, g, b] | [r, g, b, _] => {
            let y = RW * *r as u32 + GW * *g as u32 + BW * *b as u32;
            (y / 100) as u8
        }
        _ => {
            let sum: u32 = pixel.iter().map(|&v| v as u32).sum();
            (sum / pixel.len() as u32) as u8
        }
    }
}

/// Convert an image with an arbitrary number of channels to its luminance view.
///
/// # Arguments
///
/// * `src` - The input image.
///
/// # Returns
///
/// A single channel image holding the luminance of every pixel.
///
/// # Errors
///
/// Returns [`ImgprocError::EmptyImage`] if the image has no pixels.
pub fn gray_from_image<const C: usize>(src: &Image<u8, C>) -> Result<Image<u8, 1>, ImgprocError> {
    ensure_not_empty(src.size())?;

    let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;

    // parallelize the conversion by rows
    parallel::par_iter_rows(src, &mut dst, |src_pixel, dst_pixel| {
        dst_pixel[0] = luminance(src_pixel);
    });

    Ok(dst)
}
