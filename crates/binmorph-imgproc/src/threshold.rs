use binmorph_image::Image;

use crate::binary::{BACKGROUND, FOREGROUND};
use crate::color::luminance;
use crate::error::{ensure_not_empty, ImgprocError};
use crate::parallel;

/// Luminance level separating background from foreground unless told otherwise.
pub const DEFAULT_THRESHOLD: u8 = 128;

/// Threshold an image into a binary image.
///
/// A pixel is foreground (`255`) iff `luminance(pixel) >= level`, background (`0`) otherwise.
///
/// # Arguments
///
/// * `src` - The input image with an arbitrary number of channels.
/// * `level` - The luminance level at which a pixel becomes foreground.
///
/// # Returns
///
/// A new single channel image holding only `0` and `255`.
///
/// # Examples
///
/// ```
/// use binmorph_image::{Image, ImageSize};
/// use binmorph_imgproc::threshold::threshold;
///
/// let data = vec![100u8, 200, 50, 150, 128, 250];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
///
/// let binary = threshold(&image, 128).unwrap();
/// assert_eq!(binary.as_slice(), &[0, 255, 0, 255, 255, 255]);
/// ```
pub fn threshold<const C: usize>(
    src: &Image<u8, C>,
    level: u8,
) -> Result<Image<u8, 1>, ImgprocError> {
    threshold_with_values(src, level, FOREGROUND, BACKGROUND)
}

/// Threshold an image writing custom values for each side of the level.
///
/// # Arguments
///
/// * `src` - The input image with an arbitrary number of channels.
/// * `level` - The luminance level at which a pixel takes the `high` value.
/// * `high` - The value written when `luminance(pixel) >= level`.
/// * `low` - The value written otherwise.
///
/// # Errors
///
/// Returns [`ImgprocError::EmptyImage`] if the image has no pixels.
pub fn threshold_with_values<const C: usize>(
    src: &Image<u8, C>,
    level: u8,
    high: u8,
    low: u8,
) -> Result<Image<u8, 1>, ImgprocError> {
    ensure_not_empty(src.size())?;

    let mut dst = Image::<u8, 1>::from_size_val(src.size(), low)?;

    // run the thresholding operation in parallel
    parallel::par_iter_rows(src, &mut dst, |src_pixel, dst_pixel| {
        dst_pixel[0] = if luminance(src_pixel) >= level {
            high
        } else {
            low
        };
    });

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use binmorph_image::ImageSize;

    #[test]
    fn threshold_gray() -> Result<(), ImgprocError> {
        let data = vec![100u8, 200, 50, 150, 200, 250];
        let data_expected = [0u8, 255, 0, 255, 255, 255];
        let image = Image::<_, 1>::new(
            ImageSize {
                width: 2,
                height: 3,
            },
            data,
        )?;

        let thresholded = threshold(&image, 150)?;

        assert_eq!(thresholded.num_channels(), 1);
        assert_eq!(thresholded.size().width, 2);
        assert_eq!(thresholded.size().height, 3);
        assert_eq!(thresholded.as_slice(), data_expected);

        Ok(())
    }

    #[test]
    fn threshold_rgb_uses_luminance() -> Result<(), ImgprocError> {
        // pure green is bright, pure blue is dark
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![0, 255, 0, 0, 0, 255],
        )?;
        let thresholded = threshold(&image, DEFAULT_THRESHOLD)?;
        assert_eq!(thresholded.as_slice(), &[255, 0]);
        Ok(())
    }

    #[test]
    fn threshold_custom_values() -> Result<(), ImgprocError> {
        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 3,
                height: 1,
            },
            vec![10, 128, 127],
        )?;
        let thresholded = threshold_with_values(&image, 128, 1, 9)?;
        assert_eq!(thresholded.as_slice(), &[9, 1, 9]);
        Ok(())
    }

    #[test]
    fn threshold_empty() -> Result<(), ImgprocError> {
        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 3,
                height: 0,
            },
            vec![],
        )?;
        assert_eq!(threshold(&image, 128), Err(ImgprocError::EmptyImage));
        Ok(())
    }
}
