use binmorph_image::Image;

use crate::error::{ensure_not_empty, ImgprocError};

/// City-block distance from every foreground pixel to the nearest background pixel.
///
/// Any non-zero pixel is foreground. Background pixels get `0` and the area outside
/// of the image counts as background, so a foreground pixel on the border is at
/// distance `1`. Computed with a forward and a backward raster pass.
///
/// # Errors
///
/// Returns [`ImgprocError::EmptyImage`] if the image has no pixels.
///
/// # Example
///
/// ```rust
/// use binmorph_image::{Image, ImageSize};
/// use binmorph_imgproc::distance_transform::distance_transform;
///
/// let image = Image::<u8, 1>::from_size_val(ImageSize { width: 5, height: 5 }, 255).unwrap();
/// let distance = distance_transform(&image).unwrap();
/// assert_eq!(distance.get_pixel(0, 0, 0).unwrap(), 1);
/// assert_eq!(distance.get_pixel(2, 2, 0).unwrap(), 3);
/// ```
pub fn distance_transform(src: &Image<u8, 1>) -> Result<Image<u32, 1>, ImgprocError> {
    ensure_not_empty(src.size())?;

    let (width, height) = (src.width(), src.height());
    let pixels = src.as_slice();

    // seed with the distance to the outside of the image
    let mut dist: Vec<u32> = pixels
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if v == 0 {
                return 0;
            }
            let (x, y) = (i % width, i / width);
            let border = (x + 1).min(y + 1).min(width - x).min(height - y);
            border as u32
        })
        .collect();

    // forward pass
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            if dist[idx] == 0 {
                continue;
            }
            if y > 0 {
                dist[idx] = dist[idx].min(dist[idx - width] + 1);
            }
            if x > 0 {
                dist[idx] = dist[idx].min(dist[idx - 1] + 1);
            }
        }
    }

    // backward pass
    for y in (0..height).rev() {
        for x in (0..width).rev() {
            let idx = y * width + x;
            if dist[idx] == 0 {
                continue;
            }
            if y + 1 < height {
                dist[idx] = dist[idx].min(dist[idx + width] + 1);
            }
            if x + 1 < width {
                dist[idx] = dist[idx].min(dist[idx + 1] + 1);
            }
        }
    }

    Ok(Image::new(src.size(), dist)?)
}
