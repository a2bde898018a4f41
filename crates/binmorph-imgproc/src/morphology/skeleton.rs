use binmorph_image::Image;

use super::ops::{ensure_active, erode_mask, open_mask};
use super::{BorderMode, StructuringElement};
use crate::binary::BinaryMask;
use crate::error::ImgprocError;
use crate::parallel;

/// Strategy used by [`skeletonize`].
///
/// The two strategies produce different skeletons and are never substituted for
/// one another.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SkeletonMode {
    /// Two-step thinning on the 8-neighbor transition count (Zhang-Suen).
    ///
    /// Runs until a full pass removes nothing. The result is one pixel wide and
    /// keeps the connectivity of each component. A 2x2 block marked as a whole in one
    /// sub-iteration keeps its bottom-right pixel, so no component ever vanishes.
    #[default]
    TransitionCount,

    /// Lantuejoul's formula: the union over `n` of `E^n(I) - open(E^n(I))`.
    ///
    /// `E^n` is the `n`-th erosion by the given element. Runs until the eroded
    /// image is empty or stops changing. The result is not guaranteed to be connected.
    Lantuejoul(StructuringElement),
}

/// Reduce every foreground object to a skeleton.
///
/// # Arguments
///
/// * `src` - The source image with an arbitrary number of channels.
/// * `threshold` - The luminance level separating background from foreground.
/// * `mode` - The skeletonization strategy.
///
/// # Errors
///
/// [`ImgprocError::EmptyImage`] for an image without pixels,
/// [`ImgprocError::InvalidKernel`] for a [`SkeletonMode::Lantuejoul`] element without
/// set cells.
///
/// # Example
///
/// ```rust
/// use binmorph_image::{Image, ImageSize};
/// use binmorph_imgproc::morphology::{skeletonize, SkeletonMode};
///
/// let mut image = Image::<u8, 1>::from_size_val(ImageSize { width: 10, height: 5 }, 0).unwrap();
/// for y in 1..4 {
///     for x in 1..9 {
///         image.set_pixel(x, y, 0, 255).unwrap();
///     }
/// }
///
/// let skeleton = skeletonize(&image, 128, &SkeletonMode::TransitionCount).unwrap();
/// // a bar three pixels tall thins down to a single row
/// assert!((0..10).all(|x| skeleton.get_pixel(x, 1, 0).unwrap() == 0));
/// assert_eq!(skeleton.get_pixel(4, 2, 0).unwrap(), 255);
/// ```
pub fn skeletonize<const C: usize>(
    src: &Image<u8, C>,
    threshold: u8,
    mode: &SkeletonMode,
) -> Result<Image<u8, 1>, ImgprocError> {
    let mask = BinaryMask::from_image(src, threshold)?;
    let skeleton = match mode {
        SkeletonMode::TransitionCount => thin_transition_count(mask),
        SkeletonMode::Lantuejoul(kernel) => {
            ensure_active(kernel)?;
            lantuejoul(&mask, kernel)
        }
    };
    skeleton.to_image()
}

/// The ring of neighbors P2..P9: N, NE, E, SE, S, SW, W, NW.
fn ring(mask: &BinaryMask, x: usize, y: usize) -> [bool; 8] {
    let (x, y) = (x as isize, y as isize);
    [
        mask.get_or(x, y - 1, false),
        mask.get_or(x + 1, y - 1, false),
        mask.get_or(x + 1, y, false),
        mask.get_or(x + 1, y + 1, false),
        mask.get_or(x, y + 1, false),
        mask.get_or(x - 1, y + 1, false),
        mask.get_or(x - 1, y, false),
        mask.get_or(x - 1, y - 1, false),
    ]
}

/// Number of background to foreground transitions walking the ring once.
fn transitions(p: &[bool; 8]) -> usize {
    (0..8).filter(|&i| !p[i] && p[(i + 1) % 8]).count()
}

fn removable(mask: &BinaryMask, x: usize, y: usize, first: bool) -> bool {
    if !mask.get(x, y) {
        return false;
    }
    let p = ring(mask, x, y);
    let b = p.iter().filter(|&&v| v).count();
    if !(2..=6).contains(&b) || transitions(&p) != 1 {
        return false;
    }
    if first {
        // P2 * P4 * P6 == 0 and P4 * P6 * P8 == 0
        !(p[0] && p[2] && p[4]) && !(p[2] && p[4] && p[6])
    } else {
        // P2 * P4 * P8 == 0 and P2 * P6 * P8 == 0
        !(p[0] && p[2] && p[6]) && !(p[0] && p[4] && p[6])
    }
}

/// Unmark the bottom-right pixel of every 2x2 block whose four pixels are marked.
fn spare_blocks(marked: &mut [bool], width: usize) {
    if width < 2 {
        return;
    }
    let height = marked.len() / width;
    for y in 0..height.saturating_sub(1) {
        for x in 0..width - 1 {
            let (top, bottom) = (y * width + x, (y + 1) * width + x);
            if marked[top] && marked[top + 1] && marked[bottom] && marked[bottom + 1] {
                marked[bottom + 1] = false;
            }
        }
    }
}

fn thin_transition_count(mut mask: BinaryMask) -> BinaryMask {
    let width = mask.width();
    let mut passes = 0usize;

    loop {
        let mut changed = false;

        for first in [true, false] {
            let mut marked = vec![false; mask.size().area()];
            parallel::par_fill_rows(&mut marked, width, |y, row| {
                for (x, m) in row.iter_mut().enumerate() {
                    *m = removable(&mask, x, y, first);
                }
            });
            spare_blocks(&mut marked, width);

            for (i, _) in marked.iter().enumerate().filter(|(_, m)| **m) {
                mask.set(i % width, i / width, false);
                changed = true;
            }
        }

        passes += 1;
        if !changed {
            break;
        }
    }

    log::debug!("skeletonize: transition count converged after {passes} passes");
    mask
}

fn lantuejoul(mask: &BinaryMask, kernel: &StructuringElement) -> BinaryMask {
    let mut skeleton = BinaryMask::new(mask.size(), false);
    let mut eroded = mask.clone();
    let mut steps = 0usize;

    while eroded.has_foreground() {
        let opened = open_mask(&eroded, kernel, BorderMode::Background);
        skeleton = skeleton.union(&eroded.difference(&opened));

        let next = erode_mask(&eroded, kernel, false);
        steps += 1;
        if next == eroded {
            break;
        }
        eroded = next;
    }

    log::debug!("skeletonize: lantuejoul stopped after {steps} erosions");
    skeleton
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::KernelShape;
    use binmorph_image::ImageSize;

    fn from_rows(rows: &[&str]) -> Result<Image<u8, 1>, ImgprocError> {
        let data = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| if c == '#' { 255 } else { 0 }))
            .collect();
        let size = ImageSize {
            width: rows[0].len(),
            height: rows.len(),
        };
        Ok(Image::new(size, data)?)
    }

    #[test]
    fn test_transition_count_bar() -> Result<(), ImgprocError> {
        let src = from_rows(&[
            "..........",
            ".########.",
            ".########.",
            ".########.",
            "..........",
        ])?;
        let expected = from_rows(&[
            "..........",
            "..........",
            "..#####...",
            "..........",
            "..........",
        ])?;
        let skeleton = skeletonize(&src, 128, &SkeletonMode::TransitionCount)?;
        assert_eq!(skeleton, expected);
        // a skeleton is a fixed point
        assert_eq!(
            skeletonize(&skeleton, 128, &SkeletonMode::default())?,
            skeleton
        );
        Ok(())
    }

    #[test]
    fn test_transition_count_square_and_l() -> Result<(), ImgprocError> {
        let square = from_rows(&[
            ".......", ".#####.", ".#####.", ".#####.", ".#####.", ".#####.", ".......",
        ])?;
        let expected = from_rows(&[
            ".......", ".......", ".......", "...#...", ".......", ".......", ".......",
        ])?;
        assert_eq!(skeletonize(&square, 128, &SkeletonMode::default())?, expected);

        let l_shape = from_rows(&[
            ".......", ".##....", ".##....", ".##....", ".#####.", ".#####.", ".......",
        ])?;
        let expected = from_rows(&[
            ".......", ".......", ".#.....", ".#.....", ".####..", ".......", ".......",
        ])?;
        assert_eq!(
            skeletonize(&l_shape, 128, &SkeletonMode::default())?,
            expected
        );
        Ok(())
    }

    #[test]
    fn test_transition_count_keeps_thin_lines() -> Result<(), ImgprocError> {
        let line = from_rows(&[".....", "#####", "....."])?;
        assert_eq!(skeletonize(&line, 128, &SkeletonMode::default())?, line);
        Ok(())
    }

    #[test]
    fn test_transition_count_keeps_a_2x2_block() -> Result<(), ImgprocError> {
        let block = from_rows(&["....", ".##.", ".##.", "...."])?;
        let skeleton = skeletonize(&block, 128, &SkeletonMode::default())?;
        let expected = from_rows(&["....", "....", "..#.", "...."])?;
        assert_eq!(skeleton, expected);

        // two blocks touching the image border
        let blocks = from_rows(&["##....", "##..##", "....##"])?;
        let skeleton = skeletonize(&blocks, 128, &SkeletonMode::default())?;
        assert_eq!(skeleton.as_slice().iter().filter(|&&v| v != 0).count(), 2);
        Ok(())
    }

    #[test]
    fn test_spare_blocks() {
        #[rustfmt::skip]
        let mut marked = vec![
            true, true, true,
            true, true, true,
        ];
        spare_blocks(&mut marked, 3);
        // the second block is no longer fully marked once the first is spared
        assert_eq!(marked, vec![true, true, true, true, false, true]);

        let mut column = vec![true, true, true];
        spare_blocks(&mut column, 1);
        assert_eq!(column, vec![true, true, true]);
    }

    #[test]
    fn test_lantuejoul_square() -> Result<(), ImgprocError> {
        let square = from_rows(&[
            ".......", ".#####.", ".#####.", ".#####.", ".#####.", ".#####.", ".......",
        ])?;
        let kernel = StructuringElement::new(KernelShape::Box { size: 3 })?;
        let skeleton = skeletonize(&square, 128, &SkeletonMode::Lantuejoul(kernel))?;
        let expected = from_rows(&[
            ".......", ".......", ".......", "...#...", ".......", ".......", ".......",
        ])?;
        assert_eq!(skeleton, expected);
        Ok(())
    }

    #[test]
    fn test_lantuejoul_differs_from_transition_count() -> Result<(), ImgprocError> {
        let bar = from_rows(&[".....", ".###.", ".###.", "....."])?;
        let kernel = StructuringElement::new(KernelShape::Box { size: 3 })?;

        // a 3x2 bar does not survive a 3x3 erosion, so it is its own residue
        let lantuejoul = skeletonize(&bar, 128, &SkeletonMode::Lantuejoul(kernel))?;
        assert_eq!(lantuejoul, bar);

        let thinned = skeletonize(&bar, 128, &SkeletonMode::TransitionCount)?;
        assert_ne!(thinned, lantuejoul);
        Ok(())
    }

    #[test]
    fn test_lantuejoul_empty_kernel() -> Result<(), ImgprocError> {
        let kernel = StructuringElement::from_mask(1, 1, vec![false], (0, 0))?;
        let src = from_rows(&["#"])?;
        assert!(matches!(
            skeletonize(&src, 128, &SkeletonMode::Lantuejoul(kernel)),
            Err(ImgprocError::InvalidKernel(_))
        ));
        Ok(())
    }
}
