use binmorph_image::Image;

use super::ops::erode_mask;
use super::StructuringElement;
use crate::binary::BinaryMask;
use crate::error::ImgprocError;

/// The 8-neighborhood offsets in clockwise order starting at north.
const NEIGHBORS: [(usize, usize); 8] = [
    (1, 0),
    (2, 0),
    (2, 1),
    (2, 2),
    (1, 2),
    (0, 2),
    (0, 1),
    (0, 0),
];

fn ensure_pair(hit: &StructuringElement, miss: &StructuringElement) -> Result<(), ImgprocError> {
    if hit.width() != miss.width() || hit.height() != miss.height() {
        return Err(ImgprocError::InvalidKernel(format!(
            "hit kernel is {}x{} but miss kernel is {}x{}",
            hit.width(),
            hit.height(),
            miss.width(),
            miss.height()
        )));
    }
    if hit.offsets().next().is_none() && miss.offsets().next().is_none() {
        return Err(ImgprocError::InvalidKernel(
            "hit and miss kernels are both empty".to_string(),
        ));
    }
    Ok(())
}

/// Hit cells must land on foreground inside the image; miss cells must land on
/// background, where everything outside of the image is background.
pub(crate) fn hit_or_miss_mask(
    src: &BinaryMask,
    hit: &StructuringElement,
    miss: &StructuringElement,
) -> Result<BinaryMask, ImgprocError> {
    ensure_pair(hit, miss)?;
    let hits = erode_mask(src, hit, false);
    let misses = erode_mask(&src.invert(), miss, true);
    Ok(hits.intersection(&misses))
}

/// Hit-or-miss transform.
///
/// A pixel survives iff the foreground matches every set cell of `hit` and the
/// background matches every set cell of `miss`, both centered on that pixel.
///
/// # Arguments
///
/// * `src` - The source image with an arbitrary number of channels.
/// * `hit` - The foreground pattern.
/// * `miss` - The background pattern, same dimensions as `hit`.
/// * `threshold` - The luminance level separating background from foreground.
///
/// # Errors
///
/// [`ImgprocError::InvalidKernel`] if the kernels differ in size or are both empty,
/// [`ImgprocError::EmptyImage`] for an image without pixels.
///
/// # Example
///
/// ```rust
/// use binmorph_image::{Image, ImageSize};
/// use binmorph_imgproc::morphology::{hit_or_miss, StructuringElement};
///
/// // an isolated foreground pixel
/// let hit = StructuringElement::from_pattern("...\n.x.\n...").unwrap();
/// let miss = StructuringElement::from_pattern("xxx\nx.x\nxxx").unwrap();
///
/// let image = Image::<u8, 1>::new(
///     ImageSize { width: 4, height: 1 },
///     vec![255, 0, 255, 255],
/// ).unwrap();
///
/// let found = hit_or_miss(&image, &hit, &miss, 128).unwrap();
/// assert_eq!(found.as_slice(), &[255, 0, 0, 0]);
/// ```
pub fn hit_or_miss<const C: usize>(
    src: &Image<u8, C>,
    hit: &StructuringElement,
    miss: &StructuringElement,
    threshold: u8,
) -> Result<Image<u8, 1>, ImgprocError> {
    let mask = BinaryMask::from_image(src, threshold)?;
    hit_or_miss_mask(&mask, hit, miss)?.to_image()
}

/// Thinning: `src - hit_or_miss(src, hit, miss)`.
///
/// # Errors
///
/// Same as [`hit_or_miss`].
pub fn thin<const C: usize>(
    src: &Image<u8, C>,
    hit: &StructuringElement,
    miss: &StructuringElement,
    threshold: u8,
) -> Result<Image<u8, 1>, ImgprocError> {
    let mask = BinaryMask::from_image(src, threshold)?;
    let matched = hit_or_miss_mask(&mask, hit, miss)?;
    mask.difference(&matched).to_image()
}

/// Thickening: `src | hit_or_miss(src, hit, miss)`.
///
/// # Errors
///
/// Same as [`hit_or_miss`].
pub fn thicken<const C: usize>(
    src: &Image<u8, C>,
    hit: &StructuringElement,
    miss: &StructuringElement,
    threshold: u8,
) -> Result<Image<u8, 1>, ImgprocError> {
    let mask = BinaryMask::from_image(src, threshold)?;
    let matched = hit_or_miss_mask(&mask, hit, miss)?;
    mask.union(&matched).to_image()
}

/// The 8 hit/miss kernel pairs matching an endpoint.
///
/// Pair `i` hits the center and the `i`-th neighbor (clockwise from north) and
/// misses the other seven neighbors, so together they find every foreground pixel
/// with exactly one foreground 8-neighbor.
pub fn endpoint_kernels() -> Vec<(StructuringElement, StructuringElement)> {
    NEIGHBORS
        .iter()
        .filter_map(|&(nx, ny)| {
            let mut hit = vec![false; 9];
            let mut miss = vec![false; 9];
            hit[4] = true;
            hit[ny * 3 + nx] = true;
            for &(mx, my) in NEIGHBORS.iter().filter(|&&n| n != (nx, ny)) {
                miss[my * 3 + mx] = true;
            }
            let hit = StructuringElement::from_mask(3, 3, hit, (1, 1)).ok()?;
            let miss = StructuringElement::from_mask(3, 3, miss, (1, 1)).ok()?;
            Some((hit, miss))
        })
        .collect()
}

fn endpoint_mask(
    src: &BinaryMask,
    kernels: &[(StructuringElement, StructuringElement)],
) -> Result<BinaryMask, ImgprocError> {
    let mut found = BinaryMask::new(src.size(), false);
    for (hit, miss) in kernels {
        found = found.union(&hit_or_miss_mask(src, hit, miss)?);
    }
    Ok(found)
}

/// Detect the endpoints of a binary image.
///
/// An endpoint is a foreground pixel with exactly one foreground 8-neighbor.
///
/// # Errors
///
/// Returns [`ImgprocError::EmptyImage`] if the image has no pixels.
pub fn endpoints<const C: usize>(
    src: &Image<u8, C>,
    threshold: u8,
) -> Result<Image<u8, 1>, ImgprocError> {
    let mask = BinaryMask::from_image(src, threshold)?;
    endpoint_mask(&mask, &endpoint_kernels())?.to_image()
}

/// Remove spurs by stripping endpoints `iterations` times.
///
/// All endpoints found in one iteration are removed at once. The loop runs for the
/// requested number of iterations and only stops early once no endpoint is left.
///
/// # Errors
///
/// Returns [`ImgprocError::EmptyImage`] if the image has no pixels.
pub fn prune<const C: usize>(
    src: &Image<u8, C>,
    iterations: usize,
    threshold: u8,
) -> Result<Image<u8, 1>, ImgprocError> {
    let kernels = endpoint_kernels();
    let mut mask = BinaryMask::from_image(src, threshold)?;

    for i in 0..iterations {
        let found = endpoint_mask(&mask, &kernels)?;
        let removed = found.count();
        if removed == 0 {
            log::debug!("prune: no endpoints left after {i} iterations");
            break;
        }
        log::trace!("prune: iteration {i} removed {removed} endpoints");
        mask = mask.difference(&found);
    }

    mask.to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn isolated_pair() -> Result<(StructuringElement, StructuringElement), ImgprocError> {
        Ok((
            StructuringElement::from_pattern("...\n.x.\n...")?,
            StructuringElement::from_pattern("xxx\nx.x\nxxx")?,
        ))
    }

    #[test]
    fn test_hit_or_miss_isolated() -> Result<(), ImgprocError> {
        let (hit, miss) = isolated_pair()?;
        let src = from_rows(&["#.....", "...##.", "...##.", ".#...."])?;
        let expected = from_rows(&["#.....", "......", "......", ".#...."])?;
        assert_eq!(hit_or_miss(&src, &hit, &miss, 128)?, expected);
        Ok(())
    }

    #[test]
    fn test_hit_or_miss_size_mismatch() -> Result<(), ImgprocError> {
        let hit = StructuringElement::from_pattern("x")?;
        let (_, miss) = isolated_pair()?;
        let src = from_rows(&["#"])?;
        assert!(matches!(
            hit_or_miss(&src, &hit, &miss, 128),
            Err(ImgprocError::InvalidKernel(_))
        ));
        Ok(())
    }

    #[test]
    fn test_thin_and_thicken() -> Result<(), ImgprocError> {
        let (hit, miss) = isolated_pair()?;
        let src = from_rows(&["#.....", "...##.", "...##."])?;
        let thinned = thin(&src, &hit, &miss, 128)?;
        assert_eq!(thinned, from_rows(&["......", "...##.", "...##."])?);

        // grow every foreground pixel into the background on its east side
        let hit = StructuringElement::from_pattern("...\nx..\n...")?;
        let miss = StructuringElement::from_pattern("...\n.x.\n...")?;
        let src = from_rows(&["....", ".#..", "...."])?;
        let thickened = thicken(&src, &hit, &miss, 128)?;
        assert_eq!(thickened, from_rows(&["....", ".##.", "...."])?);
        Ok(())
    }

    #[test]
    fn test_endpoint_kernels() {
        let kernels = endpoint_kernels();
        assert_eq!(kernels.len(), 8);
        for (hit, miss) in &kernels {
            assert_eq!(hit.offsets().count(), 2);
            assert_eq!(miss.offsets().count(), 7);
            assert!(hit.is_set(1, 1));
            assert!(!miss.is_set(1, 1));
        }
    }

    #[test]
    fn test_endpoints_of_lines() -> Result<(), ImgprocError> {
        let src = from_rows(&[".......", ".#####.", ".......", "#......"])?;
        let expected = from_rows(&[".......", ".#...#.", ".......", "......."])?;
        assert_eq!(endpoints(&src, 128)?, expected);

        // diagonal neighbors count too
        let src = from_rows(&["#..", ".#.", "..#"])?;
        assert_eq!(endpoints(&src, 128)?, from_rows(&["#..", "...", "..#"])?);
        Ok(())
    }

    #[test]
    fn test_prune_is_bounded() -> Result<(), ImgprocError> {
        let src = from_rows(&[".......", ".#####.", "......."])?;

        let once = prune(&src, 1, 128)?;
        assert_eq!(once, from_rows(&[".......", "..###..", "......."])?);

        let twice = prune(&src, 2, 128)?;
        assert_eq!(twice, from_rows(&[".......", "...#...", "......."])?);

        // a single pixel has no neighbor, so it is not an endpoint
        assert_eq!(prune(&src, 10, 128)?, twice);
        assert_eq!(prune(&src, 0, 128)?, src);
        Ok(())
    }

    #[test]
    fn test_prune_shortens_spur() -> Result<(), ImgprocError> {
        let src = from_rows(&["#######", "...#...", "...#..."])?;
        let pruned = prune(&src, 1, 128)?;
        assert_eq!(pruned, from_rows(&[".#####.", "...#...", "......."])?);
        Ok(())
    }
}
