use rayon::prelude::*;

use binmorph_image::Image;

/// Apply a function to each pixel in the image in parallel.
///
/// Rows are distributed across the rayon thread pool; `f` receives the channels
/// of one source pixel and the channels of the matching destination pixel.
///
/// Both images must share the same size and have a non-zero width.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Clone + Send + Sync,
    T2: Clone + Send + Sync,
{
    let cols = src.cols();
    src.as_slice()
        .par_chunks_exact(C1 * cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(C1)
                .zip(dst_chunk.chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

/// Apply a function to each pixel of two single-channel images in parallel.
///
/// All three images must share the same size and have a non-zero width.
pub fn par_iter_rows_val_two<T1, T2, T3>(
    src1: &Image<T1, 1>,
    src2: &Image<T2, 1>,
    dst: &mut Image<T3, 1>,
    f: impl Fn(&T1, &T2, &mut T3) + Send + Sync,
) where
    T1: Clone + Send + Sync,
    T2: Clone + Send + Sync,
    T3: Clone + Send + Sync,
{
    let cols = src1.cols();
    src1.as_slice()
        .par_chunks_exact(cols)
        .zip(src2.as_slice().par_chunks_exact(cols))
        .zip(dst.as_slice_mut().par_chunks_exact_mut(cols))
        .for_each(|((src1_chunk, src2_chunk), dst_chunk)| {
            src1_chunk
                .iter()
                .zip(src2_chunk.iter())
                .zip(dst_chunk.iter_mut())
                .for_each(|((src1_pixel, src2_pixel), dst_pixel)| {
                    f(src1_pixel, src2_pixel, dst_pixel);
                });
        });
}

/// Fill a row-major buffer in parallel, one row per task.
///
/// `f` receives the row index and the mutable row slice of length `width`.
/// A zero `width` is a no-op.
pub fn par_fill_rows<T: Send>(
    dst: &mut [T],
    width: usize,
    f: impl Fn(usize, &mut [T]) + Send + Sync,
) {
    if width == 0 {
        return;
    }
    dst.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

#[cfg(test)]
mod tests {
    use super::*;
    use binmorph_image::{ImageError, ImageSize};

    #[test]
    fn test_par_iter_rows_reduces_channels() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 2,
            height: 2,
        };
        let src = Image::<u8, 2>::new(size, vec![1, 2, 3, 4, 5, 6, 7, 8])?;
        let mut dst = Image::<u8, 1>::from_size_val(size, 0)?;
        par_iter_rows(&src, &mut dst, |s, d| d[0] = s[0] + s[1]);
        assert_eq!(dst.as_slice(), &[3, 7, 11, 15]);
        Ok(())
    }

    #[test]
    fn test_par_iter_rows_val_two() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 3,
            height: 1,
        };
        let a = Image::<u8, 1>::new(size, vec![1, 2, 3])?;
        let b = Image::<u8, 1>::new(size, vec![10, 20, 30])?;
        let mut dst = Image::<u8, 1>::from_size_val(size, 0)?;
        par_iter_rows_val_two(&a, &b, &mut dst, |x, y, d| *d = x + y);
        assert_eq!(dst.as_slice(), &[11, 22, 33]);
        Ok(())
    }

    #[test]
    fn test_par_fill_rows() {
        let mut buf = vec![0usize; 6];
        par_fill_rows(&mut buf, 3, |y, row| {
            for (x, v) in row.iter_mut().enumerate() {
                *v = y * 10 + x;
            }
        });
        assert_eq!(buf, vec![0, 1, 2, 10, 11, 12]);

        let mut empty: Vec<u8> = vec![];
        par_fill_rows(&mut empty, 0, |_, _| {});
        assert!(empty.is_empty());
    }
}
