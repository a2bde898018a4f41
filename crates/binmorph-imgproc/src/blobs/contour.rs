use binmorph_image::Image;

use crate::labeling::LabelBuffer;

/// Moore neighborhood in clockwise order (y grows downwards), starting at west.
const DIRECTIONS: [(isize, isize); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

fn direction_index(from: (isize, isize), to: (isize, isize)) -> Option<usize> {
    let d = (to.0 - from.0, to.1 - from.1);
    DIRECTIONS.iter().position(|&dir| dir == d)
}

struct Tracer<'a> {
    labels: &'a Image<i32, 1>,
    label: i32,
}

impl Tracer<'_> {
    fn is_member(&self, (x, y): (isize, isize)) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.labels.get([y as usize, x as usize, 0]) == Some(&self.label)
    }

    /// One Moore step: scan clockwise from just after the backtrack.
    ///
    /// Returns the next boundary pixel and the position checked right before it,
    /// which becomes the next backtrack.
    fn step(
        &self,
        current: (isize, isize),
        backtrack: (isize, isize),
    ) -> Option<((isize, isize), (isize, isize))> {
        let start = direction_index(current, backtrack)?;
        let mut prev = backtrack;
        for k in 1..=8 {
            let (dx, dy) = DIRECTIONS[(start + k) % 8];
            let candidate = (current.0 + dx, current.1 + dy);
            if self.is_member(candidate) {
                return Some((candidate, prev));
            }
            prev = candidate;
        }
        None
    }
}

/// Trace the outer boundary of a component from its first pixel in raster order.
///
/// `start` must be the top-most, left-most pixel of the component so that its west
/// neighbor is known to be outside. `area` bounds the walk.
pub(crate) fn trace_from(
    labels: &Image<i32, 1>,
    label: i32,
    start: (usize, usize),
    area: u64,
) -> Vec<(usize, usize)> {
    let tracer = Tracer { labels, label };
    let start = (start.0 as isize, start.1 as isize);

    let mut boundary = vec![start];
    let mut current = start;
    let mut backtrack = (start.0 - 1, start.1);
    let mut second = None;

    let max_steps = 8 * area as usize + 8;
    let mut steps = 0;

    while let Some((next, prev)) = tracer.step(current, backtrack) {
        match second {
            None => second = Some(next),
            Some(s) if current == start && next == s => {
                // back at the start about to repeat the first move
                boundary.pop();
                break;
            }
            Some(_) => {}
        }

        steps += 1;
        if steps > max_steps {
            log::warn!("trace_boundary: label {label} did not close after {max_steps} steps");
            break;
        }

        boundary.push(next);
        current = next;
        backtrack = prev;
    }

    boundary
        .into_iter()
        .map(|(x, y)| (x as usize, y as usize))
        .collect()
}

/// Trace the outer boundary of the component carrying `label`.
///
/// Uses Moore-neighbor tracing: starting at the first pixel of the component in
/// raster order, each step scans the 8 neighbors clockwise beginning just after the
/// direction the walk came from, and moves to the first pixel of the same label.
/// The walk stops when it is back at the start and about to repeat its first move.
///
/// The contour runs clockwise and starts at the first pixel. A single
/// pixel component yields just that pixel. Pixels on one pixel wide parts of a
/// shape are visited once per side. Returns an empty vector if `label` is absent.
///
/// # Example
///
/// ```rust
/// use binmorph_image::{Image, ImageSize};
/// use binmorph_imgproc::blobs::trace_boundary;
/// use binmorph_imgproc::labeling::{label, Connectivity};
///
/// #[rustfmt::skip]
/// let image = Image::<u8, 1>::new(ImageSize { width: 3, height: 2 }, vec![
///     255, 255, 0,
///     255, 255, 0,
/// ]).unwrap();
///
/// let labels = label(&image, Connectivity::Eight).unwrap();
/// let boundary = trace_boundary(&labels, 1);
/// assert_eq!(boundary, vec![(0, 0), (1, 0), (1, 1), (0, 1)]);
/// ```
pub fn trace_boundary(labels: &LabelBuffer, label: i32) -> Vec<(usize, usize)> {
    let image = labels.image();
    let Some(first) = image.as_slice().iter().position(|&l| l == label) else {
        return Vec::new();
    };
    let area = image.as_slice().iter().filter(|&&l| l == label).count() as u64;
    let width = image.width();
    trace_from(image, label, (first % width, first / width), area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImgprocError;
    use crate::labeling::{label, Connectivity};
    use binmorph_image::ImageSize;

    fn labels_of(rows: &[&str]) -> Result<LabelBuffer, ImgprocError> {
        let data = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| if c == '#' { 255 } else { 0 }))
            .collect();
        let size = ImageSize {
            width: rows[0].len(),
            height: rows.len(),
        };
        label(&Image::new(size, data)?, Connectivity::Eight)
    }

    #[test]
    fn test_square_perimeter() -> Result<(), ImgprocError> {
        let labels = labels_of(&[".....", ".###.", ".###.", ".###.", "....."])?;
        let boundary = trace_boundary(&labels, 1);
        assert_eq!(
            boundary,
            vec![
                (1, 1),
                (2, 1),
                (3, 1),
                (3, 2),
                (3, 3),
                (2, 3),
                (1, 3),
                (1, 2)
            ]
        );
        Ok(())
    }

    #[test]
    fn test_square_touching_the_border() -> Result<(), ImgprocError> {
        let labels = labels_of(&["###", "###", "###"])?;
        let boundary = trace_boundary(&labels, 1);
        assert_eq!(boundary.len(), 8);
        assert!(!boundary.contains(&(1, 1)));
        Ok(())
    }

    #[test]
    fn test_single_pixel() -> Result<(), ImgprocError> {
        let labels = labels_of(&["...", ".#.", "..."])?;
        assert_eq!(trace_boundary(&labels, 1), vec![(1, 1)]);
        Ok(())
    }

    #[test]
    fn test_line_is_walked_on_both_sides() -> Result<(), ImgprocError> {
        let labels = labels_of(&["...", "###", "..."])?;
        assert_eq!(
            trace_boundary(&labels, 1),
            vec![(0, 1), (1, 1), (2, 1), (1, 1)]
        );
        Ok(())
    }

    #[test]
    fn test_diagonal_and_concave() -> Result<(), ImgprocError> {
        let labels = labels_of(&["#..", ".#.", "..#"])?;
        assert_eq!(
            trace_boundary(&labels, 1),
            vec![(0, 0), (1, 1), (2, 2), (1, 1)]
        );

        // only pixels of the traced label are followed
        let labels = labels_of(&["##.#", "#..#", "####"])?;
        let boundary = trace_boundary(&labels, 1);
        assert_eq!(boundary.first(), Some(&(0, 0)));
        assert!(boundary.iter().all(|&(x, y)| labels.get(x, y) == Some(1)));
        for pixel in [(1, 0), (3, 0), (3, 1), (3, 2), (0, 2), (0, 1)] {
            assert!(boundary.contains(&pixel));
        }
        Ok(())
    }

    #[test]
    fn test_missing_label() -> Result<(), ImgprocError> {
        let labels = labels_of(&["#."])?;
        assert!(trace_boundary(&labels, 7).is_empty());
        Ok(())
    }
}
