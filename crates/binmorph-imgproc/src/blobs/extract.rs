use std::collections::BTreeMap;

use rayon::prelude::*;

use super::contour::trace_from;
use crate::labeling::{LabelBuffer, BACKGROUND_LABEL};

/// An axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Column of the left edge.
    pub x: usize,
    /// Row of the top edge.
    pub y: usize,
    /// Number of columns covered.
    pub width: usize,
    /// Number of rows covered.
    pub height: usize,
}

impl Rect {
    /// The unit rectangle covering pixel `(x, y)`.
    pub fn from_pixel(x: usize, y: usize) -> Self {
        Self {
            x,
            y,
            width: 1,
            height: 1,
        }
    }

    /// One past the right-most column.
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// One past the bottom-most row.
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    /// The smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Whether pixel `(x, y)` lies inside the rectangle.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

/// Measurements of one connected component.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlobRecord {
    /// The canonical component label.
    pub label: i32,
    /// Number of member pixels.
    pub area: u64,
    /// Mean `(x, y)` of the member pixels.
    pub centroid: (f64, f64),
    /// Minimal rectangle covering every member pixel.
    pub bounding_box: Rect,
    /// Closed outer contour, see [`trace_boundary`](super::trace_boundary).
    pub boundary: Vec<(usize, usize)>,
}

#[derive(Debug)]
struct Accumulator {
    area: u64,
    sum_x: u64,
    sum_y: u64,
    bounding_box: Rect,
    first: (usize, usize),
}

impl Accumulator {
    fn new(x: usize, y: usize) -> Self {
        Self {
            area: 0,
            sum_x: 0,
            sum_y: 0,
            bounding_box: Rect::from_pixel(x, y),
            first: (x, y),
        }
    }

    fn add(&mut self, x: usize, y: usize) {
        self.area += 1;
        self.sum_x += x as u64;
        self.sum_y += y as u64;
        self.bounding_box = self.bounding_box.union(&Rect::from_pixel(x, y));
    }
}

/// Measure every component of a label buffer.
///
/// One raster pass accumulates the area, coordinate sums and bounding box of each
/// label; the boundaries are then traced per label in parallel, each starting at
/// the first pixel of its label in raster order.
///
/// # Returns
///
/// The blob records keyed by label, in ascending label order.
///
/// # Example
///
/// ```rust
/// use binmorph_image::{Image, ImageSize};
/// use binmorph_imgproc::blobs::extract_blobs;
/// use binmorph_imgproc::labeling::{label, Connectivity};
///
/// #[rustfmt::skip]
/// let image = Image::<u8, 1>::new(ImageSize { width: 4, height: 2 }, vec![
///     255, 255, 0, 255,
///     255, 255, 0,   0,
/// ]).unwrap();
///
/// let labels = label(&image, Connectivity::Eight).unwrap();
/// let blobs = extract_blobs(&labels);
/// assert_eq!(blobs.len(), 2);
/// assert_eq!(blobs[&1].area, 4);
/// assert_eq!(blobs[&1].centroid, (0.5, 0.5));
/// assert_eq!(blobs[&2].area, 1);
/// ```
pub fn extract_blobs(labels: &LabelBuffer) -> BTreeMap<i32, BlobRecord> {
    let image = labels.image();
    let width = image.width();

    let mut accumulators: BTreeMap<i32, Accumulator> = BTreeMap::new();
    for (i, &l) in image.as_slice().iter().enumerate() {
        if l == BACKGROUND_LABEL {
            continue;
        }
        let (x, y) = (i % width, i / width);
        accumulators
            .entry(l)
            .or_insert_with(|| Accumulator::new(x, y))
            .add(x, y);
    }

    log::debug!("extract_blobs: measured {} components", accumulators.len());

    accumulators
        .into_par_iter()
        .map(|(label, acc)| {
            let area = acc.area as f64;
            let record = BlobRecord {
                label,
                area: acc.area,
                centroid: (acc.sum_x as f64 / area, acc.sum_y as f64 / area),
                bounding_box: acc.bounding_box,
                boundary: trace_from(image, label, acc.first, acc.area),
            };
            log::trace!(
                "blob {label}: area {} bbox {:?} boundary {}",
                record.area,
                record.bounding_box,
                record.boundary.len()
            );
            (label, record)
        })
        .collect()
}
