use std::collections::BTreeMap;

use rayon::prelude::*;

use binmorph_image::{Image, ImageSize};

use crate::error::{ensure_not_empty, ImgprocError};
use crate::parallel;

/// Label value of background pixels.
pub const BACKGROUND_LABEL: i32 = 0;

/// Which neighbors count as adjacent when grouping foreground pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Connectivity {
    /// Pixels sharing an edge.
    Four,
    /// Pixels sharing an edge or a corner.
    #[default]
    Eight,
}

impl Connectivity {
    /// Neighbors already visited by a top-to-bottom, left-to-right raster scan.
    fn causal_offsets(self) -> &'static [(isize, isize)] {
        match self {
            // W, N
            Connectivity::Four => &[(-1, 0), (0, -1)],
            // W, NW, N, NE
            Connectivity::Eight => &[(-1, 0), (-1, -1), (0, -1), (1, -1)],
        }
    }
}

/// Union-find over provisional labels.
///
/// The smaller root always becomes the parent, so the root of every class is its
/// smallest label and every chain strictly decreases.
#[derive(Debug)]
struct EquivalenceTable {
    parent: Vec<i32>,
}

impl EquivalenceTable {
    fn new() -> Self {
        // slot 0 is the background
        Self { parent: vec![0] }
    }

    fn make_label(&mut self) -> i32 {
        let label = self.parent.len() as i32;
        self.parent.push(label);
        label
    }

    fn find(&mut self, mut label: i32) -> i32 {
        while self.parent[label as usize] != label {
            let grand = self.parent[self.parent[label as usize] as usize];
            self.parent[label as usize] = grand;
            label = grand;
        }
        label
    }

    fn union(&mut self, a: i32, b: i32) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra < rb {
            self.parent[rb as usize] = ra;
        } else if rb < ra {
            self.parent[ra as usize] = rb;
        }
    }

    fn num_labels(&self) -> usize {
        self.parent.len() - 1
    }

    /// Canonical label of every provisional label, indexed by the provisional label.
    fn resolve(&mut self) -> Vec<i32> {
        (0..self.parent.len() as i32).map(|l| self.find(l)).collect()
    }
}

/// Canonical label buffer produced by [`label`].
///
/// Holds one `i32` per pixel: [`BACKGROUND_LABEL`] for background and the canonical
/// component label otherwise, together with the provisional to canonical mapping
/// resolved by the second pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelBuffer {
    image: Image<i32, 1>,
    canonical: BTreeMap<i32, i32>,
    labels: Vec<i32>,
}

impl LabelBuffer {
    /// The canonical label image.
    pub fn image(&self) -> &Image<i32, 1> {
        &self.image
    }

    /// Consume the buffer returning the label image.
    pub fn into_image(self) -> Image<i32, 1> {
        self.image
    }

    /// The size of the labeled image.
    pub fn size(&self) -> ImageSize {
        self.image.size()
    }

    /// The label at `(x, y)`, or `None` outside of the image.
    pub fn get(&self, x: usize, y: usize) -> Option<i32> {
        self.image.get([y, x, 0]).copied()
    }

    /// The distinct canonical labels, ascending.
    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    /// Number of connected components.
    pub fn num_components(&self) -> usize {
        self.labels.len()
    }

    /// The canonical label a provisional first-pass label was resolved to.
    pub fn canonical(&self, provisional: i32) -> Option<i32> {
        self.canonical.get(&provisional).copied()
    }

    /// Number of provisional labels issued by the first pass.
    pub fn num_provisional(&self) -> usize {
        self.canonical.len()
    }
}

/// Label the connected components of a binary image.
///
/// Any non-zero pixel is foreground. The first pass scans the image in raster order
/// and gives each foreground pixel the smallest label among its already visited
/// neighbors (or a fresh one), recording the equivalences between the neighbor
/// labels. The second pass replaces every provisional label by the root of its
/// equivalence class, in parallel over the rows.
///
/// Two foreground pixels share a label iff they are connected through foreground
/// pixels under `connectivity`. Background pixels get [`BACKGROUND_LABEL`].
///
/// # Arguments
///
/// * `src` - The binary source image.
/// * `connectivity` - The pixel adjacency.
///
/// # Errors
///
/// Returns [`ImgprocError::EmptyImage`] if the image has no pixels.
///
/// # Example
///
/// ```rust
/// use binmorph_image::{Image, ImageSize};
/// use binmorph_imgproc::labeling::{label, Connectivity};
///
/// #[rustfmt::skip]
/// let image = Image::<u8, 1>::new(ImageSize { width: 3, height: 3 }, vec![
///     255,   0, 255,
///     255,   0, 255,
///     255, 255, 255,
/// ]).unwrap();
///
/// let labels = label(&image, Connectivity::Four).unwrap();
/// assert_eq!(labels.num_components(), 1);
/// assert_eq!(labels.get(2, 0), labels.get(0, 0));
/// ```
pub fn label(src: &Image<u8, 1>, connectivity: Connectivity) -> Result<LabelBuffer, ImgprocError> {
    ensure_not_empty(src.size())?;

    let (width, height) = (src.width(), src.height());
    let pixels = src.as_slice();
    let offsets = connectivity.causal_offsets();

    let mut data = vec![BACKGROUND_LABEL; width * height];
    let mut table = EquivalenceTable::new();

    // first pass: provisional labels in raster order
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            if pixels[idx] == 0 {
                continue;
            }

            let mut neighbors = [BACKGROUND_LABEL; 4];
            let mut count = 0;
            for &(dx, dy) in offsets {
                let (nx, ny) = (x as isize + dx, y as isize + dy);
                if nx < 0 || ny < 0 || nx >= width as isize {
                    continue;
                }
                let l = data[ny as usize * width + nx as usize];
                if l != BACKGROUND_LABEL {
                    neighbors[count] = l;
                    count += 1;
                }
            }

            let neighbors = &neighbors[..count];
            data[idx] = match neighbors.iter().min() {
                None => table.make_label(),
                Some(&min) => {
                    for &l in neighbors.iter().filter(|&&l| l != min) {
                        table.union(min, l);
                    }
                    min
                }
            };
        }
    }

    let resolved = table.resolve();

    // second pass: canonical labels
    parallel::par_fill_rows(&mut data, width, |_, row| {
        for l in row.iter_mut() {
            *l = resolved[*l as usize];
        }
    });

    let canonical: BTreeMap<i32, i32> = resolved
        .iter()
        .enumerate()
        .skip(1)
        .map(|(provisional, &root)| (provisional as i32, root))
        .collect();

    let mut labels: Vec<i32> = canonical.values().copied().collect();
    labels.sort_unstable();
    labels.dedup();

    log::debug!(
        "label: {} provisional labels resolved to {} components",
        table.num_labels(),
        labels.len()
    );

    Ok(LabelBuffer {
        image: Image::new(src.size(), data)?,
        canonical,
        labels,
    })
}

/// A deterministic, non-black color for a label.
fn label_color(label: i32) -> [u8; 3] {
    let mut h = (label as u32).wrapping_mul(0x9e37_79b9);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    let [r, g, b, _] = h.to_le_bytes();
    [64 + r % 192, 64 + g % 192, 64 + b % 192]
}

/// Render a label buffer as an RGB image for inspection.
///
/// Background pixels are black and every label maps to a fixed color. Different
/// labels may share a color, so colors must never be used to identify components.
///
/// # Errors
///
/// Returns [`ImgprocError::EmptyImage`] if the buffer has no pixels.
pub fn colorize_labels(labels: &LabelBuffer) -> Result<Image<u8, 3>, ImgprocError> {
    ensure_not_empty(labels.size())?;

    let mut dst = Image::<u8, 3>::from_size_val(labels.size(), 0)?;

    dst.as_slice_mut()
        .par_chunks_exact_mut(3)
        .zip(labels.image().as_slice().par_iter())
        .for_each(|(px, &l)| {
            if l != BACKGROUND_LABEL {
                px.copy_from_slice(&label_color(l));
            }
        });

    Ok(dst)
}
