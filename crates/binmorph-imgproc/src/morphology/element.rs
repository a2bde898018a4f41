use crate::error::ImgprocError;

/// Shapes of a [`StructuringElement`].
///
/// All shapes are anchored at their geometric center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KernelShape {
    /// A rectangular box structuring element.
    ///
    /// All cells within the box are set.
    Box {
        /// `size` - The side length of the square kernel (size x size).
        size: usize,
    },

    /// A cross (plus) shaped structuring element.
    ///
    /// Only cells along the horizontal and vertical center lines are set.
    Cross {
        /// `size` - The side length of the square cross kernel (size x size).
        size: usize,
    },

    /// An ellipse (or circle) shaped structuring element.
    ///
    /// Cells inside the elliptical boundary are set, defined by the
    /// equation: (x^2 / rx^2) + (y^2 / ry^2) <= 1.
    Ellipse {
        /// `width` - The width of the ellipse.
        width: usize,
        /// `height` - The height of the ellipse.
        height: usize,
    },
}

/// A morphological structuring element.
///
/// An immutable `width x height` boolean mask with an anchor cell. Applying the
/// element at pixel `p` visits `p + (kx - ax, ky - ay)` for every set cell `(kx, ky)`,
/// where `(ax, ay)` is the anchor.
///
/// # Example
///
/// ```rust
/// use binmorph_imgproc::morphology::{KernelShape, StructuringElement};
///
/// // Create a 3x3 box kernel
/// let kernel = StructuringElement::new(KernelShape::Box { size: 3 }).unwrap();
/// assert_eq!(kernel.width(), 3);
/// assert_eq!(kernel.height(), 3);
/// assert_eq!(kernel.anchor(), (1, 1));
///
/// // the default element is a 5x5 box
/// let kernel = StructuringElement::default();
/// assert_eq!(kernel.offsets().count(), 25);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructuringElement {
    mask: Vec<bool>,
    width: usize,
    height: usize,
    anchor: (usize, usize),
}

impl StructuringElement {
    /// Create a structuring element from a shape.
    ///
    /// # Errors
    ///
    /// Returns [`ImgprocError::InvalidKernel`] if the shape has a zero dimension.
    pub fn new(shape: KernelShape) -> Result<Self, ImgprocError> {
        match shape {
            KernelShape::Box { size } => box_element(size),
            KernelShape::Cross { size } => cross_element(size),
            KernelShape::Ellipse { width, height } => ellipse_element(width, height),
        }
    }

    /// Create a structuring element from a row-major mask and an anchor.
    ///
    /// # Arguments
    ///
    /// * `width` - The width of the mask.
    /// * `height` - The height of the mask.
    /// * `mask` - `width * height` flags, row-major.
    /// * `anchor` - The `(x, y)` cell the element is centered on.
    ///
    /// # Errors
    ///
    /// Returns [`ImgprocError::InvalidKernel`] if the mask is empty, has the wrong
    /// length, or the anchor lies outside of it.
    pub fn from_mask(
        width: usize,
        height: usize,
        mask: Vec<bool>,
        anchor: (usize, usize),
    ) -> Result<Self, ImgprocError> {
        if width == 0 || height == 0 {
            return Err(ImgprocError::InvalidKernel(format!(
                "zero-sized kernel ({width}x{height})"
            )));
        }
        if mask.len() != width * height {
            return Err(ImgprocError::InvalidKernel(format!(
                "mask length {} does not match {width}x{height}",
                mask.len()
            )));
        }
        if anchor.0 >= width || anchor.1 >= height {
            return Err(ImgprocError::InvalidKernel(format!(
                "anchor {anchor:?} outside of a {width}x{height} kernel"
            )));
        }

        Ok(Self {
            mask,
            width,
            height,
            anchor,
        })
    }

    /// Create a structuring element from an ASCII pattern anchored at its center.
    ///
    /// Each line is a row; `x`, `X` or `1` mark set cells and `.`, `0` or `-` mark
    /// unset cells. Surrounding whitespace and blank lines are skipped, short rows are
    /// padded with unset cells.
    ///
    /// # Example
    ///
    /// ```rust
    /// use binmorph_imgproc::morphology::StructuringElement;
    ///
    /// let kernel = StructuringElement::from_pattern(
    ///     ".x.\n\
    ///      xxx\n\
    ///      .x.",
    /// ).unwrap();
    /// assert_eq!(kernel.offsets().count(), 5);
    /// assert!(!kernel.is_set(0, 0));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ImgprocError::InvalidKernel`] for an empty pattern or an unknown symbol.
    pub fn from_pattern(pattern: &str) -> Result<Self, ImgprocError> {
        let lines: Vec<&str> = pattern
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();
        let height = lines.len();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        let mut mask = vec![false; width * height];
        for (y, line) in lines.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                mask[y * width + x] = match ch {
                    'x' | 'X' | '1' => true,
                    '.' | '0' | '-' => false,
                    other => {
                        return Err(ImgprocError::InvalidKernel(format!(
                            "unknown pattern symbol {other:?}"
                        )))
                    }
                };
            }
        }

        Self::from_mask(width, height, mask, (width / 2, height / 2))
    }

    /// Return a copy of the element with a different anchor.
    ///
    /// # Errors
    ///
    /// Returns [`ImgprocError::InvalidKernel`] if the anchor lies outside the mask.
    pub fn with_anchor(&self, ax: usize, ay: usize) -> Result<Self, ImgprocError> {
        Self::from_mask(self.width, self.height, self.mask.clone(), (ax, ay))
    }

    /// Get the width of the kernel.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the height of the kernel.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the `(x, y)` anchor of the kernel.
    pub fn anchor(&self) -> (usize, usize) {
        self.anchor
    }

    /// Get the row-major mask of the kernel.
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Whether the cell `(x, y)` is set. Out of range cells are unset.
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.mask[y * self.width + x]
    }

    /// Iterate the `(dx, dy)` offsets of the set cells relative to the anchor.
    pub fn offsets(&self) -> impl Iterator<Item = (isize, isize)> + '_ {
        let (ax, ay) = (self.anchor.0 as isize, self.anchor.1 as isize);
        let width = self.width;
        self.mask
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(move |(i, _)| ((i % width) as isize - ax, (i / width) as isize - ay))
    }

    /// Reflect the element through its anchor.
    ///
    /// Every offset `(dx, dy)` of the result is `(-dx, -dy)` of `self`.
    pub fn reflect(&self) -> Self {
        let mask = self.mask.iter().rev().copied().collect();
        Self {
            mask,
            width: self.width,
            height: self.height,
            anchor: (
                self.width - 1 - self.anchor.0,
                self.height - 1 - self.anchor.1,
            ),
        }
    }
}

impl Default for StructuringElement {
    /// A 5x5 box anchored at its center.
    fn default() -> Self {
        Self {
            mask: vec![true; 25],
            width: 5,
            height: 5,
            anchor: (2, 2),
        }
    }
}

fn box_element(size: usize) -> Result<StructuringElement, ImgprocError> {
    StructuringElement::from_mask(size, size, vec![true; size * size], (size / 2, size / 2))
}

fn cross_element(size: usize) -> Result<StructuringElement, ImgprocError> {
    let mut mask = vec![false; size * size];
    let mid = size / 2;

    for j in 0..size {
        mask[mid * size + j] = true;
        mask[j * size + mid] = true;
    }

    StructuringElement::from_mask(size, size, mask, (mid, mid))
}

fn ellipse_element(width: usize, height: usize) -> Result<StructuringElement, ImgprocError> {
    let mut mask = vec![false; width * height];
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;
    let rx = width as f32 / 2.0;
    let ry = height as f32 / 2.0;

    for i in 0..height {
        for j in 0..width {
            let x = j as f32 - cx;
            let y = i as f32 - cy;
            if (x * x) / (rx * rx) + (y * y) / (ry * ry) <= 1.0 {
                mask[i * width + j] = true;
            }
        }
    }

    StructuringElement::from_mask(width, height, mask, (width / 2, height / 2))
}
