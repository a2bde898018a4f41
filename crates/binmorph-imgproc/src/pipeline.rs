use std::collections::BTreeMap;

use binmorph_image::Image;

use crate::binary::BinaryMask;
use crate::blobs::{extract_blobs, filter_blobs, AreaComparator, BlobRecord};
use crate::error::ImgprocError;
use crate::labeling::{label, Connectivity, LabelBuffer};
use crate::morphology::{
    close_mask, ensure_active, open_mask, BorderMode, KernelShape, StructuringElement,
};
use crate::threshold::DEFAULT_THRESHOLD;

/// Morphological cleanup applied to the binary image before labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cleanup {
    /// Remove specks smaller than the structuring element.
    Open,
    /// Fill holes and gaps smaller than the structuring element.
    Close,
}

/// Area predicate applied to the extracted blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AreaFilter {
    /// The area the blobs are compared against.
    pub threshold: u64,
    /// The comparison to apply.
    pub comparator: AreaComparator,
}

/// Parameters of a [`BlobPipeline`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BlobPipelineConfig {
    /// Luminance level separating background from foreground.
    pub threshold: u8,
    /// Optional cleanup before labeling.
    pub cleanup: Option<Cleanup>,
    /// Structuring element used by the cleanup.
    pub kernel: KernelShape,
    /// Border handling of the cleanup.
    pub border: BorderMode,
    /// Pixel adjacency used for labeling.
    pub connectivity: Connectivity,
    /// Optional area filter; all blobs are kept without one.
    pub area_filter: Option<AreaFilter>,
}

impl Default for BlobPipelineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            cleanup: None,
            kernel: KernelShape::Box { size: 5 },
            border: BorderMode::default(),
            connectivity: Connectivity::default(),
            area_filter: None,
        }
    }
}

/// Every product of a [`BlobPipeline::run`].
#[derive(Debug, Clone)]
pub struct BlobAnalysis {
    /// The thresholded input.
    pub binary: Image<u8, 1>,
    /// The binary image after cleanup; equal to `binary` without cleanup.
    pub cleaned: Image<u8, 1>,
    /// The labeled components of `cleaned`.
    pub labels: LabelBuffer,
    /// Measurements of every component.
    pub blobs: BTreeMap<i32, BlobRecord>,
    /// The blobs passing the area filter.
    pub selected: BTreeMap<i32, BlobRecord>,
    /// Binary image of the selected blobs.
    pub filtered: Image<u8, 1>,
}

/// Threshold, clean up, label, measure and filter in one call.
///
/// # Example
///
/// ```rust
/// use binmorph_image::{Image, ImageSize};
/// use binmorph_imgproc::pipeline::{BlobPipeline, BlobPipelineConfig};
///
/// let mut image = Image::<u8, 1>::from_size_val(ImageSize { width: 8, height: 4 }, 0).unwrap();
/// image.set_pixel(1, 1, 0, 200).unwrap();
/// image.set_pixel(5, 2, 0, 200).unwrap();
///
/// let pipeline = BlobPipeline::new(BlobPipelineConfig::default()).unwrap();
/// let analysis = pipeline.run(&image).unwrap();
/// assert_eq!(analysis.blobs.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct BlobPipeline {
    config: BlobPipelineConfig,
    kernel: StructuringElement,
}

impl BlobPipeline {
    /// Create a pipeline, building its structuring element.
    ///
    /// # Errors
    ///
    /// Returns [`ImgprocError::InvalidKernel`] if the configured kernel is invalid.
    pub fn new(config: BlobPipelineConfig) -> Result<Self, ImgprocError> {
        let kernel = StructuringElement::new(config.kernel)?;
        ensure_active(&kernel)?;
        Ok(Self { config, kernel })
    }

    /// The pipeline parameters.
    pub fn config(&self) -> &BlobPipelineConfig {
        &self.config
    }

    /// Run every stage on `src`.
    ///
    /// # Errors
    ///
    /// Returns [`ImgprocError::EmptyImage`] if the image has no pixels.
    pub fn run<const C: usize>(&self, src: &Image<u8, C>) -> Result<BlobAnalysis, ImgprocError> {
        let config = &self.config;

        let mask = BinaryMask::from_image(src, config.threshold)?;
        let cleaned = match config.cleanup {
            Some(Cleanup::Open) => open_mask(&mask, &self.kernel, config.border),
            Some(Cleanup::Close) => close_mask(&mask, &self.kernel, config.border),
            None => mask.clone(),
        };
        log::debug!(
            "pipeline: {} foreground pixels, {} after cleanup",
            mask.count(),
            cleaned.count()
        );

        let binary = mask.to_image()?;
        let cleaned = cleaned.to_image()?;

        let labels = label(&cleaned, config.connectivity)?;
        let blobs = extract_blobs(&labels);

        // every blob has a positive area
        let AreaFilter {
            threshold,
            comparator,
        } = config.area_filter.unwrap_or(AreaFilter {
            threshold: 0,
            comparator: AreaComparator::Greater,
        });
        let (selected, filtered) = filter_blobs(&labels, &blobs, threshold, comparator)?;

        Ok(BlobAnalysis {
            binary,
            cleaned,
            labels,
            blobs,
            selected,
            filtered,
        })
    }
}
