#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// set algebra on binary images.
pub mod binary;

/// blob metrics, boundary tracing and area filtering.
pub mod blobs;

/// luminance view of multi-channel pixels.
pub mod color;

/// city-block distance transform.
pub mod distance_transform;

/// error types for the image processing operations.
pub mod error;

/// connected-component labeling.
pub mod labeling;

/// binary morphological operators.
pub mod morphology;

/// module containing parallelization utilities.
pub mod parallel;

/// end-to-end blob analysis pipeline.
pub mod pipeline;

/// operations to threshold images.
pub mod threshold;

pub use crate::error::ImgprocError;
