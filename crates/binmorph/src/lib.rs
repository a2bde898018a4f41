//! Binary morphology and connected-component blob analysis.
//!
//! ```rust
//! use binmorph::image::{Image, ImageSize};
//! use binmorph::imgproc::labeling::{label, Connectivity};
//!
//! let image = Image::<u8, 1>::new(ImageSize { width: 3, height: 1 }, vec![255, 0, 255]).unwrap();
//! let labels = label(&image, Connectivity::Eight).unwrap();
//! assert_eq!(labels.num_components(), 2);
//! ```

#[doc(inline)]
pub use binmorph_image as image;

#[doc(inline)]
pub use binmorph_imgproc as imgproc;
