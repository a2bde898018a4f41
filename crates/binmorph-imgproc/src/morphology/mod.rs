//! Binary morphological operators.
//!
//! Every operator thresholds its input once on luminance and returns a new
//! binary (`0`/`255`) single channel image.
//!
//! - [`erode`] / [`dilate`] are the two primitives.
//! - [`open`], [`close`], [`gradient`], [`top_hat`] and [`bottom_hat`] are derived
//!   from them with set algebra.
//! - [`hit_or_miss`], [`thin`], [`thicken`], [`endpoints`] and [`prune`] match exact
//!   foreground/background patterns.
//! - [`skeletonize`] reduces shapes to one pixel wide curves.

mod border;
mod element;
mod hit_or_miss;
mod ops;
mod skeleton;

pub use border::BorderMode;
pub use element::{KernelShape, StructuringElement};
pub use hit_or_miss::{endpoint_kernels, endpoints, hit_or_miss, prune, thicken, thin};
pub use ops::{bottom_hat, close, dilate, erode, gradient, open, top_hat};
pub use skeleton::{skeletonize, SkeletonMode};

pub(crate) use ops::{close_mask, ensure_active, open_mask};

pub use crate::threshold::DEFAULT_THRESHOLD;
