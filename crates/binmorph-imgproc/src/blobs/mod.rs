mod contour;
mod extract;
mod filter;

pub use contour::trace_boundary;
pub use extract::{extract_blobs, BlobRecord, Rect};
pub use filter::{filter_blobs, AreaComparator};
