use std::collections::{BTreeMap, BTreeSet};

use binmorph_image::Image;

use super::BlobRecord;
use crate::binary::{BACKGROUND, FOREGROUND};
use crate::error::{ensure_not_empty, ImgprocError};
use crate::labeling::LabelBuffer;
use crate::parallel;

/// How a blob area is compared against the filter threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AreaComparator {
    /// Keep blobs with `area > threshold`.
    Greater,
    /// Keep blobs with `area < threshold`.
    Less,
    /// Keep blobs with `area == threshold`.
    Equal,
}

impl AreaComparator {
    /// Whether `area` passes the comparison against `threshold`.
    pub fn matches(self, area: u64, threshold: u64) -> bool {
        match self {
            AreaComparator::Greater => area > threshold,
            AreaComparator::Less => area < threshold,
            AreaComparator::Equal => area == threshold,
        }
    }
}

/// Select the blobs whose area passes `comparator` against `area_threshold`.
///
/// The kept records are returned unchanged. The image marks as foreground every
/// pixel whose label belongs to a kept record and everything else as background.
///
/// # Arguments
///
/// * `labels` - The label buffer the blobs were extracted from.
/// * `blobs` - The blob records keyed by label.
/// * `area_threshold` - The area the blobs are compared against.
/// * `comparator` - The comparison to apply.
///
/// # Errors
///
/// Returns [`ImgprocError::EmptyImage`] if the label buffer has no pixels and
/// [`ImgprocError::UnknownLabel`] if a record is keyed by a label absent from `labels`.
pub fn filter_blobs(
    labels: &LabelBuffer,
    blobs: &BTreeMap<i32, BlobRecord>,
    area_threshold: u64,
    comparator: AreaComparator,
) -> Result<(BTreeMap<i32, BlobRecord>, Image<u8, 1>), ImgprocError> {
    ensure_not_empty(labels.size())?;
    if let Some(&missing) = blobs
        .keys()
        .find(|&l| labels.labels().binary_search(l).is_err())
    {
        return Err(ImgprocError::UnknownLabel(missing));
    }

    let kept: BTreeMap<i32, BlobRecord> = blobs
        .iter()
        .filter(|(_, blob)| comparator.matches(blob.area, area_threshold))
        .map(|(&l, blob)| (l, blob.clone()))
        .collect();

    let selected: BTreeSet<i32> = kept.keys().copied().collect();

    let mut dst = Image::<u8, 1>::from_size_val(labels.size(), BACKGROUND)?;
    parallel::par_iter_rows(labels.image(), &mut dst, |l, d| {
        if selected.contains(&l[0]) {
            d[0] = FOREGROUND;
        }
    });

    log::debug!(
        "filter_blobs: kept {} of {} blobs ({comparator:?} {area_threshold})",
        kept.len(),
        blobs.len()
    );

    Ok((kept, dst))
}
