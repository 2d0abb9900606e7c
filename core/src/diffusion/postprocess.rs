use crate::types::VolumeResult;
use crate::volume::squeeze_trailing;
use log::{info, warn};
use ndarray::{Axis, Slice};

/// Removes a spurious trailing b=0 volume from a diffusion result
///
/// The last volume and its table row are dropped when the table carries
/// some weighting and its last b-value is exactly zero. The returned table
/// is marked as post-processed, so applying this again is a no-op.
///
/// The time axis must match the table length; otherwise the result is
/// returned unchanged.
pub fn trim_trailing_zero_volume(volume: VolumeResult) -> VolumeResult {
    let Some(table) = volume.diffusion.as_ref() else {
        return volume;
    };
    if table.is_post_processed() {
        return volume;
    }

    let last_is_b0 = table.last().is_some_and(|entry| entry.bval == 0.0);
    if table.is_all_zero() || !last_is_b0 {
        let table = table.clone().mark_post_processed();
        return VolumeResult {
            diffusion: Some(table),
            ..volume
        };
    }

    let volumes = volume.volume_count();
    if table.len() < 2 || volumes != table.len() {
        warn!(
            "Cannot trim trailing b=0 volume: {} volumes for {} table rows",
            volumes,
            table.len()
        );
        return volume;
    }

    let trimmed = table.without_last();
    info!(
        "Removed trailing b=0 volume, {} volumes remain",
        trimmed.len()
    );

    let data = volume
        .data
        .slice_axis(Axis(3), Slice::from(0..volumes - 1))
        .to_owned();

    VolumeResult {
        data: squeeze_trailing(data),
        diffusion: if trimmed.is_all_zero() {
            None
        } else {
            Some(trimmed)
        },
        ..volume
    }
}
