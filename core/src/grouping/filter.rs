//! Input cleanup applied before a series is classified

use crate::metadata::tags::{
    get_int_value, get_string_value, INSTANCE_NUMBER, PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE,
    SOP_INSTANCE_UID,
};
use crate::metadata::MetadataAccessor;
use crate::types::ImageType;
use crate::volume::geometry::{image_orientation, image_position};
use log::{debug, info};
use std::collections::HashSet;

/// Orientation vectors closer than this are considered equal
const ORIENTATION_TOLERANCE: f64 = 1e-3;

/// Drops repeated instances
///
/// An instance is a duplicate when its SOPInstanceUID was already seen, or
/// when an earlier instance has the same ImagePositionPatient and
/// InstanceNumber.
pub fn remove_duplicates<'a, A: MetadataAccessor>(instances: &[&'a A]) -> Vec<&'a A> {
    let mut uids: HashSet<String> = HashSet::new();
    let mut slots: HashSet<([u64; 3], i64)> = HashSet::new();

    let kept: Vec<&'a A> = instances
        .iter()
        .copied()
        .filter(|dcm| {
            if let Some(uid) = get_string_value(*dcm, SOP_INSTANCE_UID) {
                if !uids.insert(uid) {
                    return false;
                }
            }
            match (image_position(*dcm), get_int_value(*dcm, INSTANCE_NUMBER)) {
                (Ok(p), Some(n)) => slots.insert(([p[0].to_bits(), p[1].to_bits(), p[2].to_bits()], n)),
                _ => true,
            }
        })
        .collect();

    if kept.len() < instances.len() {
        info!("Removed {} duplicate slices", instances.len() - kept.len());
    }
    kept
}

/// Drops instances whose ImageType marks them as localizers
pub fn remove_localizers_by_image_type<'a, A: MetadataAccessor>(
    instances: &[&'a A],
) -> Vec<&'a A> {
    let kept: Vec<&'a A> = instances
        .iter()
        .copied()
        .filter(|dcm| !ImageType::from_accessor(*dcm).is_localizer())
        .collect();

    if kept.len() < instances.len() {
        info!(
            "Removed {} localizers by ImageType",
            instances.len() - kept.len()
        );
    }
    kept
}

fn same_orientation(a: &[f64; 6], b: &[f64; 6]) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| (x - y).abs() < ORIENTATION_TOLERANCE)
}

/// Keeps only the most common ImageOrientationPatient of the series
///
/// Instances without a readable orientation are kept. Ties go to the
/// orientation seen first.
pub fn remove_localizers_by_orientation<'a, A: MetadataAccessor>(
    instances: &[&'a A],
) -> Vec<&'a A> {
    let orientations: Vec<Option<[f64; 6]>> = instances
        .iter()
        .map(|dcm| image_orientation(*dcm).ok())
        .collect();

    // (representative orientation, count)
    let mut groups: Vec<([f64; 6], usize)> = Vec::new();
    for orientation in orientations.iter().flatten() {
        match groups
            .iter_mut()
            .find(|(rep, _)| same_orientation(rep, orientation))
        {
            Some((_, count)) => *count += 1,
            None => groups.push((*orientation, 1)),
        }
    }

    if groups.len() <= 1 {
        return instances.to_vec();
    }

    let mut dominant = groups[0];
    for group in &groups[1..] {
        if group.1 > dominant.1 {
            dominant = *group;
        }
    }
    debug!("{} orientations in series, keeping {:?}", groups.len(), dominant.0);

    let kept: Vec<&'a A> = instances
        .iter()
        .zip(orientations.iter())
        .filter(|(_, o)| o.map_or(true, |o| same_orientation(&o, &dominant.0)))
        .map(|(dcm, _)| *dcm)
        .collect();

    info!(
        "Removed {} localizers by orientation",
        instances.len() - kept.len()
    );
    kept
}

/// Whether an instance carries what slice assembly reads
///
/// Singleframe instances need an InstanceNumber, a 6-value
/// ImageOrientationPatient and a 3-value ImagePositionPatient. Multiframe
/// instances always pass.
pub fn is_imaging_instance<A: MetadataAccessor + ?Sized>(dcm: &A) -> bool {
    if dcm.has_tag(PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE) {
        return true;
    }
    get_int_value(dcm, INSTANCE_NUMBER).is_some()
        && image_orientation(dcm).is_ok()
        && image_position(dcm).is_ok()
}

/// Drops objects sharing the series UID that are not image slices
/// (presentation states, reports, ...)
pub fn remove_non_imaging<'a, A: MetadataAccessor>(instances: &[&'a A]) -> Vec<&'a A> {
    let kept: Vec<&'a A> = instances
        .iter()
        .copied()
        .filter(|dcm| is_imaging_instance(*dcm))
        .collect();

    if kept.len() < instances.len() {
        info!(
            "Removed {} non-imaging instances",
            instances.len() - kept.len()
        );
    }
    kept
}

/// Full cleanup: non-imaging objects, duplicates, then ImageType
/// localizers, then (singleframe series only) orientation localizers
pub fn filter_series<'a, A: MetadataAccessor>(instances: &[&'a A]) -> Vec<&'a A> {
    let instances = remove_non_imaging(instances);
    let instances = remove_duplicates(&instances);
    let instances = remove_localizers_by_image_type(&instances);

    let multiframe = instances
        .iter()
        .any(|dcm| dcm.has_tag(PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE));
    if multiframe {
        instances
    } else {
        remove_localizers_by_orientation(&instances)
    }
}
