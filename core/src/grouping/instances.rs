use crate::metadata::tags::{get_int_value, INSTANCE_NUMBER, PHILIPS_SLICE_NUMBER_MR};
use crate::metadata::MetadataAccessor;
use crate::volume::geometry::sort_by_position;
use log::debug;

/// Instances of one series split into timepoints
///
/// Outer index is the timepoint, inner vectors hold that timepoint's slices
/// in acquisition order. Buckets may differ in length; that is reported when
/// the volume is assembled.
pub type Grouping<'a, A> = Vec<Vec<&'a A>>;

/// Stack position (2001,100A) of an instance, 0 when absent
pub fn stack_position<A: MetadataAccessor + ?Sized>(dcm: &A) -> i64 {
    get_int_value(dcm, PHILIPS_SLICE_NUMBER_MR).unwrap_or(0)
}

/// Orders instances by InstanceNumber when every instance has one,
/// otherwise by position along the dominant patient axis
///
/// Both sorts are stable.
pub fn sort_instances<'a, A: MetadataAccessor>(instances: &[&'a A]) -> Vec<&'a A> {
    let numbers: Option<Vec<i64>> = instances
        .iter()
        .map(|dcm| get_int_value(*dcm, INSTANCE_NUMBER))
        .collect();

    match numbers {
        Some(numbers) => {
            let mut keyed: Vec<(i64, &'a A)> = numbers.into_iter().zip(instances.iter().copied()).collect();
            keyed.sort_by_key(|(n, _)| *n);
            keyed.into_iter().map(|(_, dcm)| dcm).collect()
        }
        None => {
            debug!("InstanceNumber missing, sorting by position");
            sort_by_position(instances)
        }
    }
}

/// Splits a series into timepoint buckets
///
/// After [`sort_instances`], a run of equal consecutive stack positions
/// walks through the timepoints (the same slice acquired again), while a
/// change of stack position returns to timepoint 0. A series whose
/// instances all share one stack position forms a single timepoint.
pub fn group_instances<'a, A: MetadataAccessor>(instances: &[&'a A]) -> Grouping<'a, A> {
    if instances.is_empty() {
        return Vec::new();
    }
    let sorted = sort_instances(instances);
    let positions: Vec<i64> = sorted.iter().map(|dcm| stack_position(*dcm)).collect();

    if positions.windows(2).all(|w| w[0] == w[1]) {
        return vec![sorted];
    }

    let mut grouping: Grouping<'a, A> = vec![Vec::new()];
    let mut previous: Option<i64> = None;
    let mut timepoint = 0usize;

    for (dcm, position) in sorted.into_iter().zip(positions) {
        if previous == Some(position) {
            timepoint += 1;
            if grouping.len() <= timepoint {
                grouping.push(Vec::new());
            }
        } else {
            timepoint = 0;
        }
        grouping[timepoint].push(dcm);
        previous = Some(position);
    }

    grouping
}
