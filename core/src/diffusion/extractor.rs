use crate::error::{ConversionError, Result};
use crate::grouping::Grouping;
use crate::metadata::tags::*;
use crate::metadata::MetadataAccessor;
use crate::types::{DiffusionConvention, DiffusionEntry, DiffusionTable};
use crate::volume::geometry::FrameLayout;
use log::{debug, info};

/// Reads one row under the Philips private convention
fn private_entry<A: MetadataAccessor + ?Sized>(dcm: &A) -> Result<DiffusionEntry> {
    Ok(DiffusionEntry::new(
        dcm.get_float(PHILIPS_B_VALUE)?,
        [
            dcm.get_float(PHILIPS_DIFFUSION_DIRECTION_RL)?,
            dcm.get_float(PHILIPS_DIFFUSION_DIRECTION_AP)?,
            dcm.get_float(PHILIPS_DIFFUSION_DIRECTION_FH)?,
        ],
    ))
}

/// Reads one row under the standard convention
fn standard_entry<A: MetadataAccessor + ?Sized>(dcm: &A) -> Result<DiffusionEntry> {
    let bval = dcm.get_float(DIFFUSION_B_VALUE)?;
    let bvec = dcm.get_array(DIFFUSION_GRADIENT_ORIENTATION, 3)?;
    Ok(DiffusionEntry::new(bval, [bvec[0], bvec[1], bvec[2]]))
}

fn read_entry<A: MetadataAccessor + ?Sized>(
    dcm: &A,
    convention: DiffusionConvention,
) -> Result<DiffusionEntry> {
    match convention {
        DiffusionConvention::PrivateTags => private_entry(dcm),
        DiffusionConvention::StandardTags => standard_entry(dcm),
    }
}

/// At least one group leads with a complete, numeric row with b-value ≠ 0
fn validates<A: MetadataAccessor>(
    grouping: &Grouping<'_, A>,
    convention: DiffusionConvention,
) -> bool {
    grouping
        .iter()
        .filter_map(|group| group.first())
        .any(|dcm| matches!(read_entry(*dcm, convention), Ok(entry) if entry.bval != 0.0))
}

/// Philips private tags (2001,1003) and (2005,10B0..10B2)
pub fn is_bval_type_a<A: MetadataAccessor>(grouping: &Grouping<'_, A>) -> bool {
    validates(grouping, DiffusionConvention::PrivateTags)
}

/// Standard tags (0018,9087) and (0018,9089)
pub fn is_bval_type_b<A: MetadataAccessor>(grouping: &Grouping<'_, A>) -> bool {
    validates(grouping, DiffusionConvention::StandardTags)
}

/// Convention carrying the diffusion metadata, private tags first
pub fn detect_convention<A: MetadataAccessor>(
    grouping: &Grouping<'_, A>,
) -> Option<DiffusionConvention> {
    if is_bval_type_a(grouping) {
        Some(DiffusionConvention::PrivateTags)
    } else if is_bval_type_b(grouping) {
        Some(DiffusionConvention::StandardTags)
    } else {
        None
    }
}

/// One row per timepoint, read from the first instance of each group
///
/// Only the detected convention is read. Groups with missing or
/// non-numeric values get a zero row. Returns `None` for non-diffusion
/// series, including those whose table turns out all zero.
pub fn extract_singleframe_table<A: MetadataAccessor>(
    grouping: &Grouping<'_, A>,
) -> Option<DiffusionTable> {
    let convention = detect_convention(grouping)?;
    info!("Diffusion metadata in {} tags", convention);

    let entries = grouping
        .iter()
        .enumerate()
        .map(|(t, group)| {
            let Some(first) = group.first() else {
                return DiffusionEntry::zero();
            };
            read_entry(*first, convention).unwrap_or_else(|e| {
                debug!("Timepoint {}: {}, using zero row", t, e);
                DiffusionEntry::zero()
            })
        })
        .collect();

    non_zero(DiffusionTable::new(entries))
}

/// True when any frame carries an MRDiffusionSequence
pub fn is_multiframe_diffusion<A: MetadataAccessor + ?Sized>(bundle: &A) -> bool {
    bundle
        .get_sequence(PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE)
        .map(|frames| frames.iter().any(|f| f.has_tag(MR_DIFFUSION_SEQUENCE)))
        .unwrap_or(false)
}

/// Row of one frame: only DIRECTIONAL frames carry weighting
fn frame_entry<A: MetadataAccessor + ?Sized>(frame: &A) -> Result<DiffusionEntry> {
    let Some(diffusion) = first_item(frame, MR_DIFFUSION_SEQUENCE) else {
        return Ok(DiffusionEntry::zero());
    };
    let directionality = diffusion.get_text(DIFFUSION_DIRECTIONALITY)?;
    if directionality != "DIRECTIONAL" {
        return Ok(DiffusionEntry::zero());
    }

    let bval = diffusion.get_float(DIFFUSION_B_VALUE)?;
    let direction = first_item(diffusion, DIFFUSION_GRADIENT_DIRECTION_SEQUENCE).ok_or(
        ConversionError::AttributeMissing(DIFFUSION_GRADIENT_DIRECTION_SEQUENCE),
    )?;
    let bvec = direction.get_array(DIFFUSION_GRADIENT_ORIENTATION, 3)?;
    Ok(DiffusionEntry::new(bval, [bvec[0], bvec[1], bvec[2]]))
}

/// One row per stack, read from the first frame of that stack
///
/// The frame is looked up through `layout` rather than taken as
/// PerFrameFunctionalGroupsSequence item `stack`. Item `stack` only lies in
/// that stack when the stack index cycles fastest in frame order; in
/// stack-major bundles it would read slices of the first stack.
///
/// Returns `None` when no frame is diffusion weighted or the table is all
/// zero.
pub fn extract_multiframe_table<A: MetadataAccessor + ?Sized>(
    bundle: &A,
    layout: &FrameLayout,
) -> Option<DiffusionTable> {
    if !is_multiframe_diffusion(bundle) {
        return None;
    }
    let frames = bundle.get_sequence(PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE).ok()?;

    let entries = layout
        .first_frame_of_stacks()
        .into_iter()
        .enumerate()
        .map(|(stack, frame)| {
            let Some(frame) = frame.and_then(|f| frames.get(f)) else {
                return DiffusionEntry::zero();
            };
            frame_entry(frame).unwrap_or_else(|e| {
                debug!("Stack {}: {}, using zero row", stack, e);
                DiffusionEntry::zero()
            })
        })
        .collect();

    non_zero(DiffusionTable::new(entries))
}

fn non_zero(table: DiffusionTable) -> Option<DiffusionTable> {
    if table.is_all_zero() {
        info!("Diffusion table is all zero, treating series as non-diffusion");
        None
    } else {
        Some(table)
    }
}
