//! Slice ordering, affine construction and multiframe frame layout

use crate::error::{ConversionError, Result};
use crate::metadata::tags::*;
use crate::metadata::MetadataAccessor;
use crate::types::{Affine, PixelSpacing};
use log::debug;
use std::cmp::Ordering;
use std::collections::BTreeSet;

pub type Vec3 = [f64; 3];

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn scale(a: Vec3, s: f64) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: Vec3) -> f64 {
    (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt()
}

/// ImagePositionPatient (0020,0032)
pub fn image_position<A: MetadataAccessor + ?Sized>(dcm: &A) -> Result<Vec3> {
    let v = dcm.get_array(IMAGE_POSITION_PATIENT, 3)?;
    Ok([v[0], v[1], v[2]])
}

/// ImageOrientationPatient (0020,0037): row cosines then column cosines
pub fn image_orientation<A: MetadataAccessor + ?Sized>(dcm: &A) -> Result<[f64; 6]> {
    let v = dcm.get_array(IMAGE_ORIENTATION_PATIENT, 6)?;
    Ok([v[0], v[1], v[2], v[3], v[4], v[5]])
}

/// Stable sort of instances along the patient axis where their positions
/// spread the most
///
/// Input order is returned unchanged when any instance lacks a position.
pub fn sort_by_position<'a, A: MetadataAccessor>(instances: &[&'a A]) -> Vec<&'a A> {
    let positions: Option<Vec<Vec3>> = instances
        .iter()
        .map(|dcm| image_position(*dcm).ok())
        .collect();

    let Some(positions) = positions else {
        debug!("Positions missing, keeping input order");
        return instances.to_vec();
    };

    let axis = (0..3)
        .max_by(|a, b| {
            spread(&positions, *a)
                .partial_cmp(&spread(&positions, *b))
                .unwrap_or(Ordering::Equal)
        })
        .unwrap_or(2);

    let mut indexed: Vec<(f64, &'a A)> = positions
        .iter()
        .zip(instances.iter())
        .map(|(p, dcm)| (p[axis], *dcm))
        .collect();
    indexed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    indexed.into_iter().map(|(_, dcm)| dcm).collect()
}

fn spread(positions: &[Vec3], axis: usize) -> f64 {
    let (min, max) = positions
        .iter()
        .map(|p| p[axis])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    max - min
}

/// Largest deviation between consecutive slice distances and the mean step
pub fn max_slice_increment(positions: &[Vec3]) -> f64 {
    if positions.len() < 2 {
        return 0.0;
    }
    let n = positions.len() as f64;
    let mean_step = norm(sub(positions[positions.len() - 1], positions[0])) / (n - 1.0);
    positions
        .windows(2)
        .map(|w| (norm(sub(w[1], w[0])) - mean_step).abs())
        .fold(0.0, f64::max)
}

/// Builds the RAS affine of a slice stack
///
/// `positions` are the slice origins in acquisition order. With a single
/// slice the step follows the slice normal scaled by `slice_thickness`
/// (1 mm when unknown).
///
/// Returns the affine and the [`max_slice_increment`] of the positions.
pub fn affine_from_geometry(
    orientation: [f64; 6],
    spacing: PixelSpacing,
    slice_thickness: Option<f64>,
    positions: &[Vec3],
) -> Result<(Affine, f64)> {
    let first = *positions
        .first()
        .ok_or_else(|| ConversionError::InvalidGeometry("no slice positions".to_string()))?;
    let row_cosines = [orientation[0], orientation[1], orientation[2]];
    let col_cosines = [orientation[3], orientation[4], orientation[5]];

    let step = if positions.len() == 1 {
        let thickness = slice_thickness.unwrap_or(1.0);
        scale(cross(row_cosines, col_cosines), -thickness)
    } else {
        let last = positions[positions.len() - 1];
        scale(sub(last, first), 1.0 / (positions.len() - 1) as f64)
    };

    if norm(step) == 0.0 {
        return Err(ConversionError::InvalidGeometry(
            "all slices share one position".to_string(),
        ));
    }

    let (dr, dc) = (spacing.row, spacing.col);
    let affine = [
        [
            -row_cosines[0] * dc,
            -col_cosines[0] * dr,
            -step[0],
            -first[0],
        ],
        [
            -row_cosines[1] * dc,
            -col_cosines[1] * dr,
            -step[1],
            -first[1],
        ],
        [row_cosines[2] * dc, col_cosines[2] * dr, step[2], first[2]],
        [0.0, 0.0, 0.0, 1.0],
    ];
    Ok((affine, max_slice_increment(positions)))
}

/// Affine of an ordered singleframe slice stack, read from its instances
pub fn create_affine<A: MetadataAccessor>(sorted: &[&A]) -> Result<(Affine, f64)> {
    let first = sorted.first().ok_or(ConversionError::EmptySeries)?;
    let orientation = image_orientation(*first)?;
    let spacing = PixelSpacing::from_accessor(*first)?;
    let thickness = get_float_value(*first, SLICE_THICKNESS);
    let positions = sorted
        .iter()
        .map(|dcm| image_position(*dcm))
        .collect::<Result<Vec<_>>>()?;
    affine_from_geometry(orientation, spacing, thickness, &positions)
}

/// Placement of every frame of a multiframe bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLayout {
    /// Slices per stack
    pub slices: usize,
    /// Number of stacks (timepoints)
    pub stacks: usize,
    /// `(slice, stack)` of each frame, in frame order
    pub cells: Vec<(usize, usize)>,
}

impl FrameLayout {
    /// Index of the first frame (in frame order) of each stack
    pub fn first_frame_of_stacks(&self) -> Vec<Option<usize>> {
        let mut first = vec![None; self.stacks];
        for (frame, (_, stack)) in self.cells.iter().enumerate() {
            if first[*stack].is_none() {
                first[*stack] = Some(frame);
            }
        }
        first
    }

    /// Frame indices of one stack ordered by slice
    pub fn frames_of_stack(&self, stack: usize) -> Vec<usize> {
        let mut frames: Vec<(usize, usize)> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, (_, t))| *t == stack)
            .map(|(f, (z, _))| (*z, f))
            .collect();
        frames.sort();
        frames.into_iter().map(|(_, f)| f).collect()
    }
}

/// Content item of a frame: FrameContentSequence[0]
fn frame_content<A: MetadataAccessor + ?Sized>(frame: &A) -> Option<&A::Item> {
    first_item(frame, FRAME_CONTENT_SEQUENCE)
}

fn in_stack_position<A: MetadataAccessor + ?Sized>(frame: &A) -> Option<i64> {
    frame_content(frame).and_then(|c| get_int_value(c, IN_STACK_POSITION_NUMBER))
}

fn temporal_position<A: MetadataAccessor + ?Sized>(frame: &A) -> Option<i64> {
    frame_content(frame).and_then(|c| get_int_value(c, TEMPORAL_POSITION_INDEX))
}

/// Slices per stack declared in the Philips stack sequence (2001,105F)[0]
fn declared_stack_slices<A: MetadataAccessor + ?Sized>(bundle: &A) -> Option<usize> {
    first_item(bundle, PHILIPS_STACK_SEQUENCE)
        .and_then(|item| get_int_value(item, PHILIPS_NUMBER_OF_STACK_SLICES))
        .filter(|n| *n > 0)
        .map(|n| n as usize)
}

/// Works out where each frame of a multiframe bundle goes
///
/// Slices per stack come from the Philips stack sequence, falling back to
/// the number of distinct InStackPositionNumber values. A frame's slice is
/// its InStackPositionNumber - 1 (frame index modulo slices without one);
/// its stack is the rank of its TemporalPositionIndex when those values
/// enumerate the stacks, otherwise the count of earlier frames on the same
/// slice.
pub fn frame_layout<A: MetadataAccessor + ?Sized>(bundle: &A) -> Result<FrameLayout> {
    let frames = bundle.get_sequence(PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE)?;
    if frames.is_empty() {
        return Err(ConversionError::EmptySeries);
    }
    let frame_count = frames.len();

    let positions: Vec<Option<i64>> = frames.iter().map(in_stack_position).collect();
    let slices = match declared_stack_slices(bundle) {
        Some(n) => n,
        None => {
            let distinct: BTreeSet<i64> = positions.iter().flatten().copied().collect();
            if distinct.is_empty() {
                frame_count
            } else {
                distinct.len()
            }
        }
    };

    if slices == 0 || frame_count % slices != 0 {
        return Err(ConversionError::MissingInstances(format!(
            "{} frames do not fill stacks of {} slices",
            frame_count, slices
        )));
    }
    let stacks = frame_count / slices;

    let slice_of: Vec<usize> = positions
        .iter()
        .enumerate()
        .map(|(f, p)| match p {
            Some(p) if *p >= 1 => (*p - 1) as usize,
            _ => f % slices,
        })
        .collect();

    let temporal: Option<Vec<i64>> = frames.iter().map(temporal_position).collect();
    let stack_of: Vec<usize> = match temporal {
        Some(values) if values.iter().collect::<BTreeSet<_>>().len() == stacks => {
            let ranks: Vec<i64> = values
                .iter()
                .copied()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            values
                .iter()
                .map(|v| ranks.iter().position(|r| r == v).unwrap_or(0))
                .collect()
        }
        _ => {
            let mut seen = vec![0usize; slices];
            slice_of
                .iter()
                .map(|z| {
                    let t = seen.get(*z).copied().unwrap_or(stacks);
                    if let Some(count) = seen.get_mut(*z) {
                        *count += 1;
                    }
                    t
                })
                .collect()
        }
    };

    let mut filled = vec![false; slices * stacks];
    let mut cells = Vec::with_capacity(frame_count);
    for (f, (z, t)) in slice_of.iter().zip(stack_of.iter()).enumerate() {
        if *z >= slices || *t >= stacks {
            return Err(ConversionError::MissingInstances(format!(
                "frame {} placed outside {} slices x {} stacks",
                f, slices, stacks
            )));
        }
        let cell = t * slices + z;
        if filled[cell] {
            return Err(ConversionError::MissingInstances(format!(
                "slice {} of stack {} appears twice",
                z, t
            )));
        }
        filled[cell] = true;
        cells.push((*z, *t));
    }

    Ok(FrameLayout {
        slices,
        stacks,
        cells,
    })
}

/// Number of stacks (timepoints) in a multiframe bundle
pub fn multiframe_stack_count<A: MetadataAccessor + ?Sized>(bundle: &A) -> Result<usize> {
    frame_layout(bundle).map(|layout| layout.stacks)
}

/// Looks up a functional group item, per-frame first then shared
fn functional_group<'a, A: MetadataAccessor + ?Sized>(
    bundle: &'a A,
    frame: &'a A::Item,
    tag: dicom_core::Tag,
) -> Option<&'a <A::Item as MetadataAccessor>::Item> {
    first_item(frame, tag).or_else(|| {
        first_item(bundle, SHARED_FUNCTIONAL_GROUPS_SEQUENCE)
            .and_then(|shared| first_item(shared, tag))
    })
}

/// Affine of a multiframe bundle, from the frames of its first stack
pub fn multiframe_affine<A: MetadataAccessor + ?Sized>(
    bundle: &A,
    layout: &FrameLayout,
) -> Result<(Affine, f64)> {
    let frames = bundle.get_sequence(PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE)?;
    let stack = layout.frames_of_stack(0);
    let first = stack
        .first()
        .and_then(|f| frames.get(*f))
        .ok_or(ConversionError::EmptySeries)?;

    let orientation = match functional_group(bundle, first, PLANE_ORIENTATION_SEQUENCE) {
        Some(item) => image_orientation(item)?,
        None => image_orientation(bundle)?,
    };
    let measures = functional_group(bundle, first, PIXEL_MEASURES_SEQUENCE);
    let spacing = match measures {
        Some(item) => PixelSpacing::from_accessor(item)?,
        None => PixelSpacing::from_accessor(bundle)?,
    };
    let thickness = measures
        .and_then(|item| get_float_value(item, SLICE_THICKNESS))
        .or_else(|| get_float_value(bundle, SLICE_THICKNESS));

    let positions = stack
        .iter()
        .map(|f| {
            let frame = frames.get(*f).ok_or(ConversionError::EmptySeries)?;
            let item = first_item(frame, PLANE_POSITION_SEQUENCE)
                .ok_or(ConversionError::AttributeMissing(PLANE_POSITION_SEQUENCE))?;
            image_position(item)
        })
        .collect::<Result<Vec<_>>>()?;

    affine_from_geometry(orientation, spacing, thickness, &positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{multiframe_bundle, put_sequence, put_str, SliceBuilder};
    use dicom_core::VR;
    use dicom_object::InMemDicomObject;

    #[test]
    fn test_affine_axial_stack() {
        let (affine, increment) = affine_from_geometry(
            [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            PixelSpacing::new(0.5, 0.75),
            Some(3.0),
            &[[10.0, 20.0, 30.0], [10.0, 20.0, 33.0], [10.0, 20.0, 36.0]],
        )
        .unwrap();

        assert_eq!(affine[0], [-0.75, -0.0, -0.0, -10.0]);
        assert_eq!(affine[1], [-0.0, -0.5, -0.0, -20.0]);
        assert_eq!(affine[2], [0.0, 0.0, 3.0, 30.0]);
        assert_eq!(affine[3], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(increment, 0.0);
    }

    #[test]
    fn test_affine_single_slice_uses_thickness() {
        let (affine, _) = affine_from_geometry(
            [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            PixelSpacing::new(1.0, 1.0),
            Some(4.0),
            &[[0.0, 0.0, 0.0]],
        )
        .unwrap();
        // step = -(row x col) * thickness
        assert_eq!(affine[2][2], -4.0);
    }

    #[test]
    fn test_affine_rejects_coincident_slices() {
        let result = affine_from_geometry(
            [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            PixelSpacing::new(1.0, 1.0),
            None,
            &[[0.0, 0.0, 5.0], [0.0, 0.0, 5.0]],
        );
        assert!(matches!(result, Err(ConversionError::InvalidGeometry(_))));
    }

    #[test]
    fn test_max_slice_increment() {
        let positions = [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, 3.0], [0.0, 0.0, 4.5]];
        // mean step 1.5, distances 1.0 / 2.0 / 1.5
        assert!((max_slice_increment(&positions) - 0.5).abs() < 1e-12);
        assert_eq!(max_slice_increment(&positions[..1]), 0.0);
    }

    #[test]
    fn test_sort_by_position_dominant_axis() {
        let a = SliceBuilder::new(None, 0.0).position([5.0, 0.0, 1.0]).build();
        let b = SliceBuilder::new(None, 0.0).position([-5.0, 0.0, 1.1]).build();
        let c = SliceBuilder::new(None, 0.0).position([0.0, 0.0, 0.9]).build();
        let sorted = sort_by_position(&[&a, &b, &c]);
        assert!(std::ptr::eq(sorted[0], &b));
        assert!(std::ptr::eq(sorted[1], &c));
        assert!(std::ptr::eq(sorted[2], &a));
    }

    #[test]
    fn test_create_affine_from_instances() {
        let slices: Vec<InMemDicomObject> = (0..3)
            .map(|i| SliceBuilder::new(Some(i + 1), 2.0 * i as f64).build())
            .collect();
        let refs: Vec<&InMemDicomObject> = slices.iter().collect();
        let (affine, _) = create_affine(&refs).unwrap();
        assert_eq!(affine[2][2], 2.0);
        assert_eq!(affine[0][0], -1.0);
    }

    #[test]
    fn test_frame_layout_from_stack_sequence() {
        let bundle = multiframe_bundle(3, 2, None);
        let layout = frame_layout(&bundle).unwrap();
        assert_eq!(layout.slices, 3);
        assert_eq!(layout.stacks, 2);
        assert_eq!(layout.cells[0], (0, 0));
        assert_eq!(layout.cells[4], (1, 1));
        assert_eq!(layout.first_frame_of_stacks(), vec![Some(0), Some(3)]);
        assert_eq!(layout.frames_of_stack(1), vec![3, 4, 5]);
        assert_eq!(multiframe_stack_count(&bundle).unwrap(), 2);
    }

    #[test]
    fn test_frame_layout_without_stack_sequence() {
        let mut bundle = multiframe_bundle(2, 3, None);
        bundle.remove_element(PHILIPS_STACK_SEQUENCE);
        let layout = frame_layout(&bundle).unwrap();
        assert_eq!(layout.slices, 2);
        assert_eq!(layout.stacks, 3);
    }

    #[test]
    fn test_frame_layout_rejects_partial_stack() {
        let mut bundle = multiframe_bundle(3, 2, None);
        let mut stack_item = InMemDicomObject::new_empty();
        put_str(&mut stack_item, PHILIPS_NUMBER_OF_STACK_SLICES, VR::SS, "4");
        put_sequence(&mut bundle, PHILIPS_STACK_SEQUENCE, vec![stack_item]);
        assert!(matches!(
            frame_layout(&bundle),
            Err(ConversionError::MissingInstances(_))
        ));
    }

    #[test]
    fn test_multiframe_affine() {
        let bundle = multiframe_bundle(3, 2, None);
        let layout = frame_layout(&bundle).unwrap();
        let (affine, increment) = multiframe_affine(&bundle, &layout).unwrap();
        assert_eq!(affine[2][2], 2.0);
        assert_eq!(affine[2][3], 0.0);
        assert_eq!(increment, 0.0);
    }
}
