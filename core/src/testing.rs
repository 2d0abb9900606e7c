//! Builders for synthetic instances used across the unit tests

use crate::error::Result;
use crate::metadata::tags::*;
use crate::metadata::MetadataAccessor;
use crate::volume::pixels::FrameDecoder;
use dicom_core::value::DataSetSequence;
use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
use dicom_dictionary_std::tags::{
    BITS_ALLOCATED, BITS_STORED, HIGH_BIT, PHOTOMETRIC_INTERPRETATION, PIXEL_DATA,
    PIXEL_REPRESENTATION, SAMPLES_PER_PIXEL,
};
use dicom_object::InMemDicomObject;
use ndarray::Array3;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_UID: AtomicUsize = AtomicUsize::new(1);

pub fn put_str(dcm: &mut InMemDicomObject, tag: Tag, vr: VR, value: &str) {
    dcm.put(DataElement::new(tag, vr, PrimitiveValue::from(value)));
}

pub fn put_strs(dcm: &mut InMemDicomObject, tag: Tag, vr: VR, values: &[&str]) {
    dcm.put(DataElement::new(
        tag,
        vr,
        PrimitiveValue::Strs(values.iter().map(|s| s.to_string()).collect()),
    ));
}

pub fn put_floats(dcm: &mut InMemDicomObject, tag: Tag, values: &[f64]) {
    dcm.put(DataElement::new(
        tag,
        VR::FD,
        PrimitiveValue::F64(values.iter().copied().collect()),
    ));
}

pub fn put_u16(dcm: &mut InMemDicomObject, tag: Tag, value: u16) {
    dcm.put(DataElement::new(tag, VR::US, PrimitiveValue::from(value)));
}

pub fn put_sequence(dcm: &mut InMemDicomObject, tag: Tag, items: Vec<InMemDicomObject>) {
    dcm.put(DataElement::new(
        tag,
        VR::SQ,
        DataSetSequence::from(items),
    ));
}

fn decimal_strings(values: &[f64]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn put_decimals(dcm: &mut InMemDicomObject, tag: Tag, values: &[f64]) {
    let strings = decimal_strings(values);
    let refs: Vec<&str> = strings.iter().map(String::as_str).collect();
    put_strs(dcm, tag, VR::DS, &refs);
}

/// Builder for one singleframe MR slice
#[derive(Debug, Clone)]
pub struct SliceBuilder {
    dcm: InMemDicomObject,
}

impl SliceBuilder {
    /// Axial slice at height `z` with a 2x3 matrix and 1 mm pixels
    pub fn new(instance_number: Option<i64>, z: f64) -> Self {
        let mut dcm = InMemDicomObject::new_empty();
        let uid = NEXT_UID.fetch_add(1, Ordering::Relaxed);
        put_str(&mut dcm, SOP_INSTANCE_UID, VR::UI, &format!("1.2.826.0.1.{}", uid));
        put_str(&mut dcm, SERIES_INSTANCE_UID, VR::UI, "1.2.826.0.1.99");
        put_str(&mut dcm, MODALITY, VR::CS, "MR");
        put_strs(&mut dcm, IMAGE_TYPE, VR::CS, &["ORIGINAL", "PRIMARY", "M_FFE"]);
        if let Some(n) = instance_number {
            put_str(&mut dcm, INSTANCE_NUMBER, VR::IS, &n.to_string());
        }
        put_decimals(&mut dcm, IMAGE_POSITION_PATIENT, &[0.0, 0.0, z]);
        put_decimals(
            &mut dcm,
            IMAGE_ORIENTATION_PATIENT,
            &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        );
        put_decimals(&mut dcm, PIXEL_SPACING, &[1.0, 1.0]);
        put_str(&mut dcm, SLICE_THICKNESS, VR::DS, "1");
        put_u16(&mut dcm, ROWS, 2);
        put_u16(&mut dcm, COLUMNS, 3);
        Self { dcm }
    }

    pub fn series_uid(mut self, uid: &str) -> Self {
        put_str(&mut self.dcm, SERIES_INSTANCE_UID, VR::UI, uid);
        self
    }

    pub fn sop_uid(mut self, uid: &str) -> Self {
        put_str(&mut self.dcm, SOP_INSTANCE_UID, VR::UI, uid);
        self
    }

    pub fn series_number(mut self, number: i64) -> Self {
        put_str(&mut self.dcm, SERIES_NUMBER, VR::IS, &number.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        put_str(&mut self.dcm, SERIES_DESCRIPTION, VR::LO, description);
        self
    }

    pub fn stack_position(mut self, position: i64) -> Self {
        put_str(
            &mut self.dcm,
            PHILIPS_SLICE_NUMBER_MR,
            VR::IS,
            &position.to_string(),
        );
        self
    }

    pub fn position(mut self, position: [f64; 3]) -> Self {
        put_decimals(&mut self.dcm, IMAGE_POSITION_PATIENT, &position);
        self
    }

    pub fn orientation(mut self, orientation: [f64; 6]) -> Self {
        put_decimals(&mut self.dcm, IMAGE_ORIENTATION_PATIENT, &orientation);
        self
    }

    pub fn image_type(mut self, values: &[&str]) -> Self {
        put_strs(&mut self.dcm, IMAGE_TYPE, VR::CS, values);
        self
    }

    pub fn matrix(mut self, rows: u16, columns: u16) -> Self {
        put_u16(&mut self.dcm, ROWS, rows);
        put_u16(&mut self.dcm, COLUMNS, columns);
        self
    }

    pub fn rescale(mut self, slope: f64, intercept: f64) -> Self {
        put_str(&mut self.dcm, RESCALE_SLOPE, VR::DS, &slope.to_string());
        put_str(&mut self.dcm, RESCALE_INTERCEPT, VR::DS, &intercept.to_string());
        self
    }

    pub fn timing(mut self, repetition_time: f64, echo_time: f64) -> Self {
        put_str(
            &mut self.dcm,
            REPETITION_TIME,
            VR::DS,
            &repetition_time.to_string(),
        );
        put_str(&mut self.dcm, ECHO_TIME, VR::DS, &echo_time.to_string());
        self
    }

    /// Philips private diffusion tags
    pub fn private_diffusion(mut self, bval: f64, bvec: [f64; 3]) -> Self {
        put_str(&mut self.dcm, PHILIPS_B_VALUE, VR::FL, &bval.to_string());
        put_floats(&mut self.dcm, PHILIPS_DIFFUSION_DIRECTION_RL, &[bvec[0]]);
        put_floats(&mut self.dcm, PHILIPS_DIFFUSION_DIRECTION_AP, &[bvec[1]]);
        put_floats(&mut self.dcm, PHILIPS_DIFFUSION_DIRECTION_FH, &[bvec[2]]);
        self
    }

    /// Standard diffusion tags
    pub fn standard_diffusion(mut self, bval: f64, bvec: [f64; 3]) -> Self {
        put_floats(&mut self.dcm, DIFFUSION_B_VALUE, &[bval]);
        put_floats(&mut self.dcm, DIFFUSION_GRADIENT_ORIENTATION, &bvec);
        self
    }

    /// Native unsigned 16-bit MONOCHROME2 samples, row by row
    pub fn pixels(mut self, samples: &[u16]) -> Self {
        put_u16(&mut self.dcm, SAMPLES_PER_PIXEL, 1);
        put_str(&mut self.dcm, PHOTOMETRIC_INTERPRETATION, VR::CS, "MONOCHROME2");
        put_u16(&mut self.dcm, BITS_ALLOCATED, 16);
        put_u16(&mut self.dcm, BITS_STORED, 16);
        put_u16(&mut self.dcm, HIGH_BIT, 15);
        put_u16(&mut self.dcm, PIXEL_REPRESENTATION, 0);
        self.dcm.put(DataElement::new(
            PIXEL_DATA,
            VR::OW,
            PrimitiveValue::U16(samples.iter().copied().collect()),
        ));
        self
    }

    pub fn put_text(mut self, tag: Tag, vr: VR, value: &str) -> Self {
        put_str(&mut self.dcm, tag, vr, value);
        self
    }

    pub fn build(self) -> InMemDicomObject {
        self.dcm
    }
}

/// Builds a multiframe bundle of `stacks` stacks of `slices` axial slices
///
/// Frames are stored stack-major. `diffusion`, when given, holds one
/// `(bval, bvec)` row per stack.
pub fn multiframe_bundle(
    slices: usize,
    stacks: usize,
    diffusion: Option<&[(f64, [f64; 3])]>,
) -> InMemDicomObject {
    let mut dcm = InMemDicomObject::new_empty();
    put_str(&mut dcm, SOP_INSTANCE_UID, VR::UI, "1.2.826.0.2.1");
    put_str(&mut dcm, SERIES_INSTANCE_UID, VR::UI, "1.2.826.0.2");
    put_str(&mut dcm, MODALITY, VR::CS, "MR");
    put_str(&mut dcm, INSTANCE_NUMBER, VR::IS, "1");
    put_str(
        &mut dcm,
        NUMBER_OF_FRAMES,
        VR::IS,
        &(slices * stacks).to_string(),
    );
    put_u16(&mut dcm, ROWS, 2);
    put_u16(&mut dcm, COLUMNS, 3);

    let mut stack_item = InMemDicomObject::new_empty();
    put_str(
        &mut stack_item,
        PHILIPS_NUMBER_OF_STACK_SLICES,
        VR::SS,
        &slices.to_string(),
    );
    put_sequence(&mut dcm, PHILIPS_STACK_SEQUENCE, vec![stack_item]);

    let mut orientation = InMemDicomObject::new_empty();
    put_decimals(
        &mut orientation,
        IMAGE_ORIENTATION_PATIENT,
        &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    );
    let mut measures = InMemDicomObject::new_empty();
    put_decimals(&mut measures, PIXEL_SPACING, &[1.0, 1.0]);
    put_str(&mut measures, SLICE_THICKNESS, VR::DS, "2");
    let mut timing = InMemDicomObject::new_empty();
    put_floats(&mut timing, REPETITION_TIME, &[2500.0]);
    let mut shared = InMemDicomObject::new_empty();
    put_sequence(&mut shared, PLANE_ORIENTATION_SEQUENCE, vec![orientation]);
    put_sequence(&mut shared, PIXEL_MEASURES_SEQUENCE, vec![measures]);
    put_sequence(
        &mut shared,
        MR_TIMING_AND_RELATED_PARAMETERS_SEQUENCE,
        vec![timing],
    );
    put_sequence(&mut dcm, SHARED_FUNCTIONAL_GROUPS_SEQUENCE, vec![shared]);

    let mut frames = Vec::with_capacity(slices * stacks);
    for stack in 0..stacks {
        for slice in 0..slices {
            let mut frame = InMemDicomObject::new_empty();

            let mut content = InMemDicomObject::new_empty();
            put_str(
                &mut content,
                IN_STACK_POSITION_NUMBER,
                VR::UL,
                &(slice + 1).to_string(),
            );
            put_str(
                &mut content,
                TEMPORAL_POSITION_INDEX,
                VR::UL,
                &(stack + 1).to_string(),
            );
            put_sequence(&mut frame, FRAME_CONTENT_SEQUENCE, vec![content]);

            let mut position = InMemDicomObject::new_empty();
            put_decimals(
                &mut position,
                IMAGE_POSITION_PATIENT,
                &[0.0, 0.0, 2.0 * slice as f64],
            );
            put_sequence(&mut frame, PLANE_POSITION_SEQUENCE, vec![position]);

            let mut echo = InMemDicomObject::new_empty();
            put_floats(&mut echo, EFFECTIVE_ECHO_TIME, &[80.0]);
            put_sequence(&mut frame, MR_ECHO_SEQUENCE, vec![echo]);

            if let Some(rows) = diffusion {
                let (bval, bvec) = rows[stack];
                let mut diff = InMemDicomObject::new_empty();
                if bval > 0.0 {
                    put_str(&mut diff, DIFFUSION_DIRECTIONALITY, VR::CS, "DIRECTIONAL");
                    put_floats(&mut diff, DIFFUSION_B_VALUE, &[bval]);
                    let mut direction = InMemDicomObject::new_empty();
                    put_floats(&mut direction, DIFFUSION_GRADIENT_ORIENTATION, &bvec);
                    put_sequence(
                        &mut diff,
                        DIFFUSION_GRADIENT_DIRECTION_SEQUENCE,
                        vec![direction],
                    );
                } else {
                    put_str(&mut diff, DIFFUSION_DIRECTIONALITY, VR::CS, "NONE");
                    put_floats(&mut diff, DIFFUSION_B_VALUE, &[0.0]);
                }
                put_sequence(&mut frame, MR_DIFFUSION_SEQUENCE, vec![diff]);
            }

            frames.push(frame);
        }
    }
    put_sequence(&mut dcm, PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE, frames);
    dcm
}

/// Decoder producing synthetic samples from the instance header
///
/// Sample `(frame, row, col)` of an instance numbered `n` is
/// `n * 1000 + frame * 100 + row * 10 + col`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubDecoder;

impl<A: MetadataAccessor> FrameDecoder<A> for StubDecoder {
    fn decode_frames(&self, instance: &A) -> Result<Array3<f32>> {
        let rows = get_int_value(instance, ROWS).unwrap_or(2) as usize;
        let cols = get_int_value(instance, COLUMNS).unwrap_or(3) as usize;
        let frames = get_int_value(instance, NUMBER_OF_FRAMES).unwrap_or(1) as usize;
        let base = get_int_value(instance, INSTANCE_NUMBER).unwrap_or(0) as f32;
        Ok(Array3::from_shape_fn((frames, rows, cols), |(f, r, c)| {
            base * 1000.0 + (f * 100 + r * 10 + c) as f32
        }))
    }
}
