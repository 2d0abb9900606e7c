use super::geometry::{create_affine, frame_layout, multiframe_affine};
use super::pixels::{FrameDecoder, Rescale};
use crate::error::{ConversionError, Result};
use crate::grouping::Grouping;
use crate::metadata::tags::*;
use crate::metadata::MetadataAccessor;
use crate::types::{SequenceType, VolumeResult};
use log::{debug, info};
use ndarray::{s, stack, Array3, Array4, ArrayD, Axis};

/// Builds sample blocks and affines from grouped instances
pub struct VolumeAssembler<'d, D> {
    decoder: &'d D,
}

impl<'d, D> VolumeAssembler<'d, D> {
    pub fn new(decoder: &'d D) -> Self {
        Self { decoder }
    }

    /// Assembles a singleframe series from its timepoint buckets
    ///
    /// Each bucket becomes one 3D block; blocks are concatenated along a
    /// fourth axis in bucket order. The rescale of the first instance is
    /// applied to every sample and the affine comes from bucket 0.
    pub fn assemble_singleframe<A>(
        &self,
        grouping: &Grouping<'_, A>,
        sequence_type: SequenceType,
    ) -> Result<VolumeResult>
    where
        A: MetadataAccessor,
        D: FrameDecoder<A>,
    {
        let first_bucket = grouping.first().ok_or(ConversionError::EmptySeries)?;
        let first = *first_bucket.first().ok_or(ConversionError::EmptySeries)?;

        let blocks = grouping
            .iter()
            .map(|bucket| self.bucket_to_block(bucket))
            .collect::<Result<Vec<_>>>()?;

        let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
        let mut data: ArrayD<f32> = stack(Axis(3), &views)
            .map_err(|e| {
                let sizes: Vec<usize> = grouping.iter().map(|b| b.len()).collect();
                ConversionError::MissingInstances(format!(
                    "timepoints hold {:?} slices: {}",
                    sizes, e
                ))
            })?
            .into_dyn();

        Rescale::from_accessor(first).apply(&mut data);

        let (affine, max_slice_increment) = create_affine(first_bucket)?;
        debug!(
            "Assembled {:?} from {} timepoints",
            data.shape(),
            grouping.len()
        );

        Ok(VolumeResult {
            data: squeeze_trailing(data),
            affine,
            max_slice_increment,
            sequence_type,
            repetition_time: get_float_value(first, REPETITION_TIME),
            echo_time: get_float_value(first, ECHO_TIME),
            diffusion: None,
        })
    }

    /// Decodes frame 0 of every instance into a `(cols, rows, slices)` block
    fn bucket_to_block<A>(&self, bucket: &[&A]) -> Result<Array3<f32>>
    where
        A: MetadataAccessor,
        D: FrameDecoder<A>,
    {
        let mut block: Option<Array3<f32>> = None;
        for (z, instance) in bucket.iter().enumerate() {
            let frames = self.decoder.decode_frames(*instance)?;
            if frames.shape()[0] == 0 {
                return Err(ConversionError::PixelData(format!(
                    "instance {} holds no frames",
                    z
                )));
            }
            let frame = frames.index_axis(Axis(0), 0);
            let (rows, cols) = frame.dim();

            let block = block.get_or_insert_with(|| Array3::zeros((cols, rows, bucket.len())));
            if block.dim().0 != cols || block.dim().1 != rows {
                return Err(ConversionError::InconsistentDimensions(format!(
                    "slice {} is {}x{}, expected {}x{}",
                    z,
                    rows,
                    cols,
                    block.dim().1,
                    block.dim().0
                )));
            }
            block.slice_mut(s![.., .., z]).assign(&frame.t());
        }
        block.ok_or(ConversionError::EmptySeries)
    }

    /// Assembles a multiframe bundle
    ///
    /// Frames land at `(slice, stack)` per [`frame_layout`], each rescaled
    /// with its own PixelValueTransformationSequence (falling back to the
    /// shared group, then to the instance level rescale).
    pub fn assemble_multiframe<A>(
        &self,
        bundle: &A,
        sequence_type: SequenceType,
    ) -> Result<VolumeResult>
    where
        A: MetadataAccessor,
        D: FrameDecoder<A>,
    {
        let layout = frame_layout(bundle)?;
        let per_frame = bundle.get_sequence(PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE)?;

        let decoded = self.decoder.decode_frames(bundle)?;
        let (frame_count, rows, cols) = decoded.dim();
        if frame_count != layout.cells.len() {
            return Err(ConversionError::InconsistentDimensions(format!(
                "{} decoded frames, {} functional groups",
                frame_count,
                layout.cells.len()
            )));
        }

        let shared_rescale = first_item(bundle, SHARED_FUNCTIONAL_GROUPS_SEQUENCE)
            .and_then(Rescale::from_frame)
            .unwrap_or_else(|| Rescale::from_accessor(bundle));

        let mut data = Array4::<f32>::zeros((cols, rows, layout.slices, layout.stacks));
        for (f, (z, t)) in layout.cells.iter().enumerate() {
            let rescale = per_frame
                .get(f)
                .and_then(Rescale::from_frame)
                .unwrap_or(shared_rescale);
            rescale.write_transposed(
                decoded.index_axis(Axis(0), f),
                data.slice_mut(s![.., .., *z, *t]),
            );
        }

        let (affine, max_slice_increment) = multiframe_affine(bundle, &layout)?;
        let (repetition_time, echo_time) = multiframe_timing(bundle);
        info!(
            "Multiframe bundle: {} slices x {} stacks",
            layout.slices, layout.stacks
        );

        Ok(VolumeResult {
            data: squeeze_trailing(data.into_dyn()),
            affine,
            max_slice_increment,
            sequence_type,
            repetition_time,
            echo_time,
            diffusion: None,
        })
    }
}

/// TR from the shared MR timing group, TE from the first frame's echo group
///
/// Either may be missing; that is not an error.
pub fn multiframe_timing<A: MetadataAccessor + ?Sized>(bundle: &A) -> (Option<f64>, Option<f64>) {
    let repetition_time = first_item(bundle, SHARED_FUNCTIONAL_GROUPS_SEQUENCE)
        .and_then(|shared| first_item(shared, MR_TIMING_AND_RELATED_PARAMETERS_SEQUENCE))
        .and_then(|timing| get_float_value(timing, REPETITION_TIME));

    let echo_time = first_item(bundle, PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE)
        .and_then(|frame| first_item(frame, MR_ECHO_SEQUENCE))
        .and_then(|echo| get_float_value(echo, EFFECTIVE_ECHO_TIME));

    if repetition_time.is_none() || echo_time.is_none() {
        debug!("Multiframe timing incomplete: TR {:?}, TE {:?}", repetition_time, echo_time);
    }
    (repetition_time, echo_time)
}

/// Drops trailing length-1 axes while the array has more than 3
///
/// A single-slice 3D volume is never reduced to 2D.
pub fn squeeze_trailing(mut data: ArrayD<f32>) -> ArrayD<f32> {
    while data.ndim() > 3 && data.shape()[data.ndim() - 1] == 1 {
        let last = data.ndim() - 1;
        data = data.index_axis_move(Axis(last), 0);
    }
    data
}
