use dicom_core::Tag;

use super::accessor::MetadataAccessor;

// File Meta Tags
pub const TRANSFER_SYNTAX_UID: Tag = Tag(0x0002, 0x0010);

// Identification Tags
pub const IMAGE_TYPE: Tag = Tag(0x0008, 0x0008);
pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
pub const MODALITY: Tag = Tag(0x0008, 0x0060);
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);
pub const PROTOCOL_NAME: Tag = Tag(0x0018, 0x1030);
pub const SEQUENCE_NAME: Tag = Tag(0x0018, 0x0024);
pub const SERIES_INSTANCE_UID: Tag = Tag(0x0020, 0x000E);
pub const SERIES_NUMBER: Tag = Tag(0x0020, 0x0011);
pub const INSTANCE_NUMBER: Tag = Tag(0x0020, 0x0013);

// Image Geometry Tags
pub const IMAGE_POSITION_PATIENT: Tag = Tag(0x0020, 0x0032);
pub const IMAGE_ORIENTATION_PATIENT: Tag = Tag(0x0020, 0x0037);
pub const SLICE_THICKNESS: Tag = Tag(0x0018, 0x0050);
pub const PIXEL_SPACING: Tag = Tag(0x0028, 0x0030);
pub const ROWS: Tag = Tag(0x0028, 0x0010);
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);

// Pixel Value Tags
pub const RESCALE_INTERCEPT: Tag = Tag(0x0028, 0x1052);
pub const RESCALE_SLOPE: Tag = Tag(0x0028, 0x1053);

// Timing Tags
pub const REPETITION_TIME: Tag = Tag(0x0018, 0x0080);
pub const ECHO_TIME: Tag = Tag(0x0018, 0x0081);
pub const EFFECTIVE_ECHO_TIME: Tag = Tag(0x0018, 0x9082);

// Enhanced (multiframe) Functional Group Tags
pub const SHARED_FUNCTIONAL_GROUPS_SEQUENCE: Tag = Tag(0x5200, 0x9229);
pub const PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE: Tag = Tag(0x5200, 0x9230);
pub const FRAME_CONTENT_SEQUENCE: Tag = Tag(0x0020, 0x9111);
pub const TEMPORAL_POSITION_INDEX: Tag = Tag(0x0020, 0x9128);
pub const IN_STACK_POSITION_NUMBER: Tag = Tag(0x0020, 0x9057);
pub const PLANE_POSITION_SEQUENCE: Tag = Tag(0x0020, 0x9113);
pub const PLANE_ORIENTATION_SEQUENCE: Tag = Tag(0x0020, 0x9116);
pub const PIXEL_MEASURES_SEQUENCE: Tag = Tag(0x0028, 0x9110);
pub const PIXEL_VALUE_TRANSFORMATION_SEQUENCE: Tag = Tag(0x0028, 0x9145);
pub const MR_TIMING_AND_RELATED_PARAMETERS_SEQUENCE: Tag = Tag(0x0018, 0x9112);
pub const MR_ECHO_SEQUENCE: Tag = Tag(0x0018, 0x9114);

// Standard Diffusion Tags
pub const MR_DIFFUSION_SEQUENCE: Tag = Tag(0x0018, 0x9117);
pub const DIFFUSION_DIRECTIONALITY: Tag = Tag(0x0018, 0x9075);
pub const DIFFUSION_GRADIENT_DIRECTION_SEQUENCE: Tag = Tag(0x0018, 0x9076);
pub const DIFFUSION_B_VALUE: Tag = Tag(0x0018, 0x9087);
pub const DIFFUSION_GRADIENT_ORIENTATION: Tag = Tag(0x0018, 0x9089);

// Philips Private Tags
pub const PHILIPS_B_VALUE: Tag = Tag(0x2001, 0x1003);
pub const PHILIPS_SLICE_NUMBER_MR: Tag = Tag(0x2001, 0x100A);
pub const PHILIPS_NUMBER_OF_STACK_SLICES: Tag = Tag(0x2001, 0x102D);
pub const PHILIPS_STACK_SEQUENCE: Tag = Tag(0x2001, 0x105F);
pub const PHILIPS_DIFFUSION_DIRECTION_RL: Tag = Tag(0x2005, 0x10B0);
pub const PHILIPS_DIFFUSION_DIRECTION_AP: Tag = Tag(0x2005, 0x10B1);
pub const PHILIPS_DIFFUSION_DIRECTION_FH: Tag = Tag(0x2005, 0x10B2);

/// Helper to get string value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to string
pub fn get_string_value<A: MetadataAccessor + ?Sized>(dcm: &A, tag: Tag) -> Option<String> {
    dcm.get_text(tag).ok()
}

/// Helper to get integer value from DICOM tag
///
/// Returns `None` if the tag is not present or is not an integer
pub fn get_int_value<A: MetadataAccessor + ?Sized>(dcm: &A, tag: Tag) -> Option<i64> {
    dcm.get_int(tag).ok()
}

/// Helper to get floating point value from DICOM tag
pub fn get_float_value<A: MetadataAccessor + ?Sized>(dcm: &A, tag: Tag) -> Option<f64> {
    dcm.get_float(tag).ok()
}

/// Helper to get the first item of a sequence
///
/// Used to walk functional groups, e.g.
/// SharedFunctionalGroupsSequence[0] → PixelMeasuresSequence[0]
pub fn first_item<A: MetadataAccessor + ?Sized>(dcm: &A, tag: Tag) -> Option<&A::Item> {
    dcm.get_sequence(tag).ok().and_then(|items| items.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_values() {
        assert_eq!(PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE, Tag(0x5200, 0x9230));
        assert_eq!(PHILIPS_SLICE_NUMBER_MR, Tag(0x2001, 0x100a));
        assert_eq!(DIFFUSION_B_VALUE, Tag(0x0018, 0x9087));
        assert_eq!(PHILIPS_DIFFUSION_DIRECTION_FH, Tag(0x2005, 0x10b2));
    }
}
