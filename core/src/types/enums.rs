use std::fmt;

/// How the frames of a series are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum SeriesLayout {
    /// Many frames bundled in one instance
    Multiframe,
    /// One frame per instance
    Singleframe,
}

/// Whether a series carries a non-spatial fourth axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum Dimensionality {
    FourD,
    Anatomical,
}

/// Structural category of a series: layout × dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum SequenceType {
    MultiframeFourD,
    MultiframeAnatomical,
    SingleframeFourD,
    SingleframeAnatomical,
}

impl SequenceType {
    /// Combines layout and dimensionality
    pub fn new(layout: SeriesLayout, dimensionality: Dimensionality) -> Self {
        match (layout, dimensionality) {
            (SeriesLayout::Multiframe, Dimensionality::FourD) => SequenceType::MultiframeFourD,
            (SeriesLayout::Multiframe, Dimensionality::Anatomical) => {
                SequenceType::MultiframeAnatomical
            }
            (SeriesLayout::Singleframe, Dimensionality::FourD) => SequenceType::SingleframeFourD,
            (SeriesLayout::Singleframe, Dimensionality::Anatomical) => {
                SequenceType::SingleframeAnatomical
            }
        }
    }

    pub fn layout(&self) -> SeriesLayout {
        match self {
            SequenceType::MultiframeFourD | SequenceType::MultiframeAnatomical => {
                SeriesLayout::Multiframe
            }
            SequenceType::SingleframeFourD | SequenceType::SingleframeAnatomical => {
                SeriesLayout::Singleframe
            }
        }
    }

    pub fn dimensionality(&self) -> Dimensionality {
        match self {
            SequenceType::MultiframeFourD | SequenceType::SingleframeFourD => {
                Dimensionality::FourD
            }
            SequenceType::MultiframeAnatomical | SequenceType::SingleframeAnatomical => {
                Dimensionality::Anatomical
            }
        }
    }

    pub fn is_multiframe(&self) -> bool {
        self.layout() == SeriesLayout::Multiframe
    }

    pub fn is_4d(&self) -> bool {
        self.dimensionality() == Dimensionality::FourD
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            SequenceType::MultiframeFourD => "multiframe-4d",
            SequenceType::MultiframeAnatomical => "multiframe-anatomical",
            SequenceType::SingleframeFourD => "singleframe-4d",
            SequenceType::SingleframeAnatomical => "singleframe-anatomical",
        }
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Which tag set carries the diffusion weighting of a singleframe series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum DiffusionConvention {
    /// Philips private tags (2001,1003) and (2005,10B0..10B2)
    PrivateTags,
    /// Standard tags (0018,9087) and (0018,9089)
    StandardTags,
}

impl DiffusionConvention {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            DiffusionConvention::PrivateTags => "private",
            DiffusionConvention::StandardTags => "standard",
        }
    }
}

impl fmt::Display for DiffusionConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SeriesLayout::Multiframe, Dimensionality::FourD, SequenceType::MultiframeFourD)]
    #[case(
        SeriesLayout::Multiframe,
        Dimensionality::Anatomical,
        SequenceType::MultiframeAnatomical
    )]
    #[case(SeriesLayout::Singleframe, Dimensionality::FourD, SequenceType::SingleframeFourD)]
    #[case(
        SeriesLayout::Singleframe,
        Dimensionality::Anatomical,
        SequenceType::SingleframeAnatomical
    )]
    fn test_sequence_type_parts(
        #[case] layout: SeriesLayout,
        #[case] dimensionality: Dimensionality,
        #[case] expected: SequenceType,
    ) {
        let kind = SequenceType::new(layout, dimensionality);
        assert_eq!(kind, expected);
        assert_eq!(kind.layout(), layout);
        assert_eq!(kind.dimensionality(), dimensionality);
    }

    #[test]
    fn test_display() {
        assert_eq!(SequenceType::SingleframeFourD.to_string(), "singleframe-4d");
        assert!(SequenceType::MultiframeFourD.is_multiframe());
        assert!(!SequenceType::MultiframeAnatomical.is_4d());
        assert_eq!(DiffusionConvention::PrivateTags.to_string(), "private");
    }
}
