use crate::registry::ModalityExtractor;
use crate::Modality;

/// CT, MR and PT carry no reference fields of their own (§4.2): they are
/// either roots of the forest or, for PT, resolved indirectly through shared
/// `FrameOfReferenceUID` in `dicom-graph-core::resolve`. One extractor value
/// per modality keeps the registry table closed-form without triple-coding
/// the same "base tags only" extractor.
#[allow(clippy::upper_case_acronyms)]
pub enum ImageSeriesExtractor {
    CT,
    MR,
    PT,
}

impl ModalityExtractor for ImageSeriesExtractor {
    fn modality(&self) -> Modality {
        match self {
            ImageSeriesExtractor::CT => Modality::CT,
            ImageSeriesExtractor::MR => Modality::MR,
            ImageSeriesExtractor::PT => Modality::PT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modality_mapping() {
        assert_eq!(ImageSeriesExtractor::CT.modality(), Modality::CT);
        assert_eq!(ImageSeriesExtractor::PT.modality(), Modality::PT);
    }
}
