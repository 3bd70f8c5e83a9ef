mod ct;
mod rtdose;
mod rtplan;
mod rtstruct;
mod seg;
mod sr;

use crate::registry::ModalityExtractor;

/// The extractor set registered by [`crate::ModalityRegistry::with_defaults`].
/// CT/MR/PT share one extractor since none of them contribute reference
/// fields (§4.2's table); RTSTRUCT/RTDOSE/RTPLAN/SEG/SR each carry their own
/// reference-resolution logic.
pub fn defaults() -> Vec<Box<dyn ModalityExtractor>> {
    vec![
        Box::new(ct::ImageSeriesExtractor::CT),
        Box::new(ct::ImageSeriesExtractor::MR),
        Box::new(ct::ImageSeriesExtractor::PT),
        Box::new(rtstruct::RtStructExtractor),
        Box::new(rtdose::RtDoseExtractor),
        Box::new(rtplan::RtPlanExtractor),
        Box::new(seg::SegExtractor),
        Box::new(sr::SrExtractor),
    ]
}
