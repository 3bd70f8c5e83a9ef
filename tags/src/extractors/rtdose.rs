use crate::registry::{ComputedField, ModalityExtractor, Value};
use crate::sop::referenced_sop_opt;
use crate::util::{from_seq, to_string};
use crate::{Error, Modality};
use dicom_dictionary_std::tags::{
    REFERENCED_IMAGE_SEQUENCE, REFERENCED_RT_PLAN_SEQUENCE, REFERENCED_SOP_INSTANCE_UID,
    REFERENCED_STRUCTURE_SET_SEQUENCE,
};
use dicom_object::InMemDicomObject;

/// RTDOSE references a plan or structure set by SOP UID, and its source image
/// series through `ReferencedImageSequence`. Per the open question this crate
/// inherited from the original: some datasets store a SeriesInstanceUID in
/// the field nominally named SOPInstanceUID here. This extractor carries the
/// value through unchanged rather than silently correcting it; downstream
/// resolution in `dicom-graph-core::resolve` treats it as a SeriesUID-like
/// value, same as the source it was distilled from.
pub struct RtDoseExtractor;

impl ModalityExtractor for RtDoseExtractor {
    fn modality(&self) -> Modality {
        Modality::RtDose
    }

    fn computed_fields(&self, obj: &InMemDicomObject) -> Vec<ComputedField> {
        vec![
            ("ReferencedSeriesUID", referenced_series_uid(obj)),
            ("ReferencedSeriesSOPUIDs", referenced_plan_or_struct_sop(obj)),
        ]
    }
}

fn referenced_series_uid(obj: &InMemDicomObject) -> Result<Value, Error> {
    let images = from_seq(obj, REFERENCED_IMAGE_SEQUENCE, |item| {
        to_string(item, REFERENCED_SOP_INSTANCE_UID)
    })?;
    Ok(Value::Str(images.into_iter().next().unwrap_or_default()))
}

fn referenced_plan_or_struct_sop(obj: &InMemDicomObject) -> Result<Value, Error> {
    let mut sop_uids = Vec::new();
    for item in from_seq(obj, REFERENCED_RT_PLAN_SEQUENCE, |item| Ok(item.clone()))? {
        if let Some(sop) = referenced_sop_opt(&item)? {
            sop_uids.push(sop.instance_uid);
        }
    }
    for item in from_seq(obj, REFERENCED_STRUCTURE_SET_SEQUENCE, |item| Ok(item.clone()))? {
        if let Some(sop) = referenced_sop_opt(&item)? {
            sop_uids.push(sop.instance_uid);
        }
    }
    Ok(Value::List(sop_uids))
}
