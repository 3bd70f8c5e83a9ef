use crate::registry::{ComputedField, ModalityExtractor, Value};
use crate::util::{from_seq, to_string};
use crate::{Error, Modality};
use dicom_dictionary_std::tags::{REFERENCED_SOP_INSTANCE_UID, REFERENCED_STRUCTURE_SET_SEQUENCE};
use dicom_object::InMemDicomObject;

/// RTPLAN references its structure set by SOP UID (`ReferencedStructureSetSequence[0]`).
pub struct RtPlanExtractor;

impl ModalityExtractor for RtPlanExtractor {
    fn modality(&self) -> Modality {
        Modality::RtPlan
    }

    fn computed_fields(&self, obj: &InMemDicomObject) -> Vec<ComputedField> {
        vec![("ReferencedSOPUIDs", referenced_sop_uids(obj))]
    }
}

fn referenced_sop_uids(obj: &InMemDicomObject) -> Result<Value, Error> {
    let uids = from_seq(obj, REFERENCED_STRUCTURE_SET_SEQUENCE, |item| {
        to_string(item, REFERENCED_SOP_INSTANCE_UID)
    })?;
    Ok(Value::List(uids))
}
