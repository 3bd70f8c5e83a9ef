use crate::registry::{ComputedField, ModalityExtractor, Value};
use crate::sop::referenced_sop;
use crate::util::{from_seq, to_string};
use crate::{Error, Modality};
use dicom_dictionary_std::tags::{
    CURRENT_REQUESTED_PROCEDURE_EVIDENCE_SEQUENCE, REFERENCED_SERIES_SEQUENCE,
    REFERENCED_SOP_SEQUENCE, SERIES_INSTANCE_UID,
};
use dicom_object::InMemDicomObject;

/// Structured Reports reference many series many-to-many through
/// `CurrentRequestedProcedureEvidenceSequence -> ReferencedSeriesSequence`.
/// Both reference fields stay list-valued end to end; `dicom-graph-core::resolve`
/// joins the resolved modalities with `|` for the `ReferencedModality` column.
pub struct SrExtractor;

impl ModalityExtractor for SrExtractor {
    fn modality(&self) -> Modality {
        Modality::SR
    }

    fn computed_fields(&self, obj: &InMemDicomObject) -> Vec<ComputedField> {
        vec![
            ("ReferencedSeriesUID", referenced_series_uids(obj)),
            ("ReferencedSOPUIDs", referenced_sop_uids(obj)),
        ]
    }
}

fn evidence_series(obj: &InMemDicomObject) -> Result<Vec<InMemDicomObject>, Error> {
    let per_evidence = from_seq(obj, CURRENT_REQUESTED_PROCEDURE_EVIDENCE_SEQUENCE, |item| {
        from_seq(item, REFERENCED_SERIES_SEQUENCE, |series| Ok(series.clone()))
    })?;
    Ok(per_evidence.into_iter().flatten().collect())
}

fn referenced_series_uids(obj: &InMemDicomObject) -> Result<Value, Error> {
    let series_uids = evidence_series(obj)?
        .iter()
        .map(|series| to_string(series, SERIES_INSTANCE_UID))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::List(series_uids))
}

fn referenced_sop_uids(obj: &InMemDicomObject) -> Result<Value, Error> {
    let mut sop_uids = Vec::new();
    for series in evidence_series(obj)? {
        let sops = from_seq(&series, REFERENCED_SOP_SEQUENCE, referenced_sop)?;
        sop_uids.extend(sops.into_iter().map(|sop| sop.instance_uid));
    }
    Ok(Value::List(sop_uids))
}
