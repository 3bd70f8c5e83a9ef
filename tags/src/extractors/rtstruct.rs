use crate::registry::{ComputedField, ModalityExtractor, Value};
use crate::util::{from_seq, to_string, to_string_opt};
use crate::{Error, Modality};
use dicom_dictionary_std::tags::{
    CONTOUR_IMAGE_SEQUENCE, REFERENCED_FRAME_OF_REFERENCE_SEQUENCE, REFERENCED_SOP_INSTANCE_UID,
    ROI_NAME, RT_REFERENCED_SERIES_SEQUENCE, RT_REFERENCED_STUDY_SEQUENCE, SERIES_INSTANCE_UID,
    STRUCTURE_SET_ROI_SEQUENCE,
};
use dicom_object::InMemDicomObject;

/// Walks `ReferencedFrameOfReferenceSequence -> RTReferencedStudySequence ->
/// RTReferencedSeriesSequence` and its `ContourImageSequence`, the same
/// reference chain RTSTRUCT readers elsewhere in this workspace read in full;
/// here it is pared down to just the UIDs the resolver needs.
pub struct RtStructExtractor;

impl ModalityExtractor for RtStructExtractor {
    fn modality(&self) -> Modality {
        Modality::RtStruct
    }

    fn computed_fields(&self, obj: &InMemDicomObject) -> Vec<ComputedField> {
        vec![
            ("ReferencedSeriesUID", referenced_series_uid(obj)),
            ("ReferencedSOPUIDs", referenced_sop_uids(obj)),
            ("ROINames", roi_names(obj)),
            ("NumROIs", num_rois(obj)),
        ]
    }
}

fn referenced_series(obj: &InMemDicomObject) -> Result<Vec<String>, Error> {
    let mut series_uids = Vec::new();
    let for_seq = from_seq(obj, REFERENCED_FRAME_OF_REFERENCE_SEQUENCE, |item| {
        from_seq(item, RT_REFERENCED_STUDY_SEQUENCE, |study| {
            from_seq(study, RT_REFERENCED_SERIES_SEQUENCE, |series| {
                to_string(series, SERIES_INSTANCE_UID)
            })
        })
    })?;
    for studies in for_seq {
        for series in studies {
            series_uids.extend(series);
        }
    }
    Ok(series_uids)
}

fn referenced_series_uid(obj: &InMemDicomObject) -> Result<Value, Error> {
    let series_uids = referenced_series(obj)?;
    Ok(Value::Str(series_uids.into_iter().next().unwrap_or_default()))
}

fn referenced_sop_uids(obj: &InMemDicomObject) -> Result<Value, Error> {
    let mut sop_uids = Vec::new();
    let for_seq = from_seq(obj, REFERENCED_FRAME_OF_REFERENCE_SEQUENCE, |item| {
        from_seq(item, RT_REFERENCED_STUDY_SEQUENCE, |study| {
            from_seq(study, RT_REFERENCED_SERIES_SEQUENCE, |series| {
                from_seq(series, CONTOUR_IMAGE_SEQUENCE, |contour_image| {
                    to_string(contour_image, REFERENCED_SOP_INSTANCE_UID)
                })
            })
        })
    })?;
    for studies in for_seq {
        for series in studies {
            for contours in series {
                sop_uids.extend(contours);
            }
        }
    }
    Ok(Value::List(sop_uids))
}

fn roi_names(obj: &InMemDicomObject) -> Result<Value, Error> {
    let names = from_seq(obj, STRUCTURE_SET_ROI_SEQUENCE, |roi| {
        Ok(to_string_opt(roi, ROI_NAME)?.unwrap_or_default())
    })?;
    Ok(Value::List(names))
}

fn num_rois(obj: &InMemDicomObject) -> Result<Value, Error> {
    let rois = from_seq(obj, STRUCTURE_SET_ROI_SEQUENCE, |_| Ok(()))?;
    Ok(Value::Num(rois.len() as f64))
}
