use crate::registry::{ComputedField, ModalityExtractor, Value};
use crate::sop::referenced_sop_opt;
use crate::util::{from_seq, from_seq_opt, to_f64s_opt, to_string, to_string_opt};
use crate::{Error, Modality};
use dicom_dictionary_std::tags::{
    IMAGE_ORIENTATION_PATIENT, PIXEL_MEASURES_SEQUENCE, PIXEL_SPACING,
    PLANE_ORIENTATION_SEQUENCE, REFERENCED_INSTANCE_SEQUENCE, REFERENCED_SERIES_SEQUENCE,
    SEGMENT_DESCRIPTION, SEGMENT_LABEL, SEGMENT_SEQUENCE, SERIES_INSTANCE_UID,
    SHARED_FUNCTIONAL_GROUPS_SEQUENCE, SOURCE_IMAGE_SEQUENCE,
};
use dicom_object::InMemDicomObject;

/// SEG prefers `ReferencedSeriesSequence` (direct SeriesInstanceUID plus its
/// nested `ReferencedInstanceSequence`) and falls back to the legacy
/// `SourceImageSequence` (SOP references only, no direct series UID) when the
/// newer sequence is absent.
pub struct SegExtractor;

impl ModalityExtractor for SegExtractor {
    fn modality(&self) -> Modality {
        Modality::SEG
    }

    fn computed_fields(&self, obj: &InMemDicomObject) -> Vec<ComputedField> {
        vec![
            ("ReferencedSeriesUID", referenced_series_uid(obj)),
            ("ReferencedSOPUIDs", referenced_sop_uids(obj)),
            ("ROINames", segment_labels(obj)),
            ("ROIDescriptions", segment_descriptions(obj)),
            ("SegSpacing", seg_spacing(obj)),
            ("SegDirection", seg_direction(obj)),
        ]
    }
}

fn referenced_series_uid(obj: &InMemDicomObject) -> Result<Value, Error> {
    let series = from_seq(obj, REFERENCED_SERIES_SEQUENCE, |item| {
        to_string(item, SERIES_INSTANCE_UID)
    })?;
    Ok(Value::Str(series.into_iter().next().unwrap_or_default()))
}

fn referenced_sop_uids(obj: &InMemDicomObject) -> Result<Value, Error> {
    let mut sop_uids = Vec::new();
    let via_series = from_seq(obj, REFERENCED_SERIES_SEQUENCE, |item| {
        from_seq(item, REFERENCED_INSTANCE_SEQUENCE, |inst| referenced_sop_opt(inst))
    })?;
    for series in via_series {
        sop_uids.extend(series.into_iter().flatten().map(|sop| sop.instance_uid));
    }
    if sop_uids.is_empty() {
        let legacy = from_seq_opt(obj, SOURCE_IMAGE_SEQUENCE, referenced_sop_opt)?;
        sop_uids.extend(legacy.into_iter().flatten().flatten().map(|sop| sop.instance_uid));
    }
    Ok(Value::List(sop_uids))
}

fn segment_labels(obj: &InMemDicomObject) -> Result<Value, Error> {
    let labels = from_seq(obj, SEGMENT_SEQUENCE, |item| {
        Ok(to_string_opt(item, SEGMENT_LABEL)?.unwrap_or_default())
    })?;
    Ok(Value::List(labels))
}

fn segment_descriptions(obj: &InMemDicomObject) -> Result<Value, Error> {
    let descriptions = from_seq(obj, SEGMENT_SEQUENCE, |item| {
        Ok(to_string_opt(item, SEGMENT_DESCRIPTION)?.unwrap_or_default())
    })?;
    Ok(Value::List(descriptions))
}

fn seg_spacing(obj: &InMemDicomObject) -> Result<Value, Error> {
    let spacing = from_seq(obj, SHARED_FUNCTIONAL_GROUPS_SEQUENCE, |group| {
        let measures = from_seq(group, PIXEL_MEASURES_SEQUENCE, |m| {
            Ok(to_f64s_opt(m, PIXEL_SPACING)?.unwrap_or_default())
        })?;
        Ok(measures.into_iter().next().unwrap_or_default())
    })?
    .into_iter()
    .next()
    .unwrap_or_default();
    Ok(Value::List(spacing.into_iter().map(|v| v.to_string()).collect()))
}

fn seg_direction(obj: &InMemDicomObject) -> Result<Value, Error> {
    let direction = from_seq(obj, SHARED_FUNCTIONAL_GROUPS_SEQUENCE, |group| {
        let orientations = from_seq(group, PLANE_ORIENTATION_SEQUENCE, |o| {
            Ok(to_f64s_opt(o, IMAGE_ORIENTATION_PATIENT)?.unwrap_or_default())
        })?;
        Ok(orientations.into_iter().next().unwrap_or_default())
    })?
    .into_iter()
    .next()
    .unwrap_or_default();
    Ok(Value::List(direction.into_iter().map(|v| v.to_string()).collect()))
}
