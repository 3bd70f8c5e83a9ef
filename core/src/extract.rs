//! Metadata Extractor (C2): parses one file tolerantly and dispatches into the
//! registered `dicom-graph-tags` extractor for its `Modality` element. Grounded
//! on `dcm_sort::read_dicom_file_without_pixels`, reusing
//! `dicom-graph-common::dicom::open_file_until` to stop before `PixelData`.

use crate::error::Result;
use dicom_dictionary_std::tags::{PIXEL_DATA, SOP_INSTANCE_UID};
use dicom_graph_tags::{ExtractedFields, Modality, ModalityRegistry, Value};
use std::path::Path;

/// One file's extracted fields plus the keys the crawler needs to place it in
/// the two-level series map, ahead of `SeriesRecord::from_extracted` splitting
/// the reference fields out of `fields`.
pub struct ExtractedFile {
    pub series_uid: String,
    pub sop_uid: String,
    pub sub_series_id: String,
    pub fields: ExtractedFields,
}

pub fn extract_one(path: &Path, registry: &ModalityRegistry) -> Result<ExtractedFile> {
    let obj = dicom_graph_common::dicom::open_file_until(path, PIXEL_DATA)?;

    let modality_str = dicom_graph_tags::to_string_opt(&obj, dicom_dictionary_std::tags::MODALITY)?
        .unwrap_or_default();
    let modality: Modality = modality_str.parse().expect("Modality::from_str is infallible");

    let sop_uid = dicom_graph_tags::to_string_opt(&obj, SOP_INSTANCE_UID)?.unwrap_or_default();

    let extractor = registry.get(modality);
    let fields = extractor.extract(&obj);

    let series_uid = match fields.get("SeriesInstanceUID") {
        Some(Value::Str(s)) => s.clone(),
        _ => String::new(),
    };
    let acquisition_number = match fields.get("AcquisitionNumber") {
        Some(Value::Str(s)) => s.as_str(),
        _ => "",
    };
    let sub_series_id = normalize_sub_series_id(acquisition_number);

    Ok(ExtractedFile {
        series_uid,
        sop_uid,
        sub_series_id,
        fields,
    })
}

/// `SubSeriesID` defaults to `"1"` when absent or textually `"None"` (spec.md §3).
fn normalize_sub_series_id(acquisition_number: &str) -> String {
    match acquisition_number.trim() {
        "" | "None" => "1".to_string(),
        other => other.to_string(),
    }
}
