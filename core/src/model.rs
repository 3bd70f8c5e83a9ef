//! Record types shared by `crawl`, `resolve`, `serialize` and `interlace`,
//! grounded on `dcm_ls::model`'s shape: a plain identification struct plus a
//! `HasModality`-style typed `Modality` field, here reusing
//! `dicom-graph-tags::Modality` instead of redefining it.

use dicom_graph_tags::{ExtractedFields, Modality, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type SeriesMetaMap = BTreeMap<String, BTreeMap<String, SeriesRecord>>;
pub type SopSeriesMap = BTreeMap<String, String>;

/// One row of the per-`(SeriesUID, SubSeriesID)` index. `extra` carries every
/// field `dicom-graph-tags` produced beyond the identification and reference
/// fields named explicitly here: geometry, ROI labels, SEG spacing, and so on.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeriesRecord {
    #[serde(rename = "PatientID")]
    pub patient_id: String,
    #[serde(rename = "StudyInstanceUID")]
    pub study_instance_uid: String,
    #[serde(rename = "SeriesInstanceUID")]
    pub series_instance_uid: String,
    #[serde(rename = "Modality")]
    pub modality: Modality,
    #[serde(rename = "AcquisitionNumber")]
    pub acquisition_number: String,
    #[serde(rename = "FrameOfReferenceUID", skip_serializing_if = "Option::is_none")]
    pub frame_of_reference_uid: Option<String>,
    pub folder: String,
    pub instances: BTreeMap<String, String>,
    #[serde(rename = "ReferencedSOPUIDs")]
    pub referenced_sop_uids: Vec<String>,
    #[serde(rename = "ReferencedSeriesUID", default)]
    pub referenced_series_uid: Value,
    #[serde(rename = "ReferencedModality", default)]
    pub referenced_modality: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SeriesRecord {
    /// Builds a record from one file's extracted fields (§4.3 step 2: "copy all
    /// extracted fields except SOPInstanceUID"). `instances` starts empty; the
    /// caller inserts the triggering file's own `{SopUID: filename}` entry.
    pub fn from_extracted(mut fields: ExtractedFields, folder: String) -> Self {
        let patient_id = pop_str(&mut fields, "PatientID");
        let study_instance_uid = pop_str(&mut fields, "StudyInstanceUID");
        let series_instance_uid = pop_str(&mut fields, "SeriesInstanceUID");
        let modality: Modality = pop_str(&mut fields, "Modality")
            .parse()
            .expect("Modality::from_str is infallible");
        let acquisition_number = pop_str(&mut fields, "AcquisitionNumber");
        let frame_of_reference_uid = match pop_str(&mut fields, "FrameOfReferenceUID") {
            s if s.is_empty() => None,
            s => Some(s),
        };
        // RTDOSE's extractor names this field `ReferencedSeriesSOPUIDs` (spec §4.2's
        // table), everyone else's `ReferencedSOPUIDs`; both feed the same resolver input.
        let referenced_sop_uids = match fields
            .remove("ReferencedSOPUIDs")
            .or_else(|| fields.remove("ReferencedSeriesSOPUIDs"))
        {
            Some(Value::List(list)) => list,
            Some(Value::Str(s)) if !s.is_empty() => vec![s],
            _ => Vec::new(),
        };
        let referenced_series_uid = fields.remove("ReferencedSeriesUID").unwrap_or_default();

        SeriesRecord {
            patient_id,
            study_instance_uid,
            series_instance_uid,
            modality,
            acquisition_number,
            frame_of_reference_uid,
            folder,
            instances: BTreeMap::new(),
            referenced_sop_uids,
            referenced_series_uid,
            referenced_modality: String::new(),
            extra: fields,
        }
    }
}

fn pop_str(fields: &mut ExtractedFields, key: &str) -> String {
    match fields.remove(key) {
        Some(Value::Str(s)) => s,
        _ => String::new(),
    }
}
