//! Index Serializer (C5): persists the four artifacts under
//! `<output>/<dataset_name>/`. JSON is pretty-printed with 4-space indent
//! (§4.5); CSV rows are deduplicated by every column except `SubSeries`,
//! grounded on the original's `remove_duplicate_entries`.

use crate::error::Result;
use crate::model::SeriesMetaMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// The four on-disk artifact paths for one dataset, rooted at `<output>/<dataset_name>/`.
pub struct ArtifactPaths {
    pub crawl_db: PathBuf,
    pub crawl_cache: PathBuf,
    pub sop_map: PathBuf,
    pub index_csv: PathBuf,
}

impl ArtifactPaths {
    pub fn new(output_dir: &Path, dataset_name: &str) -> Self {
        let dir = output_dir.join(dataset_name);
        Self {
            crawl_db: dir.join("crawl_db.json"),
            crawl_cache: dir.join("crawl-cache.json"),
            sop_map: dir.join("sop_map.json"),
            index_csv: dir.join("index.csv"),
        }
    }

    pub fn dir(&self) -> &Path {
        self.crawl_db.parent().expect("artifact paths always have a parent directory")
    }
}

/// Writes `value` to `path` as pretty-printed JSON, 4-space indented per
/// spec.md §4.5.
///
/// # Arguments
///
/// * `path` - Destination file path; created or truncated.
/// * `value` - The value to serialize.
///
/// # Returns
///
/// * `Ok(())` - The file was written successfully.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written, or if
/// serialization fails.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let writer = BufWriter::new(fs::File::create(path)?);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut ser)?;
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(fs::File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// One flattened row of `index.csv`, matching spec.md §4.5's fixed header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlimRow {
    #[serde(rename = "PatientID")]
    pub patient_id: String,
    #[serde(rename = "StudyInstanceUID")]
    pub study_instance_uid: String,
    #[serde(rename = "SeriesInstanceUID")]
    pub series_instance_uid: String,
    #[serde(rename = "SubSeries")]
    pub sub_series: String,
    #[serde(rename = "Modality")]
    pub modality: String,
    #[serde(rename = "ReferencedModality")]
    pub referenced_modality: String,
    #[serde(rename = "ReferencedSeriesUID")]
    pub referenced_series_uid: String,
    pub instances: usize,
    pub folder: String,
}

/// One row per `(SeriesUID, SubSeriesID)`, in map traversal order (not
/// guaranteed lexicographic), matching spec.md §6's "row order: input
/// traversal order" note.
pub fn slim_rows(series: &SeriesMetaMap) -> Vec<SlimRow> {
    let mut rows = Vec::new();
    for (series_uid, sub_series) in series {
        for (sub_series_id, record) in sub_series {
            rows.push(SlimRow {
                patient_id: record.patient_id.clone(),
                study_instance_uid: record.study_instance_uid.clone(),
                series_instance_uid: series_uid.clone(),
                sub_series: sub_series_id.clone(),
                modality: record.modality.to_string(),
                referenced_modality: record.referenced_modality.clone(),
                referenced_series_uid: record.referenced_series_uid.display_string(),
                instances: record.instances.len(),
                folder: record.folder.clone(),
            });
        }
    }
    rows
}

/// Deduplicates slim rows by every column except `SubSeries`, keeping the
/// first occurrence (the original's `remove_duplicate_entries`).
pub fn dedup_slim_rows(rows: Vec<SlimRow>) -> Vec<SlimRow> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let key = (
            row.patient_id.clone(),
            row.study_instance_uid.clone(),
            row.series_instance_uid.clone(),
            row.modality.clone(),
            row.referenced_series_uid.clone(),
            row.folder.clone(),
        );
        if seen.insert(key) {
            out.push(row);
        }
    }
    out
}

/// Writes `rows` to `path` as `index.csv`, one row per `(SeriesUID,
/// SubSeriesID)`, using the header derived from [`SlimRow`]'s field names.
///
/// # Arguments
///
/// * `path` - Destination file path; created or truncated.
/// * `rows` - The rows to write, in the order given.
///
/// # Returns
///
/// * `Ok(())` - The file was written successfully.
///
/// # Errors
///
/// Returns an error if the file cannot be created, if a row fails to
/// serialize, or if the writer cannot be flushed.
pub fn write_csv(path: &Path, rows: &[SlimRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(series_uid: &str, sub_series: &str) -> SlimRow {
        SlimRow {
            patient_id: "P1".into(),
            study_instance_uid: "S1".into(),
            series_instance_uid: series_uid.into(),
            sub_series: sub_series.into(),
            modality: "CT".into(),
            referenced_modality: String::new(),
            referenced_series_uid: String::new(),
            instances: 1,
            folder: "folder".into(),
        }
    }

    #[test]
    fn test_dedup_ignores_sub_series_column() {
        let rows = vec![row("1.2.3", "1"), row("1.2.3", "2")];
        let deduped = dedup_slim_rows(rows);
        assert_eq!(deduped.len(), 1);
    }

    #[test]
    fn test_dedup_keeps_distinct_series() {
        let rows = vec![row("1.2.3", "1"), row("1.2.4", "1")];
        let deduped = dedup_slim_rows(rows);
        assert_eq!(deduped.len(), 2);
    }
}
