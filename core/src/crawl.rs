//! Parallel Crawler (C3): fans `extract::extract_one` out across the file list
//! with `rayon`, then folds per-worker partial maps into one. Grounded on
//! SPEC_FULL §4's decision to use `par_iter` + a sequential reduce instead of a
//! shared mutex, giving the "deterministic regardless of ordering" merge the
//! concurrency contract requires.

use crate::model::{SeriesMetaMap, SeriesRecord, SopSeriesMap};
use dicom_graph_tags::ModalityRegistry;
use rayon::prelude::*;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Drives extraction across `files`, returning the enriched series map and the
/// SOP→Series inverse map. Per-file `InvalidDicomError` is logged at debug
/// level and the file is skipped; it is never propagated.
pub fn crawl(files: &[PathBuf], top: &Path, registry: &ModalityRegistry) -> (SeriesMetaMap, SopSeriesMap) {
    files
        .par_iter()
        .map(|path| crawl_one(path, top, registry))
        .reduce(
            || (SeriesMetaMap::new(), SopSeriesMap::new()),
            |mut acc, partial| {
                merge(&mut acc.0, partial.0);
                acc.1.extend(partial.1);
                acc
            },
        )
}

fn crawl_one(path: &Path, top: &Path, registry: &ModalityRegistry) -> (SeriesMetaMap, SopSeriesMap) {
    let mut series_map = SeriesMetaMap::new();
    let mut sop_map = SopSeriesMap::new();

    match crate::extract::extract_one(path, registry) {
        Ok(extracted) => {
            let folder = relative_folder(path, top);
            let record = series_map
                .entry(extracted.series_uid.clone())
                .or_default()
                .entry(extracted.sub_series_id)
                .or_insert_with(|| SeriesRecord::from_extracted(extracted.fields, folder));

            let filename = path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or_default()
                .to_string();
            record.instances.insert(extracted.sop_uid.clone(), filename);
            sop_map.insert(extracted.sop_uid, extracted.series_uid);
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "skipping file that failed to parse as DICOM");
        }
    }

    (series_map, sop_map)
}

/// Merges `other` into `into`, keeping the first-seen record for a given
/// `(SeriesUID, SubSeriesID)` but always unioning `instances`, matching
/// invariant 5's "duplicate SopUIDs overwrite the filename with the last-seen
/// value" without depending on worker scheduling order for which record wins.
fn merge(into: &mut SeriesMetaMap, other: SeriesMetaMap) {
    for (series_uid, sub_series) in other {
        let target = into.entry(series_uid).or_default();
        for (sub_series_id, record) in sub_series {
            match target.entry(sub_series_id) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(mut slot) => {
                    slot.get_mut().instances.extend(record.instances);
                }
            }
        }
    }
}

/// POSIX-style path of the series' parent directory, relative to `top`'s parent.
fn relative_folder(path: &Path, top: &Path) -> String {
    let parent = path.parent().unwrap_or(top);
    let base = top.parent().unwrap_or(top);
    let rel = parent.strip_prefix(base).unwrap_or(parent);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
