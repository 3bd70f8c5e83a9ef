//! Reference Resolver (C4): mutates every record in place, populating
//! `referenced_series_uid` / `referenced_modality`. Pure function of the two
//! maps otherwise; never fails. Every under- or over-determined reference is
//! a `tracing::warn!`, matching spec.md §4.4's "no exceptions are thrown".

use crate::model::{SeriesMetaMap, SeriesRecord, SopSeriesMap};
use dicom_graph_tags::{Modality, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Resolves every record's reference fields in place: SEG/RTSTRUCT/RTDOSE/
/// RTPLAN through their SOP-level references, PT through a shared
/// `FrameOfReferenceUID`, then fills in the human-readable referenced
/// modality for every record.
///
/// # Arguments
///
/// * `series` - The full series map, indexed by `SeriesInstanceUID` then
///   `SubSeriesID`; mutated in place.
/// * `sop_to_series` - The SOP UID to series UID inverse index built during
///   the crawl.
///
/// # Returns
///
/// Nothing; `series` is updated in place.
///
/// # Errors
///
/// This function never fails. An under- or over-determined reference is
/// logged as a warning and the record's reference fields are left empty or
/// take the lexicographically smallest candidate.
pub fn resolve(series: &mut SeriesMetaMap, sop_to_series: &SopSeriesMap) {
    let existing_series: BTreeSet<String> = series.keys().cloned().collect();
    let series_modality: BTreeMap<String, Modality> = series
        .iter()
        .map(|(uid, sub_series)| {
            let modality = sub_series.values().next().map(|r| r.modality).unwrap_or_default();
            (uid.clone(), modality)
        })
        .collect();
    let frame_of_reference_index = build_frame_of_reference_index(series);

    for sub_series in series.values_mut() {
        for record in sub_series.values_mut() {
            if is_already_resolved(record, &existing_series) {
                continue;
            }
            match record.modality {
                Modality::SEG | Modality::RtStruct | Modality::RtDose | Modality::RtPlan => {
                    resolve_via_sop_refs(record, sop_to_series, &existing_series);
                }
                Modality::PT => {
                    resolve_via_frame_of_reference(record, &frame_of_reference_index, &series_modality);
                }
                _ => {}
            }
        }
    }

    for sub_series in series.values_mut() {
        for record in sub_series.values_mut() {
            apply_referenced_modality(record, &series_modality);
        }
    }
}

fn build_frame_of_reference_index(series: &SeriesMetaMap) -> BTreeMap<String, BTreeSet<String>> {
    let mut index: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (series_uid, sub_series) in series {
        for record in sub_series.values() {
            if let Some(for_uid) = &record.frame_of_reference_uid {
                index.entry(for_uid.clone()).or_default().insert(series_uid.clone());
            }
        }
    }
    index
}

fn is_already_resolved(record: &SeriesRecord, existing_series: &BTreeSet<String>) -> bool {
    match &record.referenced_series_uid {
        Value::Str(uid) => !uid.is_empty() && existing_series.contains(uid),
        _ => false,
    }
}

/// SEG / RTSTRUCT / RTDOSE / RTPLAN: dereference each SOP-level reference
/// through `sop_to_series`, keep the ones that still exist, and on ambiguity
/// take the lexicographically smallest candidate (spec.md §4.4, §5 determinism).
fn resolve_via_sop_refs(record: &mut SeriesRecord, sop_to_series: &SopSeriesMap, existing_series: &BTreeSet<String>) {
    let candidates: BTreeSet<String> = record
        .referenced_sop_uids
        .iter()
        .filter_map(|sop| sop_to_series.get(sop))
        .filter(|uid| existing_series.contains(*uid))
        .cloned()
        .collect();

    match candidates.len() {
        0 => {
            warn!(series = %record.series_instance_uid, "no referenced series resolved from SOP references");
        }
        1 => {
            record.referenced_series_uid = Value::Str(candidates.into_iter().next().unwrap());
        }
        _ => {
            warn!(
                series = %record.series_instance_uid,
                candidates = ?candidates,
                "ambiguous SOP-level reference; taking the lexicographically smallest candidate"
            );
            record.referenced_series_uid = Value::Str(candidates.into_iter().next().unwrap());
        }
    }
}

/// PT: use shared `FrameOfReferenceUID` to find a companion CT, in
/// deterministic (lexicographic) order, ignoring the record's own series.
fn resolve_via_frame_of_reference(
    record: &mut SeriesRecord,
    frame_of_reference_index: &BTreeMap<String, BTreeSet<String>>,
    series_modality: &BTreeMap<String, Modality>,
) {
    let Some(for_uid) = &record.frame_of_reference_uid else {
        return;
    };
    let Some(candidates) = frame_of_reference_index.get(for_uid) else {
        return;
    };
    let companion_ct = candidates
        .iter()
        .find(|uid| *uid != &record.series_instance_uid && series_modality.get(*uid) == Some(&Modality::CT));

    match companion_ct {
        Some(ct_uid) => record.referenced_series_uid = Value::Str(ct_uid.clone()),
        None => {
            warn!(series = %record.series_instance_uid, frame_of_reference = %for_uid, "no companion CT found via FrameOfReferenceUID");
        }
    }
}

/// Post-pass: dereference the now-stable `referenced_series_uid` into a
/// modality name. SR's list-valued reference joins modalities with `|`.
fn apply_referenced_modality(record: &mut SeriesRecord, series_modality: &BTreeMap<String, Modality>) {
    record.referenced_modality = match &record.referenced_series_uid {
        Value::Str(uid) if !uid.is_empty() => series_modality
            .get(uid)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        Value::List(uids) => uids
            .iter()
            .filter_map(|uid| series_modality.get(uid))
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join("|"),
        _ => String::new(),
    };
}
