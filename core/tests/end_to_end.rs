//! End-to-end ingestion scenarios against synthetic DICOM trees, grounded on
//! `dcm_grep::grep::tests::create_dicom_model`'s `InMemDicomObject` + nested
//! `DataSetSequence` construction pattern, written to temporary files and fed
//! through the full `locate -> crawl -> resolve -> serialize` pipeline.

use dicom_core::value::DataSetSequence;
use dicom_core::{DataElement, VR};
use dicom_dictionary_std::tags::{
    CONTOUR_IMAGE_SEQUENCE, FRAME_OF_REFERENCE_UID, MODALITY, PATIENT_ID,
    REFERENCED_FRAME_OF_REFERENCE_SEQUENCE, REFERENCED_IMAGE_SEQUENCE, REFERENCED_SOP_CLASS_UID,
    REFERENCED_SOP_INSTANCE_UID, REFERENCED_STRUCTURE_SET_SEQUENCE, RT_REFERENCED_SERIES_SEQUENCE,
    RT_REFERENCED_STUDY_SEQUENCE, SERIES_INSTANCE_UID, SOP_INSTANCE_UID, STUDY_INSTANCE_UID,
};
use dicom_dictionary_std::uids::{
    CT_IMAGE_STORAGE, POSITRON_EMISSION_TOMOGRAPHY_IMAGE_STORAGE, RT_DOSE_STORAGE,
    RT_STRUCTURE_SET_STORAGE,
};
use dicom_graph_core::interlace::query::query;
use dicom_graph_core::interlace::Forest;
use dicom_graph_core::{parse_dicom_dir, IngestOptions};
use dicom_graph_tags::{Modality, ModalityRegistry, Value};
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
use std::path::Path;
use tempfile::tempdir;

fn base_obj(patient_id: &str, study_uid: &str, series_uid: &str, modality: &str, sop_uid: &str) -> InMemDicomObject {
    let mut obj = InMemDicomObject::new_empty();
    obj.put_str(PATIENT_ID, VR::LO, patient_id);
    obj.put_str(STUDY_INSTANCE_UID, VR::UI, study_uid);
    obj.put_str(SERIES_INSTANCE_UID, VR::UI, series_uid);
    obj.put_str(MODALITY, VR::CS, modality);
    obj.put_str(SOP_INSTANCE_UID, VR::UI, sop_uid);
    obj
}

fn write_dicom(dir: &Path, filename: &str, sop_class_uid: &str, obj: InMemDicomObject) {
    let file_obj = obj
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(dicom_transfer_syntax_registry::default().erased().uid())
                .media_storage_sop_class_uid(sop_class_uid),
        )
        .unwrap();
    file_obj.write_to_file(dir.join(filename)).unwrap();
}

/// An RTSTRUCT object referencing a source series through
/// `ReferencedFrameOfReferenceSequence -> RTReferencedStudySequence ->
/// RTReferencedSeriesSequence`. When `include_series_uid` is false the series
/// item carries only its `ContourImageSequence` (SOP-only reference).
fn rtstruct_obj(
    patient_id: &str,
    study_uid: &str,
    series_uid: &str,
    sop_uid: &str,
    referenced_series_uid: Option<&str>,
    referenced_sop_uids: &[&str],
) -> InMemDicomObject {
    let mut obj = base_obj(patient_id, study_uid, series_uid, "RTSTRUCT", sop_uid);

    let contour_items: Vec<InMemDicomObject> = referenced_sop_uids
        .iter()
        .map(|sop| {
            let mut item = InMemDicomObject::new_empty();
            item.put_str(REFERENCED_SOP_INSTANCE_UID, VR::UI, *sop);
            item
        })
        .collect();

    let mut series_item = InMemDicomObject::new_empty();
    if let Some(uid) = referenced_series_uid {
        series_item.put_str(SERIES_INSTANCE_UID, VR::UI, uid);
    }
    series_item.put(DataElement::new(
        CONTOUR_IMAGE_SEQUENCE,
        VR::SQ,
        DataSetSequence::from(contour_items),
    ));

    let mut study_item = InMemDicomObject::new_empty();
    study_item.put(DataElement::new(
        RT_REFERENCED_SERIES_SEQUENCE,
        VR::SQ,
        DataSetSequence::from(vec![series_item]),
    ));

    let mut for_item = InMemDicomObject::new_empty();
    for_item.put(DataElement::new(
        RT_REFERENCED_STUDY_SEQUENCE,
        VR::SQ,
        DataSetSequence::from(vec![study_item]),
    ));

    obj.put(DataElement::new(
        REFERENCED_FRAME_OF_REFERENCE_SEQUENCE,
        VR::SQ,
        DataSetSequence::from(vec![for_item]),
    ));

    obj
}

fn rtdose_obj(
    patient_id: &str,
    study_uid: &str,
    series_uid: &str,
    sop_uid: &str,
    referenced_image_sop: Option<&str>,
    referenced_structure_set_sop: Option<&str>,
) -> InMemDicomObject {
    let mut obj = base_obj(patient_id, study_uid, series_uid, "RTDOSE", sop_uid);

    if let Some(sop) = referenced_image_sop {
        let mut image_item = InMemDicomObject::new_empty();
        image_item.put_str(REFERENCED_SOP_INSTANCE_UID, VR::UI, sop);
        obj.put(DataElement::new(
            REFERENCED_IMAGE_SEQUENCE,
            VR::SQ,
            DataSetSequence::from(vec![image_item]),
        ));
    }

    if let Some(sop) = referenced_structure_set_sop {
        let mut struct_item = InMemDicomObject::new_empty();
        struct_item.put_str(REFERENCED_SOP_CLASS_UID, VR::UI, RT_STRUCTURE_SET_STORAGE);
        struct_item.put_str(REFERENCED_SOP_INSTANCE_UID, VR::UI, sop);
        obj.put(DataElement::new(
            REFERENCED_STRUCTURE_SET_SEQUENCE,
            VR::SQ,
            DataSetSequence::from(vec![struct_item]),
        ));
    }

    obj
}

fn pt_obj(patient_id: &str, study_uid: &str, series_uid: &str, sop_uid: &str, frame_of_reference_uid: &str) -> InMemDicomObject {
    let mut obj = base_obj(patient_id, study_uid, series_uid, "PT", sop_uid);
    obj.put_str(FRAME_OF_REFERENCE_UID, VR::UI, frame_of_reference_uid);
    obj
}

fn ct_obj_with_for(patient_id: &str, study_uid: &str, series_uid: &str, sop_uid: &str, frame_of_reference_uid: &str) -> InMemDicomObject {
    let mut obj = base_obj(patient_id, study_uid, series_uid, "CT", sop_uid);
    obj.put_str(FRAME_OF_REFERENCE_UID, VR::UI, frame_of_reference_uid);
    obj
}

#[test]
fn test_isolated_ct_series() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("input");
    std::fs::create_dir_all(&root).unwrap();
    for i in 0..3 {
        let obj = base_obj("P1", "STUDY1", "CT-SERIES-1", "CT", &format!("SOP-CT-{i}"));
        write_dicom(&root, &format!("ct_{i}.dcm"), CT_IMAGE_STORAGE, obj);
    }

    let registry = ModalityRegistry::with_defaults();
    let result = parse_dicom_dir(&root, &dir.path().join("output"), &IngestOptions::default(), &registry).unwrap();

    assert_eq!(result.series.len(), 1);
    let record = &result.series["CT-SERIES-1"]["1"];
    assert_eq!(record.modality, Modality::CT);
    assert_eq!(record.instances.len(), 3);
    assert_eq!(record.referenced_series_uid, Value::Str(String::new()));

    let forest = Forest::from_rows(&result.rows);
    let groups = query(&forest, "CT").unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 1);
}

#[test]
fn test_ct_with_rtstruct_direct_series_reference() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("input");
    std::fs::create_dir_all(&root).unwrap();

    write_dicom(
        &root,
        "ct.dcm",
        CT_IMAGE_STORAGE,
        base_obj("P1", "STUDY1", "1.2.3", "CT", "SOP-CT-0"),
    );
    write_dicom(
        &root,
        "rtstruct.dcm",
        RT_STRUCTURE_SET_STORAGE,
        rtstruct_obj("P1", "STUDY1", "1.2.3.999", "SOP-RS-0", Some("1.2.3"), &["SOP-CT-0"]),
    );

    let registry = ModalityRegistry::with_defaults();
    let result = parse_dicom_dir(&root, &dir.path().join("output"), &IngestOptions::default(), &registry).unwrap();

    let rtstruct = &result.series["1.2.3.999"]["1"];
    assert_eq!(rtstruct.referenced_series_uid, Value::Str("1.2.3".to_string()));
    assert_eq!(rtstruct.referenced_modality, "CT");

    let forest = Forest::from_rows(&result.rows);
    let groups = query(&forest, "CT,RTSTRUCT").unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert_eq!(groups[0][0].series_uid, "1.2.3");
    assert_eq!(groups[0][1].series_uid, "1.2.3.999");
}

#[test]
fn test_rtstruct_sop_only_reference_then_rtdose() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("input");
    std::fs::create_dir_all(&root).unwrap();

    write_dicom(
        &root,
        "ct.dcm",
        CT_IMAGE_STORAGE,
        base_obj("P1", "STUDY1", "1.2.3", "CT", "SOP-CT-0"),
    );
    write_dicom(
        &root,
        "rtstruct.dcm",
        RT_STRUCTURE_SET_STORAGE,
        rtstruct_obj("P1", "STUDY1", "1.2.3.999", "SOP-RS-0", None, &["SOP-CT-0"]),
    );
    write_dicom(
        &root,
        "rtdose.dcm",
        RT_DOSE_STORAGE,
        rtdose_obj("P1", "STUDY1", "1.2.3.888", "SOP-RD-0", None, Some("SOP-RS-0")),
    );

    let registry = ModalityRegistry::with_defaults();
    let result = parse_dicom_dir(&root, &dir.path().join("output"), &IngestOptions::default(), &registry).unwrap();

    let rtstruct = &result.series["1.2.3.999"]["1"];
    assert_eq!(rtstruct.referenced_series_uid, Value::Str("1.2.3".to_string()));

    let rtdose = &result.series["1.2.3.888"]["1"];
    assert_eq!(rtdose.referenced_series_uid, Value::Str("1.2.3.999".to_string()));
    assert_eq!(rtdose.referenced_modality, "RTSTRUCT");

    let forest = Forest::from_rows(&result.rows);
    let groups = query(&forest, "CT,RTSTRUCT,RTDOSE").unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);
}

#[test]
fn test_pet_resolves_companion_ct_via_frame_of_reference() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("input");
    std::fs::create_dir_all(&root).unwrap();

    write_dicom(
        &root,
        "ct.dcm",
        CT_IMAGE_STORAGE,
        ct_obj_with_for("P1", "STUDY1", "CT1", "SOP-CT-0", "FOR1"),
    );
    write_dicom(
        &root,
        "pt.dcm",
        POSITRON_EMISSION_TOMOGRAPHY_IMAGE_STORAGE,
        pt_obj("P1", "STUDY1", "PT1", "SOP-PT-0", "FOR1"),
    );

    let registry = ModalityRegistry::with_defaults();
    let result = parse_dicom_dir(&root, &dir.path().join("output"), &IngestOptions::default(), &registry).unwrap();

    let pt = &result.series["PT1"]["1"];
    assert_eq!(pt.referenced_series_uid, Value::Str("CT1".to_string()));
    assert_eq!(pt.referenced_modality, "CT");

    let forest = Forest::from_rows(&result.rows);
    let groups = query(&forest, "CT,PT").unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_dangling_reference_stays_unresolved_and_query_is_empty() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("input");
    std::fs::create_dir_all(&root).unwrap();

    write_dicom(
        &root,
        "rtstruct.dcm",
        RT_STRUCTURE_SET_STORAGE,
        rtstruct_obj("P1", "STUDY1", "1.2.3.999", "SOP-RS-0", None, &["missing-sop"]),
    );

    let registry = ModalityRegistry::with_defaults();
    let result = parse_dicom_dir(&root, &dir.path().join("output"), &IngestOptions::default(), &registry).unwrap();

    let rtstruct = &result.series["1.2.3.999"]["1"];
    assert_eq!(rtstruct.referenced_series_uid, Value::Str(String::new()));

    let forest = Forest::from_rows(&result.rows);
    let groups = query(&forest, "CT,RTSTRUCT").unwrap();
    assert!(groups.is_empty());
}

#[test]
fn test_invalid_query_strings_are_rejected() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("input");
    std::fs::create_dir_all(&root).unwrap();
    write_dicom(
        &root,
        "ct.dcm",
        CT_IMAGE_STORAGE,
        base_obj("P1", "STUDY1", "1.2.3", "CT", "SOP-CT-0"),
    );

    let registry = ModalityRegistry::with_defaults();
    let result = parse_dicom_dir(&root, &dir.path().join("output"), &IngestOptions::default(), &registry).unwrap();
    let forest = Forest::from_rows(&result.rows);

    assert!(query(&forest, "RTDOSE").is_err());
    assert!(query(&forest, "CT,SEG,RTDOSE").is_err());
}

#[test]
fn test_empty_input_directory_is_fatal() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("input");
    std::fs::create_dir_all(&root).unwrap();

    let registry = ModalityRegistry::with_defaults();
    let err = parse_dicom_dir(&root, &dir.path().join("output"), &IngestOptions::default(), &registry).unwrap_err();
    assert!(matches!(err, dicom_graph_core::Error::EmptyInput { .. }));
}

#[test]
fn test_resume_from_cache_skips_reextraction() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("input");
    std::fs::create_dir_all(&root).unwrap();
    write_dicom(
        &root,
        "ct.dcm",
        CT_IMAGE_STORAGE,
        base_obj("P1", "STUDY1", "1.2.3", "CT", "SOP-CT-0"),
    );

    let output = dir.path().join("output");
    let registry = ModalityRegistry::with_defaults();
    let opts = IngestOptions::default();
    let first = parse_dicom_dir(&root, &output, &opts, &registry).unwrap();

    std::fs::remove_file(root.join("ct.dcm")).unwrap();

    let resume_opts = IngestOptions {
        force: false,
        ..IngestOptions::default()
    };
    let second = parse_dicom_dir(&root, &output, &resume_opts, &registry).unwrap();

    assert_eq!(first.series.len(), second.series.len());
    assert_eq!(second.series["1.2.3"]["1"].instances.len(), 1);
}
