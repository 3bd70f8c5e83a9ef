//! Modality registry (C8): a process-wide table of per-modality tag sets and
//! computed reference extractors, consumed by `dicom-graph-core::extract`
//! through the narrow [`ModalityExtractor`] interface. Grounded on the
//! original's `ModalityMetadataExtractor` ABC plus its `register_extractor`/
//! `get_extractor` registry functions.

use crate::util::to_string_opt;
use crate::{Error, Modality};
use dicom_core::Tag;
use dicom_dictionary_std::tags::{
    ACQUISITION_DATE, ACQUISITION_NUMBER, ACQUISITION_TIME, BODY_PART_EXAMINED,
    FRAME_OF_REFERENCE_UID, IMAGE_ORIENTATION_PATIENT, IMAGE_POSITION_PATIENT, MANUFACTURER,
    MANUFACTURER_MODEL_NAME, MODALITY, PATIENT_ID, PIXEL_SPACING, SERIES_DATE,
    SERIES_INSTANCE_UID, SERIES_TIME, SLICE_THICKNESS, SPACING_BETWEEN_SLICES, STUDY_DATE,
    STUDY_INSTANCE_UID, STUDY_TIME,
};
use dicom_object::InMemDicomObject;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Tags read on every modality regardless of registration, mirroring
/// `ModalityMetadataExtractor.base_tags`.
pub const BASE_TAGS: &[(&str, Tag)] = &[
    ("PatientID", PATIENT_ID),
    ("StudyInstanceUID", STUDY_INSTANCE_UID),
    ("SeriesInstanceUID", SERIES_INSTANCE_UID),
    ("Modality", MODALITY),
    ("BodyPartExamined", BODY_PART_EXAMINED),
    ("FrameOfReferenceUID", FRAME_OF_REFERENCE_UID),
    ("AcquisitionNumber", ACQUISITION_NUMBER),
    ("SliceThickness", SLICE_THICKNESS),
    ("PixelSpacing", PIXEL_SPACING),
    ("ImageOrientationPatient", IMAGE_ORIENTATION_PATIENT),
    ("ImagePositionPatient", IMAGE_POSITION_PATIENT),
    ("SpacingBetweenSlices", SPACING_BETWEEN_SLICES),
    ("Manufacturer", MANUFACTURER),
    ("ManufacturerModelName", MANUFACTURER_MODEL_NAME),
    ("StudyDate", STUDY_DATE),
    ("StudyTime", STUDY_TIME),
    ("SeriesDate", SERIES_DATE),
    ("SeriesTime", SERIES_TIME),
    ("AcquisitionDate", ACQUISITION_DATE),
    ("AcquisitionTime", ACQUISITION_TIME),
];

/// A computed or direct-tag value. Direct tag reads always land in `Str`,
/// mirroring the original's `str(ds.get(tag, ""))`; computed reference
/// fields may be numeric or list-valued.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Num(f64),
    List(Vec<String>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Value::Str(s) => s.is_empty(),
            Value::List(v) => v.is_empty(),
            Value::Num(_) => false,
        }
    }

    /// Flattens any variant to a single display string, joining list entries
    /// with `|` (the same separator the resolver uses for multi-valued
    /// `ReferencedModality`). Used by the CSV writer, which has no column type
    /// for list-valued fields.
    pub fn display_string(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            Value::Num(n) => n.to_string(),
            Value::List(v) => v.join("|"),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Str(String::new())
    }
}

pub type ExtractedFields = BTreeMap<String, Value>;

/// A computed field that may fail; failures are caught by [`ModalityExtractor::extract`]
/// and turned into an empty `Value::Str` plus a warning, never propagated.
pub type ComputedField = (&'static str, Result<Value, Error>);

/// Modality-specific tag extraction, dispatched on by `dicom-graph-core::extract`.
pub trait ModalityExtractor: Send + Sync {
    fn modality(&self) -> Modality;

    /// DICOM tags specific to this modality, merged with [`BASE_TAGS`].
    fn modality_tags(&self) -> &'static [(&'static str, Tag)] {
        &[]
    }

    /// Reference UIDs and other derived fields computed from the full dataset.
    fn computed_fields(&self, _obj: &InMemDicomObject) -> Vec<ComputedField> {
        Vec::new()
    }

    fn metadata_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = BASE_TAGS
            .iter()
            .chain(self.modality_tags())
            .map(|(name, _)| name.to_string())
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Extracts base tags, modality tags, and computed fields into a sorted map.
    /// Never fails: a computed field that errors out is logged and stored empty,
    /// matching the original's try/except-around-each-computed-field behavior.
    fn extract(&self, obj: &InMemDicomObject) -> ExtractedFields {
        let mut output = ExtractedFields::new();
        for (name, tag) in BASE_TAGS.iter().chain(self.modality_tags()) {
            let value = to_string_opt(obj, *tag).unwrap_or_default().unwrap_or_default();
            output.insert(name.to_string(), Value::Str(value));
        }
        for (key, result) in self.computed_fields(obj) {
            let value = match result {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(
                        modality = %self.modality(),
                        field = key,
                        error = %e,
                        "failed to compute field; storing empty value"
                    );
                    Value::default()
                }
            };
            output.insert(key.to_string(), value);
        }
        output
    }
}

/// Fallback extractor for unregistered modalities: base tags only.
struct UnknownExtractor;

impl ModalityExtractor for UnknownExtractor {
    fn modality(&self) -> Modality {
        Modality::Unknown
    }
}

/// Process-wide table of `{modality -> ModalityExtractor}`, populated once at
/// startup and read-only thereafter (§5's "process-global" resource policy).
pub struct ModalityRegistry {
    extractors: HashMap<Modality, Box<dyn ModalityExtractor>>,
    fallback: Box<dyn ModalityExtractor>,
}

impl ModalityRegistry {
    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
            fallback: Box::new(UnknownExtractor),
        }
    }

    /// Registers the CT/MR/PT/RTSTRUCT/RTDOSE/RTPLAN/SEG/SR extractors shipped
    /// with this crate.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for extractor in crate::extractors::defaults() {
            registry
                .register(extractor)
                .expect("default extractor set must not collide");
        }
        registry
    }

    /// Registers an extractor; duplicate registration for a modality already
    /// present is a fatal configuration error (§8 DuplicateRegistration).
    pub fn register(&mut self, extractor: Box<dyn ModalityExtractor>) -> Result<(), Error> {
        let modality = extractor.modality();
        if self.extractors.contains_key(&modality) {
            return Err(Error::DuplicateRegistration(modality));
        }
        self.extractors.insert(modality, extractor);
        Ok(())
    }

    /// Looks up the extractor for `modality`, falling back to the base-tags-only
    /// extractor when nothing is registered for it.
    pub fn get(&self, modality: Modality) -> &dyn ModalityExtractor {
        self.extractors
            .get(&modality)
            .map(|b| b.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }

    pub fn supported_modalities(&self) -> Vec<Modality> {
        self.extractors.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_defaults_has_no_collisions() {
        let registry = ModalityRegistry::with_defaults();
        assert!(registry.supported_modalities().contains(&Modality::CT));
    }

    #[test]
    fn test_duplicate_registration_is_fatal() {
        let mut registry = ModalityRegistry::empty();
        registry
            .register(Box::new(UnknownExtractorDup))
            .unwrap();
        let err = registry.register(Box::new(UnknownExtractorDup)).unwrap_err();
        assert!(matches!(err, Error::DuplicateRegistration(_)));
    }

    struct UnknownExtractorDup;
    impl ModalityExtractor for UnknownExtractorDup {
        fn modality(&self) -> Modality {
            Modality::CT
        }
    }

    #[test]
    fn test_unregistered_modality_falls_back_to_base_tags() {
        let registry = ModalityRegistry::empty();
        let extractor = registry.get(Modality::RtStruct);
        assert_eq!(extractor.modality(), Modality::Unknown);
        assert!(extractor.metadata_keys().len() == BASE_TAGS.len());
    }
}
