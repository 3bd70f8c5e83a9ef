use dicom_core::Tag;
use dicom_core::value::{CastValueError, ConvertValueError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to read DICOM file")]
    DicomReadError(#[from] dicom_object::ReadError),
    #[error("Unable to find DICOM element")]
    DicomElementAccessError(#[from] dicom_object::AccessError),
    #[error("Unable to convert value from DICOM element")]
    ConvertValueError(#[from] ConvertValueError),
    #[error("Unable to cast internal DICOM value to the requested data type")]
    CastValueError(#[from] CastValueError),
    #[error("Unable to parse date/time")]
    ChronoError(#[from] chrono::ParseError),
    #[error("Element read with tag {0:#?} is not a sequence")]
    ElementIsNotSequence(Tag),
    #[error("Element read with tag {0:#?} is a pixel sequence, not supported here")]
    PixelSequenceNotSupported(Tag),
    #[error("Duplicate extractor registration for modality {0:?}")]
    DuplicateRegistration(crate::Modality),
}

pub type Result<T> = std::result::Result<T, Error>;
