//! Typed accessors over [`InMemDicomObject`], grounded on the teacher's
//! `io::utils` module: every DICOM read returns "present and well-typed" or
//! "missing" as an `Option`, never an exception-as-control-flow probe.

use crate::Error;
use dicom_core::Tag;
use dicom_core::value::Value;
use dicom_object::InMemDicomObject;
use num_traits::NumCast;

pub fn to_string(obj: &InMemDicomObject, tag: Tag) -> Result<String, Error> {
    Ok(obj.element(tag)?.to_str()?.to_string())
}

pub fn to_string_opt(obj: &InMemDicomObject, tag: Tag) -> Result<Option<String>, Error> {
    match obj.element_opt(tag)? {
        None => Ok(None),
        Some(elem) => Ok(Some(elem.to_str()?.to_string())),
    }
}

/// Splits a multi-valued string element on the DICOM `\` separator.
pub fn to_strings_opt(obj: &InMemDicomObject, tag: Tag) -> Result<Option<Vec<String>>, Error> {
    match obj.element_opt(tag)? {
        None => Ok(None),
        Some(elem) => Ok(Some(elem.to_multi_str()?.to_vec())),
    }
}

pub fn to_int_opt<T>(obj: &InMemDicomObject, tag: Tag) -> Result<Option<T>, Error>
where
    T: Clone + NumCast + std::str::FromStr<Err = std::num::ParseIntError>,
{
    match obj.element_opt(tag)? {
        None => Ok(None),
        Some(elem) => Ok(Some(elem.to_int()?)),
    }
}

pub fn to_f64(obj: &InMemDicomObject, tag: Tag) -> Result<f64, Error> {
    Ok(obj.element(tag)?.to_float64()?)
}

pub fn to_f64_opt(obj: &InMemDicomObject, tag: Tag) -> Result<Option<f64>, Error> {
    match obj.element_opt(tag)? {
        None => Ok(None),
        Some(elem) => Ok(Some(elem.to_float64()?)),
    }
}

pub fn to_f64s_opt(obj: &InMemDicomObject, tag: Tag) -> Result<Option<Vec<f64>>, Error> {
    match obj.element_opt(tag)? {
        None => Ok(None),
        Some(elem) => Ok(Some(elem.to_multi_float64()?)),
    }
}

/// Parses a sequence element, applying `func` to each item.
pub fn from_seq<T>(
    obj: &InMemDicomObject,
    seq_tag: Tag,
    func: impl Fn(&InMemDicomObject) -> Result<T, Error>,
) -> Result<Vec<T>, Error> {
    let seq = obj.element(seq_tag)?;
    match seq.value() {
        Value::Primitive(_) => Err(Error::ElementIsNotSequence(seq_tag)),
        Value::PixelSequence(_) => Err(Error::PixelSequenceNotSupported(seq_tag)),
        Value::Sequence(sq) => sq.items().iter().map(|item| func(item)).collect(),
    }
}

pub fn from_seq_opt<T>(
    obj: &InMemDicomObject,
    seq_tag: Tag,
    func: impl Fn(&InMemDicomObject) -> Result<T, Error>,
) -> Result<Option<Vec<T>>, Error> {
    if obj.element_opt(seq_tag)?.is_none() {
        return Ok(None);
    }
    Ok(Some(from_seq(obj, seq_tag, func)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::{DataElement, VR};
    use dicom_dictionary_std::tags::{PATIENT_ID, PATIENT_NAME};

    fn test_obj() -> InMemDicomObject {
        let mut obj = InMemDicomObject::new_empty();
        obj.put(DataElement::new(PATIENT_ID, VR::LO, "X01"));
        obj
    }

    #[test]
    fn test_to_string() {
        let obj = test_obj();
        assert_eq!(to_string(&obj, PATIENT_ID).unwrap(), "X01");
    }

    #[test]
    fn test_to_string_opt_missing() {
        let obj = test_obj();
        assert!(to_string_opt(&obj, PATIENT_NAME).unwrap().is_none());
    }
}
