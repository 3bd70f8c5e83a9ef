use crate::util::{to_string, to_string_opt};
use crate::Error;
use dicom_dictionary_std::tags::{REFERENCED_SOP_CLASS_UID, REFERENCED_SOP_INSTANCE_UID};
use dicom_core::Tag;
use dicom_object::InMemDicomObject;
use serde::{Deserialize, Serialize};

/// A DICOM Service-Object Pair reference: the pairing of a SOP class and a
/// SOP instance UID, as it appears inside a `ReferencedSOPSequence`-shaped item.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sop {
    pub class_uid: String,
    pub instance_uid: String,
}

pub(crate) fn read_sop(obj: &InMemDicomObject, class_uid: Tag, instance_uid: Tag) -> Result<Sop, Error> {
    Ok(Sop {
        class_uid: to_string(obj, class_uid)?,
        instance_uid: to_string(obj, instance_uid)?,
    })
}

pub(crate) fn read_sop_opt(
    obj: &InMemDicomObject,
    class_uid: Tag,
    instance_uid: Tag,
) -> Result<Option<Sop>, Error> {
    match (to_string_opt(obj, class_uid)?, to_string_opt(obj, instance_uid)?) {
        (Some(class_uid), Some(instance_uid)) => Ok(Some(Sop { class_uid, instance_uid })),
        _ => Ok(None),
    }
}

pub(crate) fn referenced_sop(item: &InMemDicomObject) -> Result<Sop, Error> {
    read_sop(item, REFERENCED_SOP_CLASS_UID, REFERENCED_SOP_INSTANCE_UID)
}

pub(crate) fn referenced_sop_opt(item: &InMemDicomObject) -> Result<Option<Sop>, Error> {
    read_sop_opt(item, REFERENCED_SOP_CLASS_UID, REFERENCED_SOP_INSTANCE_UID)
}
