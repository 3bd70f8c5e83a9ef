use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no DICOM files with extension \"{extension}\" found under {root:#?}")]
    EmptyInput { root: PathBuf, extension: String },
    #[error(transparent)]
    DicomRead(#[from] dicom_object::ReadError),
    #[error(transparent)]
    DicomElementAccess(#[from] dicom_object::AccessError),
    #[error(transparent)]
    Tags(#[from] dicom_graph_tags::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
