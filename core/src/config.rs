use serde::{Deserialize, Serialize};

/// Options controlling one ingestion run, grounded on
/// `dcm_file_sort_service::config::Config`'s serde-derived shape: a plain data
/// struct paired with a matching `Default`. Unlike that config, nothing here
/// reads the struct from a TOML file; that loading glue is a CLI concern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Filename extension DICOM files are recognized by, case-insensitive.
    pub extension: String,
    /// Worker count for the parallel crawl. `<= 0` means hardware parallelism.
    pub n_jobs: i32,
    /// When `false` and `crawl-cache.json`/`sop_map.json` already exist, resume from them.
    pub force: bool,
    /// Artifact subdirectory name; `None` defaults to the root directory's basename.
    pub dataset_name: Option<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            extension: "dcm".to_string(),
            n_jobs: 0,
            force: true,
            dataset_name: None,
        }
    }
}
