//! DICOM indexing and cross-referential graph engine. `parse_dicom_dir` is the
//! single ingestion entry point; `interlace::query::query` is the query API.
//! Grounded on `dcm_sort`/`dcm_file_sort_service`'s crate layout: one `lib.rs`
//! wiring together small, independently testable modules, no CLI glue.

pub mod config;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod interlace;
pub mod locator;
pub mod model;
pub mod resolve;
pub mod serialize;

pub use config::IngestOptions;
pub use error::{Error, Result};
pub use model::{SeriesMetaMap, SeriesRecord, SopSeriesMap};
pub use serialize::{ArtifactPaths, SlimRow};

use dicom_graph_tags::ModalityRegistry;
use std::path::Path;
use tracing::{debug, info};

/// The artifact paths and in-memory slim table produced by one ingestion run
/// (spec §6's `parse_dicom_dir` return shape).
pub struct IngestResult {
    pub artifacts: ArtifactPaths,
    pub series: SeriesMetaMap,
    pub sop_to_series: SopSeriesMap,
    pub rows: Vec<SlimRow>,
}

/// Drives the full ingestion state machine: START → LOCATED → PARSED →
/// RESOLVED → SERIALIZED → READY (§4.9). Resume-from-cache jumps START →
/// PARSED directly when `opts.force` is `false` and both cache files exist.
///
/// # Arguments
///
/// * `root` - Directory to crawl for DICOM files.
/// * `output_dir` - Parent directory under which the dataset's artifact
///   subdirectory is created.
/// * `opts` - Ingestion options: file extension, worker count, resume policy,
///   and dataset name.
/// * `registry` - The modality registry used to dispatch per-file extraction.
///
/// # Returns
///
/// * `Ok(IngestResult)` - The artifact paths plus the in-memory series map,
///   SOP index, and slim rows produced by this run.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] if no files matching `opts.extension` are
/// found under `root`, or propagates any I/O or (de)serialization failure
/// encountered while reading or writing the artifact files.
pub fn parse_dicom_dir(
    root: &Path,
    output_dir: &Path,
    opts: &IngestOptions,
    registry: &ModalityRegistry,
) -> Result<IngestResult> {
    let dataset_name = opts.dataset_name.clone().unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    let artifacts = ArtifactPaths::new(output_dir, &dataset_name);
    std::fs::create_dir_all(artifacts.dir())?;

    let (mut series, sop_to_series) = if !opts.force
        && artifacts.crawl_cache.exists()
        && artifacts.sop_map.exists()
    {
        info!(dataset = %dataset_name, "resuming from cache, skipping extraction pass");
        let series: SeriesMetaMap = serialize::load_json(&artifacts.crawl_cache)?;
        let sop_to_series: SopSeriesMap = serialize::load_json(&artifacts.sop_map)?;
        (series, sop_to_series)
    } else {
        let files = locator::locate(root, &opts.extension);
        debug!(count = files.len(), "LOCATED");
        if files.is_empty() {
            return Err(Error::EmptyInput {
                root: root.to_path_buf(),
                extension: opts.extension.clone(),
            });
        }

        let (series, sop_to_series) = run_crawl(&files, root, registry, opts.n_jobs);
        debug!(series = series.len(), "PARSED");

        serialize::write_json(&artifacts.crawl_cache, &series)?;
        serialize::write_json(&artifacts.sop_map, &sop_to_series)?;
        (series, sop_to_series)
    };

    resolve::resolve(&mut series, &sop_to_series);
    debug!("RESOLVED");

    serialize::write_json(&artifacts.crawl_db, &series)?;
    let rows = serialize::dedup_slim_rows(serialize::slim_rows(&series));
    serialize::write_csv(&artifacts.index_csv, &rows)?;
    debug!(rows = rows.len(), "SERIALIZED");

    info!(dataset = %dataset_name, series = series.len(), "READY");
    Ok(IngestResult {
        artifacts,
        series,
        sop_to_series,
        rows,
    })
}

/// Runs the crawl on a scoped thread pool sized to `n_jobs` when positive,
/// otherwise on rayon's global (hardware-parallelism) pool.
fn run_crawl(
    files: &[std::path::PathBuf],
    root: &Path,
    registry: &ModalityRegistry,
    n_jobs: i32,
) -> (SeriesMetaMap, SopSeriesMap) {
    if n_jobs > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_jobs as usize)
            .build()
            .expect("failed to build scoped thread pool");
        pool.install(|| crawl::crawl(files, root, registry))
    } else {
        crawl::crawl(files, root, registry)
    }
}
