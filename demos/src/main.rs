//! Exercises ingestion and the query engine end-to-end against a DICOM
//! directory tree. Grounded on `dcm_sort::main`'s directory-walking CLI shape,
//! minus its command-line parsing: reading a directory tree and writing
//! artifacts is the interesting part here, not argument handling.

use anyhow::{bail, Context};
use dicom_graph_core::interlace::{query::query, Forest};
use dicom_graph_core::{parse_dicom_dir, IngestOptions};
use dicom_graph_tags::ModalityRegistry;
use std::path::PathBuf;
use tracing::{info, Level};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(Level::INFO)
        .init();

    let mut args = std::env::args().skip(1);
    let input = args.next().context("usage: dicom_graph_demo <input-dir> <output-dir> [query]")?;
    let output = args.next().context("usage: dicom_graph_demo <input-dir> <output-dir> [query]")?;
    let query_string = args.next();

    let root = PathBuf::from(&input);
    let output_dir = PathBuf::from(&output);
    if !root.is_dir() {
        bail!("input directory does not exist: {}", root.display());
    }

    let registry = ModalityRegistry::with_defaults();
    let result = parse_dicom_dir(&root, &output_dir, &IngestOptions::default(), &registry)?;

    info!(
        series = result.series.len(),
        rows = result.rows.len(),
        crawl_db = %result.artifacts.crawl_db.display(),
        "ingestion complete"
    );

    if let Some(query_string) = query_string {
        let forest = Forest::from_rows(&result.rows);
        let groups = query(&forest, &query_string)?;
        info!(query = %query_string, groups = groups.len(), "query complete");
        for (i, group) in groups.iter().enumerate() {
            for node in group {
                println!("group {i}: {} ({})", node.series_uid, node.modality);
            }
        }
    }

    Ok(())
}
