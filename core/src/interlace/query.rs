//! Query Engine (C7): validates a comma-separated modality query, reorders it
//! into canonical order, and matches it as a contiguous subsequence against
//! every branch of the forest. Grounded on spec §4.7's validation rules and
//! merge-by-root-node deduplication.

use super::{Branch, Forest, SeriesNode};
use dicom_graph_tags::Modality;

/// The only modality tokens a query string may mention, in the fixed order
/// matching is performed against.
pub const CANONICAL_ORDER: [Modality; 6] = [
    Modality::CT,
    Modality::MR,
    Modality::PT,
    Modality::SEG,
    Modality::RtStruct,
    Modality::RtDose,
];

#[derive(thiserror::Error, Debug)]
pub enum QueryError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// One matched node, in the shape the query API returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeMatch {
    pub series_uid: String,
    pub modality: Modality,
}

impl From<&SeriesNode> for NodeMatch {
    fn from(node: &SeriesNode) -> Self {
        Self {
            series_uid: node.series_uid.clone(),
            modality: node.modality,
        }
    }
}

/// Parses, deduplicates, and validates a query string, returning the
/// recognized tokens reordered into [`CANONICAL_ORDER`].
fn validate(query_str: &str) -> Result<Vec<Modality>, QueryError> {
    let mut tokens: Vec<Modality> = Vec::new();
    for raw in query_str.split(',') {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let modality: Modality = trimmed.parse().expect("Modality::from_str is infallible");
        if !CANONICAL_ORDER.contains(&modality) {
            return Err(QueryError::InvalidQuery(format!(
                "unsupported modality token {trimmed:?}"
            )));
        }
        if !tokens.contains(&modality) {
            tokens.push(modality);
        }
    }
    if tokens.is_empty() {
        return Err(QueryError::InvalidQuery("empty query".to_string()));
    }
    let has_image_series = tokens.contains(&Modality::CT)
        || tokens.contains(&Modality::MR)
        || tokens.contains(&Modality::PT);
    if (tokens.contains(&Modality::RtStruct) || tokens.contains(&Modality::SEG)) && !has_image_series {
        return Err(QueryError::InvalidQuery(
            "RTSTRUCT or SEG requires at least one of CT, MR, PT".to_string(),
        ));
    }
    if tokens.contains(&Modality::RtDose) && !tokens.contains(&Modality::RtStruct) {
        return Err(QueryError::InvalidQuery(
            "RTDOSE requires RTSTRUCT".to_string(),
        ));
    }

    Ok(CANONICAL_ORDER
        .iter()
        .copied()
        .filter(|m| tokens.contains(m))
        .collect())
}

/// Scans `branch`'s modality sequence for a contiguous window equal to
/// `validated`, returning the matching node slice on the first hit.
fn match_branch<'a>(branch: &'a Branch, validated: &[Modality]) -> Option<&'a [SeriesNode]> {
    if validated.is_empty() || branch.nodes.len() < validated.len() {
        return None;
    }
    (0..=branch.nodes.len() - validated.len()).find_map(|start| {
        let window = &branch.nodes[start..start + validated.len()];
        window
            .iter()
            .map(|n| n.modality)
            .eq(validated.iter().copied())
            .then_some(window)
    })
}

/// Resolves a modality-combination query against every branch of `forest`.
/// Matches are grouped by the first (root) node of the match: groups sharing
/// a root are merged, the root kept once and followed by the union of
/// matched descendants in first-encounter order. Full duplicate tuples are
/// suppressed.
///
/// # Arguments
///
/// * `forest` - The series forest built from one ingestion run's slim rows.
/// * `query_str` - A comma-separated list of modality tokens, e.g. `"CT,RTSTRUCT"`.
///
/// # Returns
///
/// One group of matched nodes per distinct root series that satisfies the
/// query, each in root-to-leaf order.
///
/// # Errors
///
/// Returns [`QueryError::InvalidQuery`] if the query string is empty, names
/// an unsupported modality, or violates the RTSTRUCT/SEG-needs-an-image-series
/// or RTDOSE-needs-RTSTRUCT structural rules.
pub fn query(forest: &Forest, query_str: &str) -> Result<Vec<Vec<NodeMatch>>, QueryError> {
    let validated = validate(query_str)?;
    let branches = forest.branches();

    let mut seen_tuples: Vec<Vec<String>> = Vec::new();
    let mut groups: Vec<(String, Vec<NodeMatch>)> = Vec::new();

    for branch in &branches {
        let Some(matched) = match_branch(branch, &validated) else {
            continue;
        };
        let tuple: Vec<String> = matched.iter().map(|n| n.series_uid.clone()).collect();
        if seen_tuples.contains(&tuple) {
            continue;
        }
        seen_tuples.push(tuple);

        let root_uid = matched[0].series_uid.clone();
        match groups.iter_mut().find(|(uid, _)| *uid == root_uid) {
            Some((_, nodes)) => {
                for node in matched {
                    if !nodes.iter().any(|m| m.series_uid == node.series_uid) {
                        nodes.push(NodeMatch::from(node));
                    }
                }
            }
            None => groups.push((root_uid, matched.iter().map(NodeMatch::from).collect())),
        }
    }

    Ok(groups.into_iter().map(|(_, nodes)| nodes).collect())
}
