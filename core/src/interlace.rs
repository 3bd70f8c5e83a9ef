//! Interlacer Forest (C6): builds an arena of `SeriesNode`s from the slim
//! index and enumerates root-to-leaf branches. The arena-of-nodes design
//! (integer IDs, `(parent_id, child_id)` edges) follows Design Notes §9:
//! branch copying is then a cheap re-walk with no aliasing hazards.

pub mod query;

use crate::serialize::SlimRow;
use dicom_graph_tags::Modality;
use std::collections::{BTreeMap, HashMap, HashSet};

pub type NodeId = usize;

/// Equality and hashing are by `SeriesUID` alone (spec.md §3).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SeriesNode {
    pub series_uid: String,
    pub modality: Modality,
    pub patient_id: String,
    pub study_instance_uid: String,
}

impl SeriesNode {
    /// A fresh, detached copy: what each `Branch` stores, so mutating one
    /// branch's node list never aliases another (the original's `copy_node`).
    pub fn snapshot(&self) -> Self {
        self.clone()
    }
}

/// An ordered root-to-leaf path; each node is an owned snapshot.
#[derive(Clone, Debug)]
pub struct Branch {
    pub nodes: Vec<SeriesNode>,
}

/// The reference-mode forest: one node per unique `SeriesInstanceUID`
/// (duplicates dropped, keep first), parent/child edges from
/// `ReferencedSeriesUID`, roots = every CT/MR plus every unreferenced PT.
pub struct Forest {
    nodes: Vec<SeriesNode>,
    children: Vec<Vec<NodeId>>,
    roots: Vec<NodeId>,
}

impl Forest {
    pub fn from_rows(rows: &[SlimRow]) -> Self {
        let mut nodes = Vec::new();
        let mut index: HashMap<String, NodeId> = HashMap::new();
        let mut seen = HashSet::new();
        let mut pending_refs: Vec<(NodeId, String)> = Vec::new();

        for row in rows {
            if !seen.insert(row.series_instance_uid.clone()) {
                continue;
            }
            let modality: Modality = row.modality.parse().unwrap_or_default();
            let id = nodes.len();
            nodes.push(SeriesNode {
                series_uid: row.series_instance_uid.clone(),
                modality,
                patient_id: row.patient_id.clone(),
                study_instance_uid: row.study_instance_uid.clone(),
            });
            index.insert(row.series_instance_uid.clone(), id);
            if !row.referenced_series_uid.is_empty() {
                pending_refs.push((id, row.referenced_series_uid.clone()));
            }
        }

        let mut children: Vec<Vec<NodeId>> = vec![Vec::new(); nodes.len()];
        let mut has_parent = vec![false; nodes.len()];
        for (child_id, referenced_uid) in pending_refs {
            if let Some(&parent_id) = index.get(&referenced_uid) {
                children[parent_id].push(child_id);
                has_parent[child_id] = true;
            }
        }

        let roots = nodes
            .iter()
            .enumerate()
            .filter(|(id, node)| match node.modality {
                Modality::CT | Modality::MR => true,
                Modality::PT => !has_parent[*id],
                _ => false,
            })
            .map(|(id, _)| id)
            .collect();

        Self { nodes, children, roots }
    }

    pub fn node(&self, id: NodeId) -> &SeriesNode {
        &self.nodes[id]
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// DFS from each root; every root-to-leaf path becomes one `Branch` of
    /// owned node snapshots (spec.md §4.6).
    pub fn branches(&self) -> Vec<Branch> {
        let mut branches = Vec::new();
        for &root in &self.roots {
            let mut path = Vec::new();
            self.dfs(root, &mut path, &mut branches);
        }
        branches
    }

    fn dfs(&self, node_id: NodeId, path: &mut Vec<NodeId>, branches: &mut Vec<Branch>) {
        path.push(node_id);
        let kids = &self.children[node_id];
        if kids.is_empty() {
            branches.push(Branch {
                nodes: path.iter().map(|&id| self.nodes[id].snapshot()).collect(),
            });
        } else {
            for &child in kids {
                self.dfs(child, path, branches);
            }
        }
        path.pop();
    }
}

/// The two non-reference grouping policies from spec.md §4.6: unordered sets,
/// no parent/child structure. `ReferencedSeriesUID` grouping is `Forest`
/// itself and isn't modeled here.
pub enum FlatGroupBy {
    StudyInstanceUID,
    PatientID,
}

pub fn group_nodes(rows: &[SlimRow], by: FlatGroupBy) -> Vec<Vec<SeriesNode>> {
    let mut groups: BTreeMap<String, Vec<SeriesNode>> = BTreeMap::new();
    let mut seen = HashSet::new();
    for row in rows {
        if !seen.insert(row.series_instance_uid.clone()) {
            continue;
        }
        let key = match by {
            FlatGroupBy::StudyInstanceUID => row.study_instance_uid.clone(),
            FlatGroupBy::PatientID => row.patient_id.clone(),
        };
        let modality: Modality = row.modality.parse().unwrap_or_default();
        groups.entry(key).or_default().push(SeriesNode {
            series_uid: row.series_instance_uid.clone(),
            modality,
            patient_id: row.patient_id.clone(),
            study_instance_uid: row.study_instance_uid.clone(),
        });
    }
    groups.into_values().collect()
}
