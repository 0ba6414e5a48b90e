//! Pure helpers over a collection of communities.
//!
//! A community is a plain set of node identifiers. Collections are ordered
//! only by the order the detection run reported them in.

use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::EdgeType;

use crate::graph::{NodeId, WeightedGraph};

pub type Community<N> = HashSet<N>;

/// Label given to a node by [`membership_map`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommunityLabel {
    /// Member of exactly one community, 1-based position in the collection.
    Single(usize),
    /// Member of two or more communities.
    Multi,
}

impl fmt::Display for CommunityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommunityLabel::Single(index) => write!(f, "C{:02}", index),
            CommunityLabel::Multi => write!(f, "Multi"),
        }
    }
}

/// Keep only the communities with at least `min_size` members, in their
/// original order.
pub fn filter_by_min_size<N: NodeId>(communities: &[Community<N>], min_size: usize) -> Vec<Community<N>> {
    communities
        .iter()
        .filter(|comm| comm.len() >= min_size)
        .cloned()
        .collect()
}

/// Map each assigned node to the community it belongs to, or to
/// [`CommunityLabel::Multi`] if it belongs to several. Unassigned nodes are
/// left out. Every member is labelled, whether or not `_graph` contains it.
pub fn membership_map<N: NodeId, Ty: EdgeType>(
    _graph: &WeightedGraph<N, Ty>,
    communities: &[Community<N>],
) -> HashMap<N, CommunityLabel> {
    let mut cmap = HashMap::new();
    for (i, comm) in communities.iter().enumerate() {
        for node in comm {
            cmap.entry(node.clone())
                .and_modify(|label| *label = CommunityLabel::Multi)
                .or_insert(CommunityLabel::Single(i + 1));
        }
    }
    cmap
}

pub fn sizes<N>(communities: &[Community<N>]) -> Vec<usize> {
    communities.iter().map(|comm| comm.len()).collect()
}

/// Union of every community's members.
pub fn assigned_nodes<N: NodeId>(communities: &[Community<N>]) -> HashSet<N> {
    communities.iter().flatten().cloned().collect()
}

pub fn assigned_count<N: NodeId>(communities: &[Community<N>]) -> usize {
    communities.iter().flatten().collect::<HashSet<&N>>().len()
}

/// Fraction of `total_nodes` that belong to at least one community.
pub fn coverage<N: NodeId>(communities: &[Community<N>], total_nodes: usize) -> f64 {
    if total_nodes == 0 {
        return 0.0;
    }
    assigned_count(communities) as f64 / total_nodes as f64
}

/// Communities paired with their size, largest first. Equal sizes keep
/// their discovery order.
pub fn sort_by_size_desc<N>(communities: &[Community<N>]) -> Vec<(&Community<N>, usize)> {
    let mut sorted: Vec<_> = communities.iter().map(|comm| (comm, comm.len())).collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    sorted
}
