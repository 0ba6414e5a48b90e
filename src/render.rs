use std::collections::HashMap;
use std::path::Path;

use petgraph::EdgeType;
use petgraph::dot::{Config, Dot};
use petgraph::graph::EdgeReference;

use crate::community::{Community, CommunityLabel, membership_map};
use crate::error::Result;
use crate::graph::{NodeId, WeightedGraph};

/// Render `graph` in Graphviz DOT, filling each node with a color for its
/// community. Nodes in several communities are grey, unassigned nodes are
/// left unfilled.
pub fn to_dot<N: NodeId, Ty: EdgeType>(graph: &WeightedGraph<N, Ty>, communities: &[Community<N>]) -> String {
    let cmap = membership_map(graph, communities);
    let node_attrs = |_, (_, node)| node_attributes(&cmap, node);
    let edge_attrs = |_, edge| edge_attributes(edge);
    let dot = Dot::with_attr_getters(
        graph.inner(),
        &[Config::NodeNoLabel, Config::EdgeNoLabel],
        &edge_attrs,
        &node_attrs,
    );
    format!("{}", dot)
}

pub fn write_dot<N: NodeId, Ty: EdgeType>(
    path: impl AsRef<Path>,
    graph: &WeightedGraph<N, Ty>,
    communities: &[Community<N>],
) -> Result<()> {
    std::fs::write(path, to_dot(graph, communities))?;
    Ok(())
}

fn node_attributes<N: NodeId>(cmap: &HashMap<N, CommunityLabel>, node: &N) -> String {
    let label = escape(&node.to_string());
    match cmap.get(node) {
        Some(CommunityLabel::Single(index)) => {
            let hue = ((index - 1) * 47 % 360) as f64 / 360.0;
            format!(
                "label=\"{}\", tooltip=\"{}\", style=filled, fillcolor=\"{:.3} 0.5 0.9\"",
                label,
                CommunityLabel::Single(*index),
                hue
            )
        }
        Some(CommunityLabel::Multi) => format!(
            "label=\"{}\", tooltip=\"Multi\", style=filled, fillcolor=\"lightgrey\"",
            label
        ),
        None => format!("label=\"{}\"", label),
    }
}

fn edge_attributes(edge: EdgeReference<'_, f64>) -> String {
    format!("label=\"{}\"", edge.weight())
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
