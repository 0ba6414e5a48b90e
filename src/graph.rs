use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, EdgeType, Undirected};
use roxmltree::{Document, Node as XmlNode};

use crate::error::{OslomError, Result};

/// Weight given to edges read from a file without a weight column.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Anything usable as a node identifier: hashable, printable and parsable
/// back from the text formats this crate reads and writes.
pub trait NodeId: Clone + Eq + Hash + Display + FromStr {}

impl<T: Clone + Eq + Hash + Display + FromStr> NodeId for T {}

/// A weighted graph keyed by node identifier.
///
/// Nodes are kept in first-seen order, which is also the order
/// [`WeightedGraph::nodes`] yields them in.
#[derive(Debug, Clone)]
pub struct WeightedGraph<N, Ty: EdgeType = Undirected> {
    graph: Graph<N, f64, Ty>,
    node_indices: HashMap<N, NodeIndex>,
}

pub type DirectedWeightedGraph<N> = WeightedGraph<N, Directed>;

impl<N: NodeId, Ty: EdgeType> Default for WeightedGraph<N, Ty> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeId, Ty: EdgeType> WeightedGraph<N, Ty> {
    pub fn new() -> Self {
        WeightedGraph {
            graph: Graph::default(),
            node_indices: HashMap::new(),
        }
    }

    /// Build a graph from `(a, b, weight)` triples.
    pub fn from_edges(edges: impl IntoIterator<Item = (N, N, f64)>) -> Self {
        let mut graph = Self::new();
        for (a, b, weight) in edges {
            graph.add_edge(a, b, weight);
        }
        graph
    }

    pub fn add_node(&mut self, node: N) -> NodeIndex {
        if let Some(&index) = self.node_indices.get(&node) {
            return index;
        }
        let index = self.graph.add_node(node.clone());
        self.node_indices.insert(node, index);
        index
    }

    /// Add an edge, inserting missing endpoints. A second edge between the
    /// same pair replaces the weight of the first.
    pub fn add_edge(&mut self, a: N, b: N, weight: f64) {
        let a = self.add_node(a);
        let b = self.add_node(b);
        if let Some(edge) = self.graph.find_edge(a, b) {
            self.graph[edge] = weight;
        } else {
            self.graph.add_edge(a, b, weight);
        }
    }

    pub fn contains_node(&self, node: &N) -> bool {
        self.node_indices.contains_key(node)
    }

    /// Weight of the edge between `a` and `b`, if any.
    pub fn weight(&self, a: &N, b: &N) -> Option<f64> {
        let a = *self.node_indices.get(a)?;
        let b = *self.node_indices.get(b)?;
        self.graph.find_edge(a, b).map(|edge| self.graph[edge])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_directed(&self) -> bool {
        self.graph.is_directed()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.graph.node_indices().map(move |index| &self.graph[index])
    }

    pub fn edges(&self) -> impl Iterator<Item = (&N, &N, f64)> + '_ {
        self.graph.edge_references().map(move |edge| {
            (
                &self.graph[edge.source()],
                &self.graph[edge.target()],
                *edge.weight(),
            )
        })
    }

    /// The underlying petgraph structure.
    pub fn inner(&self) -> &Graph<N, f64, Ty> {
        &self.graph
    }

    /// Read a `node_a<sep>node_b<sep>weight` edge list.
    pub fn from_weighted_edgelist(path: impl AsRef<Path>, sep: u8) -> Result<Self> {
        Self::from_edgelist_file(path.as_ref(), sep, true)
    }

    /// Read a `node_a<sep>node_b` edge list, giving each edge [`DEFAULT_WEIGHT`].
    pub fn from_unweighted_edgelist(path: impl AsRef<Path>, sep: u8) -> Result<Self> {
        Self::from_edgelist_file(path.as_ref(), sep, false)
    }

    fn from_edgelist_file(path: &Path, sep: u8, weighted: bool) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(sep)
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(Trim::All)
            .from_path(path)
            .map_err(|err| match err.into_kind() {
                csv::ErrorKind::Io(io) => OslomError::Io(io),
                kind => OslomError::parse(path, 0, format!("{:?}", kind)),
            })?;

        let min_fields = if weighted { 3 } else { 2 };
        let mut graph = Self::new();
        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            let line = record.position().map_or(0, |pos| pos.line() as usize);
            let fields: Vec<&str> = record.iter().filter(|field| !field.is_empty()).collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() < min_fields {
                return Err(OslomError::parse(
                    path,
                    line,
                    format!("expected at least {} fields, found {}", min_fields, fields.len()),
                ));
            }
            let a = parse_node(path, line, fields[0])?;
            let b = parse_node(path, line, fields[1])?;
            let weight = if weighted {
                fields[2].parse::<f64>().map_err(|_| {
                    OslomError::parse(path, line, format!("invalid weight '{}'", fields[2]))
                })?
            } else {
                DEFAULT_WEIGHT
            };
            graph.add_edge(a, b, weight);
        }
        debug!(
            "Loaded {} nodes, {} edges from {}",
            graph.node_count(),
            graph.edge_count(),
            path.display()
        );
        Ok(graph)
    }

    /// Read a GEXF file. Every `<node id>` becomes a node and every
    /// `<edge source target weight>` an edge; edges without a `weight`
    /// get [`DEFAULT_WEIGHT`]. Direction follows `Ty`, see
    /// [`gexf_is_directed`] for what the file itself declares.
    pub fn from_gexf(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let doc = Document::parse(&text)?;

        let mut graph = Self::new();
        for element in doc.descendants().filter(|node| node.is_element()) {
            let line = doc.text_pos_at(element.range().start).row as usize;
            match element.tag_name().name() {
                "node" => {
                    let id = gexf_attribute(path, line, element, "id")?;
                    graph.add_node(parse_node(path, line, id)?);
                }
                "edge" => {
                    let a = parse_node(path, line, gexf_attribute(path, line, element, "source")?)?;
                    let b = parse_node(path, line, gexf_attribute(path, line, element, "target")?)?;
                    let weight = match element.attribute("weight") {
                        Some(text) => text.trim().parse::<f64>().map_err(|_| {
                            OslomError::parse(path, line, format!("invalid weight '{}'", text))
                        })?,
                        None => DEFAULT_WEIGHT,
                    };
                    graph.add_edge(a, b, weight);
                }
                _ => {}
            }
        }
        debug!(
            "Loaded {} nodes, {} edges from {}",
            graph.node_count(),
            graph.edge_count(),
            path.display()
        );
        Ok(graph)
    }
}

/// Whether a GEXF file declares `defaultedgetype="directed"` on its
/// `<graph>` element. Anything else, including no declaration, is undirected.
pub fn gexf_is_directed(path: impl AsRef<Path>) -> Result<bool> {
    let text = std::fs::read_to_string(path)?;
    let doc = Document::parse(&text)?;
    let edge_type = doc
        .descendants()
        .find(|node| node.is_element() && node.tag_name().name() == "graph")
        .and_then(|graph| graph.attribute("defaultedgetype"));
    Ok(edge_type == Some("directed"))
}

fn gexf_attribute<'a>(path: &Path, line: usize, element: XmlNode<'a, '_>, name: &str) -> Result<&'a str> {
    element.attribute(name).ok_or_else(|| {
        OslomError::parse(
            path,
            line,
            format!("<{}> without '{}' attribute", element.tag_name().name(), name),
        )
    })
}

fn parse_node<N: FromStr>(path: &Path, line: usize, token: &str) -> Result<N> {
    token
        .parse::<N>()
        .map_err(|_| OslomError::parse(path, line, format!("invalid node identifier '{}'", token)))
}

/// Read an undirected weighted edge list, one `node_a<sep>node_b<sep>weight`
/// per line.
pub fn read_weighted_edgelist<N: NodeId>(path: impl AsRef<Path>, sep: u8) -> Result<WeightedGraph<N>> {
    WeightedGraph::from_weighted_edgelist(path, sep)
}

/// Read an undirected edge list without weights.
pub fn read_edgelist<N: NodeId>(path: impl AsRef<Path>, sep: u8) -> Result<WeightedGraph<N>> {
    WeightedGraph::from_unweighted_edgelist(path, sep)
}
