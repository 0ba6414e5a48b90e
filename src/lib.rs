//! Run the OSLOM community finder over weighted networks and work with the
//! overlapping communities it reports.

pub mod community;
pub mod community_io;
pub mod error;
pub mod executor;
pub mod generate;
pub mod graph;
pub mod logger;
pub mod oslom;
pub mod render;

pub use community::{
    Community, CommunityLabel, assigned_count, assigned_nodes, coverage, filter_by_min_size,
    membership_map, sizes, sort_by_size_desc,
};
pub use community_io::{CommunityRead, read_communities, write_communities};
pub use error::{OslomError, Result};
pub use executor::{ExecOutput, StderrPolicy, execute, execute_in};
pub use graph::{
    DEFAULT_WEIGHT, DirectedWeightedGraph, NodeId, WeightedGraph, gexf_is_directed, read_edgelist,
    read_weighted_edgelist,
};
pub use oslom::{NodeIndexMap, Oslom, OslomConfig, Workspace};
