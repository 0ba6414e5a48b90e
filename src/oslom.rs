//! Bridge to the OSLOM community finder (<http://www.oslom.org>).
//!
//! OSLOM only understands dense integer node ids and talks through files:
//! the graph goes in as an edge list and the modules come back in a
//! `<input>_oslo_files/tp` file written next to it. Every call gets its
//! own [`Workspace`] so those files never outlive the call.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use petgraph::EdgeType;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use crate::community::Community;
use crate::error::{OslomError, Result};
use crate::executor::{StderrPolicy, execute_in};
use crate::graph::{NodeId, WeightedGraph};

const UNDIRECTED_BINARY: &str = "oslom_undir";
const DIRECTED_BINARY: &str = "oslom_dir";
const INPUT_FILE: &str = "network.dat";
const RESULTS_SUFFIX: &str = "_oslo_files";
const MODULES_FILE: &str = "tp";
const MODULE_HEADER: &str = "#module";

/// Parameters for a single OSLOM run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OslomConfig {
    /// Directory holding the `oslom_undir` and `oslom_dir` executables.
    pub bin_dir: PathBuf,
    /// Pass `-w` and real-valued weights; otherwise `-uw` and rounded weights.
    pub weighted: bool,
    /// Controls community size, in (0, 1).
    pub resolution: f64,
    /// P-value threshold controlling the number of modules, in (0, 1).
    pub threshold: f64,
    /// Number of runs OSLOM performs; larger is slower.
    pub max_iterations: u32,
    pub seed: u64,
    /// Keep nodes that fit nowhere as single-node modules (`-all`).
    pub singlet: bool,
    pub stderr_policy: StderrPolicy,
}

impl Default for OslomConfig {
    fn default() -> Self {
        OslomConfig {
            bin_dir: PathBuf::from("bin"),
            weighted: false,
            resolution: 0.01,
            threshold: 0.1,
            max_iterations: 20,
            seed: 1000,
            singlet: true,
            stderr_policy: StderrPolicy::Fatal,
        }
    }
}

impl OslomConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml_file_over(path, &OslomConfig::default())
    }

    /// Read a YAML config where every key the file leaves out keeps its
    /// value from `base`.
    pub fn from_yaml_file_over(path: impl AsRef<Path>, base: &OslomConfig) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        if text.trim().is_empty() {
            return Ok(base.clone());
        }
        let mut merged = serde_yaml::to_value(base)?;
        match serde_yaml::from_str::<serde_yaml::Value>(&text)? {
            serde_yaml::Value::Null => {}
            serde_yaml::Value::Mapping(overrides) => {
                if let serde_yaml::Value::Mapping(fields) = &mut merged {
                    fields.extend(overrides);
                }
            }
            _ => {
                return Err(OslomError::InvalidConfig {
                    message: "config file must be a mapping of parameter names to values".to_string(),
                });
            }
        }
        Ok(serde_yaml::from_value(merged)?)
    }

    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: f64| {
            if value > 0.0 && value < 1.0 {
                Ok(())
            } else {
                Err(OslomError::InvalidConfig {
                    message: format!("{} must be in the interval (0, 1), got {}", name, value),
                })
            }
        };
        unit("resolution", self.resolution)?;
        unit("threshold", self.threshold)?;
        if self.max_iterations == 0 {
            return Err(OslomError::InvalidConfig {
                message: "max_iterations must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Dense 1-based numbering of a graph's nodes, and its inverse.
#[derive(Debug, Clone)]
pub struct NodeIndexMap<N: NodeId> {
    /// Index - 1 -> node
    nodes: Vec<N>,
    /// Node -> index
    indices: HashMap<N, usize>,
}

impl<N: NodeId> NodeIndexMap<N> {
    /// Number nodes in iteration order, starting at 1. Repeated nodes keep
    /// their first index.
    pub fn from_nodes(nodes: impl IntoIterator<Item = N>) -> Self {
        let mut map = NodeIndexMap {
            nodes: Vec::new(),
            indices: HashMap::new(),
        };
        for node in nodes {
            if !map.indices.contains_key(&node) {
                map.nodes.push(node.clone());
                map.indices.insert(node, map.nodes.len());
            }
        }
        map
    }

    pub fn index_of(&self, node: &N) -> Option<usize> {
        self.indices.get(node).copied()
    }

    pub fn node_of(&self, index: usize) -> Option<&N> {
        index.checked_sub(1).and_then(|slot| self.nodes.get(slot))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over `(index, node)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &N)> + '_ {
        self.nodes.iter().enumerate().map(|(slot, node)| (slot + 1, node))
    }
}

/// Scratch directory owned by one OSLOM call. Removed when dropped.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    input: PathBuf,
}

impl Workspace {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("oslom-").tempdir()?;
        let input = dir.path().join(INPUT_FILE);
        Ok(Workspace { dir, input })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The edge list handed to OSLOM with `-f`.
    pub fn input_path(&self) -> &Path {
        &self.input
    }

    /// The directory OSLOM creates next to its input.
    pub fn results_dir(&self) -> PathBuf {
        let mut name = OsString::from(self.input.as_os_str());
        name.push(RESULTS_SUFFIX);
        PathBuf::from(name)
    }

    pub fn modules_path(&self) -> PathBuf {
        self.results_dir().join(MODULES_FILE)
    }

    /// Remove the workspace now, reporting any failure.
    pub fn close(self) -> Result<()> {
        self.dir.close()?;
        Ok(())
    }

    /// Remove the workspace now, logging a failure instead of returning it.
    pub fn release(self) {
        let path = self.path().to_path_buf();
        if let Err(err) = self.close() {
            warn!("Failed to remove OSLOM workspace {}: {}", path.display(), err);
        }
    }
}

/// Runs OSLOM over in-memory graphs.
#[derive(Debug, Clone, Default)]
pub struct Oslom {
    config: OslomConfig,
}

impl Oslom {
    pub fn new(config: OslomConfig) -> Self {
        Oslom { config }
    }

    pub fn config(&self) -> &OslomConfig {
        &self.config
    }

    /// Detect communities in `graph`. Any failure along the way (writing
    /// the input, running the tool, reading its output) yields an error and
    /// no communities.
    pub fn find_communities<N: NodeId, Ty: EdgeType>(
        &self,
        graph: &WeightedGraph<N, Ty>,
    ) -> Result<Vec<Community<N>>> {
        self.config.validate()?;
        let node_map = NodeIndexMap::from_nodes(graph.nodes().cloned());
        let workspace = Workspace::new()?;

        info!("Writing OSLOM graph to {} ...", workspace.input_path().display());
        self.write_input(graph, &node_map, workspace.input_path())?;

        let (program, args) = self.command_line(workspace.input_path(), graph.is_directed())?;
        let output = execute_in(workspace.path(), &program, &args)?;
        debug!("OSLOM output:\n{}", output.combined());
        if let Err(err) = output.check(self.config.stderr_policy) {
            error!("Failed to run OSLOM");
            return Err(err);
        }

        let communities = read_results(&workspace, &node_map)?;
        workspace.release();
        Ok(communities)
    }

    /// Program path and arguments for running OSLOM on `input`.
    pub fn command_line(&self, input: &Path, directed: bool) -> Result<(PathBuf, Vec<String>)> {
        let binary = if directed { DIRECTED_BINARY } else { UNDIRECTED_BINARY };
        let program = std::path::absolute(self.config.bin_dir.join(binary))?;

        let mut args = vec!["-f".to_string(), input.display().to_string()];
        args.push(if self.config.weighted { "-w" } else { "-uw" }.to_string());
        args.extend([
            "-seed".to_string(),
            self.config.seed.to_string(),
            "-cp".to_string(),
            format!("{:.6}", self.config.resolution),
            "-r".to_string(),
            self.config.max_iterations.to_string(),
            "-t".to_string(),
            format!("{:.6}", self.config.threshold),
        ]);
        if self.config.singlet {
            args.push("-all".to_string());
        }
        Ok((program, args))
    }

    /// Write `graph` in OSLOM's edge list format.
    ///
    /// Unweighted runs still carry a weight column, rounded to a whole
    /// number; OSLOM is handed `-uw` and ignores it.
    pub fn write_input<N: NodeId, Ty: EdgeType>(
        &self,
        graph: &WeightedGraph<N, Ty>,
        node_map: &NodeIndexMap<N>,
        path: &Path,
    ) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for (a, b, weight) in graph.edges() {
            let a = index_in(node_map, a)?;
            let b = index_in(node_map, b)?;
            if self.config.weighted {
                writeln!(writer, "{} {} {:.6} 1", a, b, weight)?;
            } else {
                writeln!(writer, "{} {} {:.0}", a, b, weight)?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

fn index_in<N: NodeId>(node_map: &NodeIndexMap<N>, node: &N) -> Result<usize> {
    node_map.index_of(node).ok_or_else(|| OslomError::InvalidConfig {
        message: format!("node {} has no OSLOM index", node),
    })
}

fn read_results<N: NodeId>(workspace: &Workspace, node_map: &NodeIndexMap<N>) -> Result<Vec<Community<N>>> {
    let results_dir = workspace.results_dir();
    if !results_dir.is_dir() {
        error!("No output files found: {}", results_dir.display());
        return Err(OslomError::MissingOutput { path: results_dir });
    }
    let modules_path = workspace.modules_path();
    if !modules_path.is_file() {
        error!("No community file found: {}", modules_path.display());
        return Err(OslomError::MissingOutput { path: modules_path });
    }
    info!("Reading output from {} ...", modules_path.display());
    parse_modules(&modules_path, node_map)
}

/// Parse an OSLOM `tp` file: each `#module ...` header is followed by one
/// line of member indices, which are mapped back through `node_map`.
pub fn parse_modules<N: NodeId>(path: &Path, node_map: &NodeIndexMap<N>) -> Result<Vec<Community<N>>> {
    let reader = BufReader::new(File::open(path)?);
    let mut communities = Vec::new();
    let mut current: Option<Community<N>> = None;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        if parts[0] == MODULE_HEADER {
            if parts.len() > 1 {
                current = Some(Community::new());
            }
        } else if let Some(mut comm) = current.take() {
            for part in parts {
                let index = part.parse::<usize>().map_err(|_| {
                    OslomError::parse(path, i + 1, format!("invalid node index '{}'", part))
                })?;
                let node = node_map.node_of(index).ok_or(OslomError::IndexLookup { index })?;
                comm.insert(node.clone());
            }
            communities.push(comm);
        }
    }
    Ok(communities)
}
