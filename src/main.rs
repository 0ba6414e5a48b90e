use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;
use petgraph::{Directed, EdgeType, Undirected};

use oslom_runner::logger::init_logger;
use oslom_runner::render::write_dot;
use oslom_runner::{
    Oslom, OslomConfig, StderrPolicy, WeightedGraph, assigned_count, coverage, filter_by_min_size,
    gexf_is_directed, sizes, write_communities,
};

#[derive(Parser, Debug)]
#[command(name = "oslom-runner")]
#[command(about = "Find overlapping communities in a weighted network with OSLOM", long_about = None)]
struct Cli {
    /// Edge list with one `node_a node_b weight` per line, or a `.gexf` graph file
    network_file: PathBuf,

    /// Initial random seed
    #[arg(long)]
    seed: Option<u64>,

    /// OSLOM resolution parameter, controls community size. Must be in the interval (0, 1)
    #[arg(short = 'r', long)]
    resolution: Option<f64>,

    /// OSLOM threshold parameter, controls number of modules
    #[arg(short = 't', long)]
    threshold: Option<f64>,

    /// Maximum number of OSLOM iterations, a larger value is slower
    #[arg(short = 'i', long = "iters")]
    max_iterations: Option<u32>,

    /// Path of directory containing OSLOM binary files
    #[arg(long = "dir")]
    bin_dir: Option<PathBuf>,

    /// Minimum community size, communities below this size are filtered
    #[arg(short = 'm', long = "minsize", default_value_t = 2)]
    min_size: usize,

    /// Community list output file path
    #[arg(short = 'o')]
    out_path: Option<PathBuf>,

    /// Field separator used in the network file
    #[arg(long, default_value_t = ' ')]
    sep: char,

    /// Network file has no weight column; run OSLOM in unweighted mode
    #[arg(long)]
    unweighted: bool,

    /// Treat edges as directed and run `oslom_dir` (implied by a directed GEXF file)
    #[arg(long)]
    directed: bool,

    /// Do not keep leftover nodes as single-node modules
    #[arg(long)]
    no_singlets: bool,

    /// Only fail on a non-zero exit status, not on OSLOM's stderr output
    #[arg(long)]
    lenient_stderr: bool,

    /// YAML file with OSLOM parameters; keys it omits keep the command line
    /// defaults (weighted, resolution 0.1) and flags given explicitly win
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write the network as Graphviz DOT, colored by community
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Timestamped, debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn oslom_config(&self) -> Result<OslomConfig> {
        let mut config = match &self.config {
            Some(path) => OslomConfig::from_yaml_file_over(path, &driver_defaults())
                .with_context(|| format!("reading config {}", path.display()))?,
            None => driver_defaults(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(resolution) = self.resolution {
            config.resolution = resolution;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(bin_dir) = &self.bin_dir {
            config.bin_dir = bin_dir.clone();
        }
        if self.unweighted {
            config.weighted = false;
        }
        if self.no_singlets {
            config.singlet = false;
        }
        if self.lenient_stderr {
            config.stderr_policy = StderrPolicy::Ignore;
        }
        config.validate()?;
        Ok(config)
    }

    fn separator(&self) -> Result<u8> {
        if !self.sep.is_ascii() {
            bail!("separator must be a single ASCII character, got {:?}", self.sep);
        }
        Ok(self.sep as u8)
    }

    fn is_gexf(&self) -> bool {
        has_gexf_extension(&self.network_file)
    }
}

/// Networks are weighted unless told otherwise.
fn driver_defaults() -> OslomConfig {
    OslomConfig {
        weighted: true,
        resolution: 0.1,
        ..OslomConfig::default()
    }
}

fn has_gexf_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gexf"))
}

fn run<Ty: EdgeType>(cli: &Cli, config: OslomConfig) -> Result<()> {
    let sep = cli.separator()?;

    info!("Reading network from {} ...", cli.network_file.display());
    let loaded = if cli.is_gexf() {
        WeightedGraph::<String, Ty>::from_gexf(&cli.network_file)
    } else if cli.unweighted {
        WeightedGraph::<String, Ty>::from_unweighted_edgelist(&cli.network_file, sep)
    } else {
        WeightedGraph::<String, Ty>::from_weighted_edgelist(&cli.network_file, sep)
    };
    let graph = loaded.with_context(|| format!("reading network {}", cli.network_file.display()))?;
    info!(
        "Network has {} nodes, {} edges - directed={}",
        graph.node_count(),
        graph.edge_count(),
        graph.is_directed()
    );

    info!(
        "Running OSLOM on network (seed={}, weighted={}, resolution={:.3}, threshold={:.3}) ...",
        config.seed, config.weighted, config.resolution, config.threshold
    );
    let algorithm = Oslom::new(config);
    let mut communities = algorithm
        .find_communities(&graph)
        .context("Failed to run OSLOM")?;
    info!(
        "Algorithm found {} communities. Sizes = {:?}",
        communities.len(),
        sizes(&communities)
    );

    if cli.min_size > 1 {
        communities = filter_by_min_size(&communities, cli.min_size);
        info!(
            "After filtering communities of size < {}, {} communities remain. Sizes = {:?}",
            cli.min_size,
            communities.len(),
            sizes(&communities)
        );
    }
    info!(
        "Communities cover {}/{} nodes ({:.1}%)",
        assigned_count(&communities),
        graph.node_count(),
        100.0 * coverage(&communities, graph.node_count())
    );

    if let Some(out_path) = &cli.out_path {
        info!("Writing {} communities to {}", communities.len(), out_path.display());
        write_communities(out_path, &communities)
            .with_context(|| format!("writing {}", out_path.display()))?;
    }
    if let Some(dot_path) = &cli.dot {
        info!("Writing DOT rendering to {}", dot_path.display());
        write_dot(dot_path, &graph, &communities)
            .with_context(|| format!("writing {}", dot_path.display()))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let config = cli.oslom_config()?;
    let directed = cli.directed
        || (cli.is_gexf()
            && gexf_is_directed(&cli.network_file)
                .with_context(|| format!("reading network {}", cli.network_file.display()))?);
    if directed {
        run::<Directed>(&cli, config)
    } else {
        run::<Undirected>(&cli, config)
    }
}
