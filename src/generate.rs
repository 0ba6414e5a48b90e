use std::path::Path;

use csv::WriterBuilder;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{OslomError, Result};

/// Largest weight the generator hands out.
pub const MAX_WEIGHT: u32 = 20;

/// Write a random weighted edge list of `num_edges` lines over integer node
/// ids `1..=num_nodes`, with weights in `1..=MAX_WEIGHT` and no self loops.
/// The same seed always produces the same file.
pub fn generate_weighted_edgelist(
    path: impl AsRef<Path>,
    num_nodes: u32,
    num_edges: usize,
    seed: u64,
    sep: u8,
) -> Result<()> {
    if num_nodes < 2 {
        return Err(OslomError::InvalidConfig {
            message: format!("need at least 2 nodes to generate edges, got {}", num_nodes),
        });
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut writer = WriterBuilder::new()
        .delimiter(sep)
        .has_headers(false)
        .from_path(path)?;

    for _ in 0..num_edges {
        let a = rng.gen_range(1..=num_nodes);
        let mut b = rng.gen_range(1..=num_nodes);
        while b == a {
            b = rng.gen_range(1..=num_nodes);
        }
        let weight = rng.gen_range(1..=MAX_WEIGHT);
        writer.write_record([a.to_string(), b.to_string(), weight.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}
