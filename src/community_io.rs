use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::info;

use crate::community::Community;
use crate::error::{OslomError, Result};
use crate::graph::NodeId;

/// Communities read back from a community list file.
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityRead<N: NodeId> {
    pub communities: Vec<Community<N>>,
    /// Communities dropped for being smaller than the requested minimum.
    pub filtered: usize,
}

/// Write one community per line, members separated by single spaces.
///
/// Members are sorted by their text form so the same collection always
/// produces the same file.
pub fn write_communities<N: NodeId>(path: impl AsRef<Path>, communities: &[Community<N>]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    for comm in communities {
        let mut members: Vec<String> = comm.iter().map(|node| node.to_string()).collect();
        members.sort();
        writeln!(writer, "{}", members.join(" ").trim())?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a community list written by [`write_communities`], dropping (and
/// counting) communities with fewer than `min_size` members.
pub fn read_communities<N: NodeId>(path: impl AsRef<Path>, min_size: usize) -> Result<CommunityRead<N>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut communities = Vec::new();
    let mut filtered = 0;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let mut comm = Community::new();
        for token in line.split_whitespace() {
            let node = token.parse::<N>().map_err(|_| {
                OslomError::parse(path, i + 1, format!("invalid node identifier '{}'", token))
            })?;
            comm.insert(node);
        }
        if comm.is_empty() {
            continue;
        }
        if comm.len() < min_size {
            filtered += 1;
        } else {
            communities.push(comm);
        }
    }
    info!(
        "Found {} communities, after filtering {} communities of size < {}",
        communities.len(),
        filtered,
        min_size
    );
    Ok(CommunityRead { communities, filtered })
}
