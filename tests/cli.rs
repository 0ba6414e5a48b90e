#![cfg(unix)]

mod common;

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use common::{TWO_MODULES, fake_oslom, recorded_args, recorded_input};
use oslom_runner::generate::generate_weighted_edgelist;
use oslom_runner::{WeightedGraph, read_weighted_edgelist};

fn oslom_runner() -> Command {
    let mut cmd = Command::cargo_bin("oslom-runner").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_network(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("network.txt");
    fs::write(&path, "alice bob 1.0\nbob carol 2.0\ncarol dave 1.0\ndave erin 3.0\n").unwrap();
    path
}

#[test]
fn test_missing_network_file_is_usage_error() {
    let output = oslom_runner().output().unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn test_run_writes_filtered_communities() {
    let dir = tempfile::tempdir().unwrap();
    let bin_dir = dir.path().join("bin");
    fake_oslom(
        &bin_dir,
        "oslom_undir",
        Some("#module 0 size: 3\n1 2 3\n#module 1 size: 1\n5\n#module 2 size: 2\n4 5\n"),
        "",
    );
    let network = write_network(dir.path());
    let out = dir.path().join("communities.txt");

    let output = oslom_runner()
        .arg(&network)
        .arg("--dir")
        .arg(&bin_dir)
        .args(["--seed", "7", "-r", "0.2", "-t", "0.3", "-i", "4", "-m", "2", "-o"])
        .arg(&out)
        .output()
        .unwrap();

    let log = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "{log}");
    assert!(log.contains("Network has 5 nodes, 4 edges - directed=false"));
    assert!(log.contains("Algorithm found 3 communities. Sizes = [3, 1, 2]"));
    assert!(log.contains("After filtering communities of size < 2, 2 communities remain. Sizes = [3, 2]"));
    assert!(log.contains("Communities cover 5/5 nodes"));
    assert_eq!(fs::read_to_string(&out).unwrap(), "alice bob carol\ndave erin\n");

    let args = recorded_args(&bin_dir);
    assert_eq!(
        &args[2..],
        &["-w", "-seed", "7", "-cp", "0.200000", "-r", "4", "-t", "0.300000", "-all"]
    );
}

#[test]
fn test_tool_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let bin_dir = dir.path().join("bin");
    fake_oslom(&bin_dir, "oslom_undir", Some(TWO_MODULES), "echo 'segfault imminent' 1>&2");
    let network = write_network(dir.path());
    let out = dir.path().join("communities.txt");

    let output = oslom_runner()
        .arg(&network)
        .arg("--dir")
        .arg(&bin_dir)
        .arg("-o")
        .arg(&out)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to run OSLOM"));
    assert!(!out.exists());
}

#[test]
fn test_config_file_and_dot_output() {
    let dir = tempfile::tempdir().unwrap();
    let bin_dir = dir.path().join("bin");
    fake_oslom(&bin_dir, "oslom_undir", Some(TWO_MODULES), "");
    let network = dir.path().join("network.csv");
    fs::write(&network, "1,2,1\n2,3,1\n").unwrap();
    let config = dir.path().join("oslom.yaml");
    fs::write(
        &config,
        format!("bin_dir: {}\nseed: 5\nthreshold: 0.5\nsinglet: false\n", bin_dir.display()),
    )
    .unwrap();
    let dot = dir.path().join("network.dot");

    let output = oslom_runner()
        .arg(&network)
        .args(["--sep", ",", "--seed", "11", "-m", "1", "--config"])
        .arg(&config)
        .arg("--dot")
        .arg(&dot)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let args = recorded_args(&bin_dir);
    assert_eq!(&args[2..], &["-w", "-seed", "11", "-cp", "0.100000", "-r", "20", "-t", "0.500000"]);
    let rendered = fs::read_to_string(&dot).unwrap();
    assert!(rendered.contains("tooltip=\"Multi\""));
}

#[test]
fn test_config_file_can_switch_to_unweighted() {
    let dir = tempfile::tempdir().unwrap();
    let bin_dir = dir.path().join("bin");
    fake_oslom(&bin_dir, "oslom_undir", Some(TWO_MODULES), "");
    let network = write_network(dir.path());
    let config = dir.path().join("oslom.yaml");
    fs::write(&config, "weighted: false\nresolution: 0.05\n").unwrap();

    let output = oslom_runner()
        .arg(&network)
        .arg("--dir")
        .arg(&bin_dir)
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let args = recorded_args(&bin_dir);
    assert_eq!(args[2], "-uw");
    assert_eq!(&args[5..7], &["-cp", "0.050000"]);
}

#[test]
fn test_generated_network() {
    let dir = tempfile::tempdir().unwrap();
    let bin_dir = dir.path().join("bin");
    fake_oslom(&bin_dir, "oslom_undir", Some(TWO_MODULES), "");
    let network = dir.path().join("network.csv");
    generate_weighted_edgelist(&network, 30, 80, 11, b',').unwrap();
    let graph: WeightedGraph<String> = read_weighted_edgelist(&network, b',').unwrap();
    let out = dir.path().join("communities.txt");

    let output = oslom_runner()
        .arg(&network)
        .arg("--dir")
        .arg(&bin_dir)
        .args(["--sep", ",", "-m", "1", "-o"])
        .arg(&out)
        .output()
        .unwrap();

    let log = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "{log}");
    assert!(log.contains(&format!(
        "Network has {} nodes, {} edges - directed=false",
        graph.node_count(),
        graph.edge_count()
    )));
    assert!(log.contains("Algorithm found 2 communities. Sizes = [2, 2]"));
    assert_eq!(recorded_input(&bin_dir).lines().count(), graph.edge_count());

    let nodes: Vec<&String> = graph.nodes().collect();
    let line = |a: &String, b: &String| {
        let mut pair = [a.as_str(), b.as_str()];
        pair.sort();
        pair.join(" ")
    };
    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        format!("{}\n{}\n", line(nodes[0], nodes[1]), line(nodes[1], nodes[2]))
    );
}

#[test]
fn test_directed_flag_runs_directed_binary() {
    let dir = tempfile::tempdir().unwrap();
    let bin_dir = dir.path().join("bin");
    fake_oslom(&bin_dir, "oslom_dir", Some(TWO_MODULES), "");
    let network = write_network(dir.path());

    let output = oslom_runner()
        .arg(&network)
        .arg("--dir")
        .arg(&bin_dir)
        .arg("--directed")
        .output()
        .unwrap();

    let log = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "{log}");
    assert!(log.contains("Network has 5 nodes, 4 edges - directed=true"));
    assert_eq!(
        recorded_input(&bin_dir),
        "1 2 1.000000 1\n2 3 2.000000 1\n3 4 1.000000 1\n4 5 3.000000 1\n"
    );
}

#[test]
fn test_unweighted_flag_reads_two_columns() {
    let dir = tempfile::tempdir().unwrap();
    let bin_dir = dir.path().join("bin");
    fake_oslom(&bin_dir, "oslom_undir", Some(TWO_MODULES), "");
    let network = dir.path().join("network.txt");
    fs::write(&network, "alice bob\nbob carol\n").unwrap();

    let output = oslom_runner()
        .arg(&network)
        .arg("--dir")
        .arg(&bin_dir)
        .arg("--unweighted")
        .output()
        .unwrap();

    let log = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "{log}");
    assert!(log.contains("weighted=false"));
    assert_eq!(recorded_args(&bin_dir)[2], "-uw");
    assert_eq!(recorded_input(&bin_dir), "1 2 1\n2 3 1\n");
}

#[test]
fn test_lenient_stderr_accepts_tool_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let bin_dir = dir.path().join("bin");
    fake_oslom(&bin_dir, "oslom_undir", Some(TWO_MODULES), "echo 'warning: slow convergence' 1>&2");
    let network = write_network(dir.path());
    let out = dir.path().join("communities.txt");

    let output = oslom_runner()
        .arg(&network)
        .arg("--dir")
        .arg(&bin_dir)
        .arg("--lenient-stderr")
        .arg("-o")
        .arg(&out)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(fs::read_to_string(&out).unwrap(), "alice bob\nbob carol\n");
}

#[test]
fn test_directed_gexf_network() {
    let dir = tempfile::tempdir().unwrap();
    let bin_dir = dir.path().join("bin");
    fake_oslom(&bin_dir, "oslom_dir", Some(TWO_MODULES), "");
    let network = dir.path().join("network.gexf");
    fs::write(
        &network,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<gexf xmlns="http://www.gexf.net/1.2draft" version="1.2">
  <graph mode="static" defaultedgetype="directed">
    <nodes>
      <node id="alice" label="Alice"/>
      <node id="bob" label="Bob"/>
      <node id="carol" label="Carol"/>
    </nodes>
    <edges>
      <edge id="0" source="alice" target="bob" weight="2"/>
      <edge id="1" source="bob" target="carol" weight="0.5"/>
    </edges>
  </graph>
</gexf>
"#,
    )
    .unwrap();
    let out = dir.path().join("communities.txt");

    let output = oslom_runner()
        .arg(&network)
        .arg("--dir")
        .arg(&bin_dir)
        .arg("-o")
        .arg(&out)
        .output()
        .unwrap();

    let log = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "{log}");
    assert!(log.contains("Network has 3 nodes, 2 edges - directed=true"));
    assert_eq!(recorded_input(&bin_dir), "1 2 2.000000 1\n2 3 0.500000 1\n");
    assert_eq!(fs::read_to_string(&out).unwrap(), "alice bob\nbob carol\n");
}

#[test]
fn test_malformed_network_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let network = dir.path().join("network.txt");
    fs::write(&network, "a b 1.0\nc d\n").unwrap();

    let output = oslom_runner().arg(&network).output().unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("expected at least 3 fields"));
}
