use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use galaxy_engine::data::write_board_to_file;
use galaxy_engine::generation::{generate_with_config, GenerationConfig};
use galaxy_engine::graph::pathfinder::{count_hostiles, path_distance, shortest_path};
use log::info;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct BoardMetadata {
    seed: u64,
    nodes: usize,
    edges: usize,
    hostile_nodes: usize,
    speed_upgrades: usize,
    earth: String,
    target: String,
    shortest_route_home: u64,
    shortest_route_hostiles: usize,
    min_edge_length: u32,
    max_edge_length: u32,
    generated_at_epoch: u64,
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args
        .next()
        .ok_or_else(|| anyhow!("usage: export_board <seed> [output_dir]"))?
        .parse()
        .context("seed must be an unsigned integer")?;
    let output_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("data"));

    let config = match std::env::var("GALAXY_CONFIG") {
        Ok(path) => GenerationConfig::from_path(&path)
            .with_context(|| format!("failed to load generation config from {path}"))?,
        Err(_) => GenerationConfig::default(),
    };

    let board = generate_with_config(seed, &config)
        .with_context(|| format!("failed to generate board for seed {seed}"))?;

    fs::create_dir_all(&output_dir).context("failed to create board output directory")?;
    let board_path = output_dir.join(format!("board-{seed}.bin"));
    write_board_to_file(&board, &board_path)
        .with_context(|| format!("failed to write board to {}", board_path.display()))?;

    let route = shortest_path(&board, board.target_id(), board.earth_id());
    let metadata = BoardMetadata {
        seed,
        nodes: board.node_count(),
        edges: board.edge_count(),
        hostile_nodes: board.nodes().iter().filter(|n| n.is_hostile()).count(),
        speed_upgrades: board.nodes().iter().filter(|n| n.has_speed_upgrade()).count(),
        earth: board.earth().name.clone(),
        target: board.target().name.clone(),
        shortest_route_home: path_distance(&board, &route),
        shortest_route_hostiles: count_hostiles(&board, &route),
        min_edge_length: board.min_length(),
        max_edge_length: board.max_length(),
        generated_at_epoch: current_epoch_seconds(),
    };

    let metadata_path = output_dir.join(format!("board-{seed}.meta.json"));
    let metadata_json = serde_json::to_vec_pretty(&metadata)?;
    fs::write(&metadata_path, metadata_json)
        .with_context(|| format!("failed to write metadata to {}", metadata_path.display()))?;

    info!(
        "Wrote board {} ({} nodes, {} edges) to {}",
        seed,
        metadata.nodes,
        metadata.edges,
        board_path.display()
    );

    Ok(())
}

fn current_epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
