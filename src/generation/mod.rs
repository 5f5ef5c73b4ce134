//! Procedural board generation.
//!
//! Nodes are scattered over the play area, wrapped in concentric convex
//! hulls, stitched into a planar web and relaxed with edge flips. A target is
//! then chosen and at least one route home is made safe. Every random draw
//! comes from a single PCG stream seeded with the board seed, so a seed always
//! reproduces the same board.

pub mod config;
pub(crate) mod hull;
pub mod names;
pub mod observer;
pub(crate) mod relax;

use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use thiserror::Error;

use crate::graph::board::{Board, GraphError};
use crate::graph::pathfinder::{
    count_hostiles, is_connected, longest_path_heuristic, shortest_path,
};
use crate::{NodeId, CRASHED_PLANET_NAME, EARTH_NAME};

pub use self::config::{ConfigError, GenerationConfig};
pub use self::observer::{GenerationObserver, NoopObserver, Stage};
use self::names::PLANET_NAMES;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("could not generate a valid board for seed {seed} in {attempts} attempts")]
    AttemptsExhausted { seed: u64, attempts: u32 },
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Generate the board for `seed` with the default configuration.
pub fn generate(seed: u64) -> Result<Board, GenerationError> {
    generate_with_config(seed, &GenerationConfig::default())
}

pub fn generate_with_config(seed: u64, config: &GenerationConfig) -> Result<Board, GenerationError> {
    generate_with_observer(seed, config, &mut NoopObserver)
}

/// Generate the board for `seed`, reporting progress to `observer`.
///
/// An attempt that leaves the graph disconnected, or finds no route from the
/// target to Earth, is discarded and generation starts over on the same
/// random stream. Gives up after `config.max_generation_attempts` attempts.
pub fn generate_with_observer<O: GenerationObserver>(
    seed: u64,
    config: &GenerationConfig,
    observer: &mut O,
) -> Result<Board, GenerationError> {
    retry_attempts(seed, config, observer, run_attempt)
}

/// Drive `attempt_fn` until it completes a board or the attempt budget runs
/// out. The board is cleared before every retry.
fn retry_attempts<O, F>(
    seed: u64,
    config: &GenerationConfig,
    observer: &mut O,
    mut attempt_fn: F,
) -> Result<Board, GenerationError>
where
    O: GenerationObserver,
    F: FnMut(&mut Board, &mut Pcg64Mcg, &GenerationConfig, &mut O) -> Result<Attempt, GenerationError>,
{
    config.validate()?;
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let mut board = Board::new(seed, config.board_width(), config.board_height());

    for attempt in 1..=config.max_generation_attempts {
        info!("generating board for seed {seed} (attempt {attempt})");
        match attempt_fn(&mut board, &mut rng, config, observer)? {
            Attempt::Complete => {
                info!(
                    "seed {seed}: {} nodes, {} edges, target {}",
                    board.node_count(),
                    board.edge_count(),
                    board.target_id()
                );
                return Ok(board);
            }
            Attempt::Infeasible(reason) => {
                warn!("seed {seed} attempt {attempt} discarded: {reason}");
                observer.attempt_failed(attempt, reason);
                board.clear();
            }
        }
    }

    Err(GenerationError::AttemptsExhausted {
        seed,
        attempts: config.max_generation_attempts,
    })
}

enum Attempt {
    Complete,
    Infeasible(&'static str),
}

fn run_attempt<R: Rng, O: GenerationObserver>(
    board: &mut Board,
    rng: &mut R,
    config: &GenerationConfig,
    observer: &mut O,
) -> Result<Attempt, GenerationError> {
    observer.stage_begin(Stage::Placement);
    let node_count = rng.gen_range(config.min_nodes..=config.max_nodes);
    let mut names: Vec<&str> = PLANET_NAMES.to_vec();
    for i in 0..node_count {
        let name = if i == 0 {
            EARTH_NAME
        } else {
            names.remove(rng.gen_range(0..names.len()))
        };
        let id = place_node(board, rng, config, name)?;
        if i == 0 {
            board.set_earth(id)?;
        }
        observer.node_placed(&board.nodes()[id]);
    }
    debug!("placed {node_count} nodes");

    observer.stage_begin(Stage::Hulls);
    let hulls = hull::build_hulls(board, observer)?;

    observer.stage_begin(Stage::HullConnection);
    hull::connect_layers(board, &hulls, observer)?;

    observer.stage_begin(Stage::DegreeRepair);
    hull::repair_innermost(board, &hulls, rng, config, observer)?;

    observer.stage_begin(Stage::DegreeAugmentation);
    hull::augment_degree(board, &hulls, rng, config, observer)?;

    observer.stage_begin(Stage::Relaxation);
    relax::relax(board, observer)?;

    if !is_connected(board) {
        return Ok(Attempt::Infeasible("graph is not connected"));
    }

    observer.stage_begin(Stage::TargetPlacement);
    let target = loop {
        let candidate = rng.gen_range(0..node_count);
        if candidate != board.earth_id() {
            break candidate;
        }
    };
    board.set_target(target)?;
    board.rename(target, CRASHED_PLANET_NAME)?;
    board.node_mut(target)?.hostile = false;

    observer.stage_begin(Stage::SafePath);
    if !guarantee_safe_path(board, config)? {
        return Ok(Attempt::Infeasible("no route from target to earth"));
    }

    observer.stage_begin(Stage::UpgradeCleanup);
    for id in shortest_path(board, board.target_id(), board.earth_id()) {
        board.node_mut(id)?.speed_upgrade = false;
    }

    observer.stage_begin(Stage::Finalize);
    board.compute_derived();
    board.validate()?;
    Ok(Attempt::Complete)
}

/// Add a node with random flags and a position at least the buffer radius
/// away from every node placed so far. When the retry budget runs out the last
/// drawn position is kept regardless.
fn place_node<R: Rng>(
    board: &mut Board,
    rng: &mut R,
    config: &GenerationConfig,
    name: &str,
) -> Result<NodeId, GraphError> {
    let hostile = rng.gen::<f64>() <= config.hostile_probability && name != EARTH_NAME;
    let speed_upgrade = rng.gen::<f64>() <= config.upgrade_probability;

    let mut tries = 0u32;
    let (x, y) = loop {
        tries += 1;
        let x = rng.gen_range(0..=config.width) + config.border;
        let y = rng.gen_range(0..=config.height) + config.border;
        if tries > config.placement_retries {
            warn!("{name} placed without clearance after {} retries", config.placement_retries);
            break (x, y);
        }
        let clear = board.nodes().iter().all(|other| {
            other.distance_to_point([f64::from(x), f64::from(y)]) >= config.node_buffer_radius
        });
        if clear {
            break (x, y);
        }
    };

    let id = board.add_node(name)?;
    let node = board.node_mut(id)?;
    node.x = x;
    node.y = y;
    node.hostile = hostile;
    node.speed_upgrade = speed_upgrade;
    Ok(id)
}

/// Find a route from the target to Earth and, if it holds too many hostile
/// nodes, pacify them in route order until it is safe. Returns false if no
/// route exists at all.
fn guarantee_safe_path(board: &mut Board, config: &GenerationConfig) -> Result<bool, GraphError> {
    let Some(path) = longest_path_heuristic(board, board.target_id(), board.earth_id()) else {
        return Ok(false);
    };

    let mut hostiles = count_hostiles(board, &path);
    debug!("route home has {} nodes, {hostiles} hostile", path.len());
    for id in path {
        if hostiles < config.max_safe_hostiles {
            break;
        }
        let node = board.node_mut(id)?;
        if node.hostile {
            node.hostile = false;
            hostiles -= 1;
        }
    }
    Ok(true)
}

/// Connect two nodes and tell the observer about it. Returns false if they
/// were already connected.
pub(crate) fn add_edge<O: GenerationObserver>(
    board: &mut Board,
    observer: &mut O,
    a: NodeId,
    b: NodeId,
) -> Result<bool, GraphError> {
    match board.connect(a, b)? {
        Some(edge) => {
            observer.edge_added(&edge);
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::board::BoardBuilder;
    use crate::graph::pathfinder::shortest_path_avoiding_hostiles;

    #[derive(Default)]
    struct Recorder {
        stages: Vec<Stage>,
        placed: usize,
        added: usize,
        removed: usize,
        failures: u32,
    }

    impl GenerationObserver for Recorder {
        fn stage_begin(&mut self, stage: Stage) {
            self.stages.push(stage);
        }
        fn node_placed(&mut self, _node: &crate::Node) {
            self.placed += 1;
        }
        fn edge_added(&mut self, _edge: &crate::Edge) {
            self.added += 1;
        }
        fn edge_removed(&mut self, _edge: &crate::Edge) {
            self.removed += 1;
        }
        fn attempt_failed(&mut self, _attempt: u32, _reason: &str) {
            self.failures += 1;
        }
    }

    #[test]
    fn observer_sees_every_stage() {
        let mut recorder = Recorder::default();
        let board =
            generate_with_observer(11, &GenerationConfig::default(), &mut recorder).unwrap();
        let last_attempt = recorder
            .stages
            .iter()
            .rposition(|&s| s == Stage::Placement)
            .unwrap();
        assert_eq!(
            &recorder.stages[last_attempt..],
            &[
                Stage::Placement,
                Stage::Hulls,
                Stage::HullConnection,
                Stage::DegreeRepair,
                Stage::DegreeAugmentation,
                Stage::Relaxation,
                Stage::TargetPlacement,
                Stage::SafePath,
                Stage::UpgradeCleanup,
                Stage::Finalize,
            ]
        );
        assert!(recorder.placed >= board.node_count());
        assert!(recorder.added - recorder.removed >= board.edge_count());
        if recorder.failures == 0 {
            assert_eq!(recorder.placed, board.node_count());
            assert_eq!(recorder.added - recorder.removed, board.edge_count());
        }
    }

    #[test]
    fn target_is_renamed_and_safe() {
        let board = generate(3).unwrap();
        let target = board.target();
        assert_eq!(target.name, CRASHED_PLANET_NAME);
        assert!(!target.is_hostile());
        assert!(!board.earth().is_hostile());
        assert_eq!(board.earth().name, EARTH_NAME);
        assert_ne!(board.earth_id(), board.target_id());
        assert!(board.node_by_name(CRASHED_PLANET_NAME).is_some());
    }

    #[test]
    fn small_boards_respect_config() {
        let config = GenerationConfig {
            min_nodes: 5,
            max_nodes: 8,
            ..GenerationConfig::default()
        };
        for seed in 0..20 {
            let board = generate_with_config(seed, &config).unwrap();
            assert!((5..=8).contains(&board.node_count()));
            assert_eq!(board.width(), config.board_width());
            for node in board.nodes() {
                assert!(node.x >= config.border && node.x <= config.border + config.width);
                assert!(node.y >= config.border && node.y <= config.border + config.height);
            }
        }
    }

    #[test]
    fn safe_path_is_pacified_in_route_order() {
        let config = GenerationConfig {
            hostile_probability: 1.0,
            ..GenerationConfig::default()
        };
        let board = generate_with_config(5, &config).unwrap();
        // Hostile penalties dominate edge lengths, so this route has the
        // fewest hostile nodes of any route home.
        let path = shortest_path_avoiding_hostiles(&board, board.target_id(), board.earth_id());
        assert!(!path.is_empty());
        assert!(count_hostiles(&board, &path) < config.max_safe_hostiles);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GenerationConfig {
            min_nodes: 9,
            max_nodes: 3,
            ..GenerationConfig::default()
        };
        assert!(matches!(
            generate_with_config(1, &config),
            Err(GenerationError::Config(_))
        ));
    }

    #[test]
    fn unreachable_earth_is_infeasible() {
        let mut b = BoardBuilder::new(10, 10);
        let earth = b.node(EARTH_NAME, 0, 0).unwrap();
        let target = b.node(CRASHED_PLANET_NAME, 9, 9).unwrap();
        b.earth(earth).target(target);
        let mut board = b.build().unwrap();
        let config = GenerationConfig::default();
        assert!(!guarantee_safe_path(&mut board, &config).unwrap());
    }

    #[test]
    fn infeasible_attempts_exhaust_the_budget() {
        let config = GenerationConfig {
            max_generation_attempts: 4,
            ..GenerationConfig::default()
        };
        let mut recorder = Recorder::default();
        let mut sizes_seen = Vec::new();
        let result = retry_attempts(4, &config, &mut recorder, |board, _, _, _| {
            sizes_seen.push((board.node_count(), board.edge_count()));
            let a = board.add_node(EARTH_NAME)?;
            let b = board.add_node("Vega")?;
            board.connect(a, b)?;
            Ok(Attempt::Infeasible("no route from target to earth"))
        });

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::AttemptsExhausted {
                seed: 4,
                attempts: 4
            }
        ));
        assert_eq!(
            err.to_string(),
            "could not generate a valid board for seed 4 in 4 attempts"
        );
        assert_eq!(recorder.failures, 4);
        // Every attempt starts from an empty board.
        assert_eq!(sizes_seen, vec![(0, 0); 4]);
    }

    #[test]
    fn retry_succeeds_after_discarded_attempts() {
        let mut recorder = Recorder::default();
        let mut calls = 0;
        let board = retry_attempts(
            9,
            &GenerationConfig::default(),
            &mut recorder,
            |board, _, _, _| {
                calls += 1;
                assert_eq!(board.node_count(), 0);
                let earth = board.add_node(EARTH_NAME)?;
                let target = board.add_node(CRASHED_PLANET_NAME)?;
                if calls < 3 {
                    return Ok(Attempt::Infeasible("graph is not connected"));
                }
                board.connect(earth, target)?;
                board.set_earth(earth)?;
                board.set_target(target)?;
                Ok(Attempt::Complete)
            },
        )
        .unwrap();
        assert_eq!(calls, 3);
        assert_eq!(recorder.failures, 2);
        assert_eq!(board.seed(), 9);
        assert_eq!(board.node_count(), 2);
        assert_eq!(board.edge_count(), 1);
    }

    #[test]
    fn crowded_play_area_still_generates() {
        // Far more nodes than fit at the buffer radius, so placement keeps
        // its last draw once the retries run out.
        let config = GenerationConfig {
            width: 4,
            height: 4,
            placement_retries: 10,
            max_nodes: 30,
            ..GenerationConfig::default()
        };
        for seed in 0..20 {
            let board = generate_with_config(seed, &config).unwrap();
            assert!(board.node_count() >= config.min_nodes);
            for node in board.nodes() {
                assert!((config.border..=config.border + 4).contains(&node.x));
                assert!((config.border..=config.border + 4).contains(&node.y));
            }
            assert!(is_connected(&board));
            assert!(board.validate().is_ok());
        }
    }

    #[test]
    fn hostile_route_is_pacified_in_order() {
        // Earth - H1 - H2 - H3 - H4 - target, single corridor.
        let mut b = BoardBuilder::new(100, 10);
        let earth = b.node(EARTH_NAME, 0, 0).unwrap();
        let hostiles: Vec<_> = (1..=4)
            .map(|i| b.node(&format!("H{i}"), i * 10, 0).unwrap())
            .collect();
        let target = b.node(CRASHED_PLANET_NAME, 50, 0).unwrap();
        let mut chain = vec![target];
        chain.extend(hostiles.iter().rev().copied());
        chain.push(earth);
        for pair in chain.windows(2) {
            b.edge(pair[0], pair[1], 10).unwrap();
        }
        for &h in &hostiles {
            b.hostile(h).unwrap();
        }
        b.earth(earth).target(target);
        let mut board = b.build().unwrap();

        assert!(guarantee_safe_path(&mut board, &GenerationConfig::default()).unwrap());
        // Walking from the target, H4 and H3 are pacified first.
        let still_hostile: Vec<_> = board
            .nodes()
            .iter()
            .filter(|n| n.is_hostile())
            .map(|n| n.name.clone())
            .collect();
        assert_eq!(still_hostile, vec!["H1".to_string(), "H2".to_string()]);
    }
}
