use galaxy_engine::generation::{generate_with_config, GenerationConfig};
use galaxy_engine::graph::pathfinder::{
    count_hostiles, path_steps, shortest_path, shortest_path_avoiding_hostiles,
};
use galaxy_engine::Board;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use log::warn;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Generation settings, read once from the file named by `GALAXY_CONFIG`.
static CONFIG: Lazy<GenerationConfig> = Lazy::new(|| match std::env::var("GALAXY_CONFIG") {
    Ok(path) => GenerationConfig::from_path(&path).unwrap_or_else(|err| {
        warn!("ignoring config at {path}: {err}");
        GenerationConfig::default()
    }),
    Err(_) => GenerationConfig::default(),
});

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EngineRequest {
    Generate {
        seed: u64,
    },
    Path {
        seed: u64,
        start_id: usize,
        end_id: usize,
        #[serde(default)]
        avoid_hostiles: bool,
    },
    Ping {
        seed: u64,
        node_id: usize,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EngineResponse {
    Generate {
        seed: u64,
        width: i32,
        height: i32,
        earth_id: usize,
        target_id: usize,
        nodes: Vec<NodeResult>,
        edges: Vec<EdgeResult>,
    },
    Path {
        nodes: Vec<PathResult>,
        hostiles: usize,
    },
    Ping {
        id: usize,
        ping: f64,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Serialize)]
struct NodeResult {
    id: usize,
    name: String,
    x: i32,
    y: i32,
    hostile: bool,
    speed_upgrade: bool,
}

#[derive(Debug, Serialize)]
struct EdgeResult {
    from: usize,
    to: usize,
    length: u32,
}

#[derive(Debug, Serialize)]
struct PathResult {
    id: usize,
    name: String,
    cumulative_cost: u64,
}

fn board_for(seed: u64) -> Result<Board, EngineResponse> {
    generate_with_config(seed, &CONFIG).map_err(|err| EngineResponse::Error {
        message: err.to_string(),
    })
}

async fn handler(event: LambdaEvent<EngineRequest>) -> Result<EngineResponse, Error> {
    let req = event.payload;
    match req {
        EngineRequest::Generate { seed } => {
            let board = match board_for(seed) {
                Ok(board) => board,
                Err(response) => return Ok(response),
            };
            let nodes = board
                .nodes()
                .iter()
                .map(|n| NodeResult {
                    id: n.id(),
                    name: n.name.clone(),
                    x: n.x,
                    y: n.y,
                    hostile: n.is_hostile(),
                    speed_upgrade: n.has_speed_upgrade(),
                })
                .collect();
            let edges = board
                .edges()
                .map(|e| EdgeResult {
                    from: e.first_exit(),
                    to: e.second_exit(),
                    length: e.length,
                })
                .collect();
            Ok(EngineResponse::Generate {
                seed,
                width: board.width(),
                height: board.height(),
                earth_id: board.earth_id(),
                target_id: board.target_id(),
                nodes,
                edges,
            })
        }
        EngineRequest::Path {
            seed,
            start_id,
            end_id,
            avoid_hostiles,
        } => {
            let board = match board_for(seed) {
                Ok(board) => board,
                Err(response) => return Ok(response),
            };
            if board.node(start_id).is_none() {
                return Ok(EngineResponse::Error { message: format!("Unknown start_id {}", start_id) });
            }
            if board.node(end_id).is_none() {
                return Ok(EngineResponse::Error { message: format!("Unknown end_id {}", end_id) });
            }
            let path = if avoid_hostiles {
                shortest_path_avoiding_hostiles(&board, start_id, end_id)
            } else {
                shortest_path(&board, start_id, end_id)
            };
            if path.is_empty() {
                return Ok(EngineResponse::Error { message: "No path found".into() });
            }
            let hostiles = count_hostiles(&board, &path);
            let nodes = path_steps(&board, &path)
                .into_iter()
                .map(|step| PathResult {
                    id: step.node,
                    name: board.nodes()[step.node].name.clone(),
                    cumulative_cost: step.cost,
                })
                .collect();
            Ok(EngineResponse::Path { nodes, hostiles })
        }
        EngineRequest::Ping { seed, node_id } => {
            let board = match board_for(seed) {
                Ok(board) => board,
                Err(response) => return Ok(response),
            };
            match board.ping(node_id) {
                Ok(ping) => Ok(EngineResponse::Ping { id: node_id, ping }),
                Err(err) => Ok(EngineResponse::Error { message: err.to_string() }),
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let func = service_fn(handler);
    lambda_runtime::run(func).await
}
