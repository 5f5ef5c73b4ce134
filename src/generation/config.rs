use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generation::names::PLANET_NAMES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Tunables for board generation. Defaults reproduce the classic layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub min_nodes: usize,
    pub max_nodes: usize,
    /// Edge-to-node ratio the augmentation pass aims for.
    pub average_degree: f64,
    /// Play area, excluding the border on every side.
    pub width: i32,
    pub height: i32,
    /// No two nodes are placed closer than this, retries permitting.
    pub node_buffer_radius: f64,
    pub border: i32,
    pub hostile_probability: f64,
    pub upgrade_probability: f64,
    pub placement_retries: u32,
    pub max_edge_iterations: u32,
    pub max_repair_attempts: u32,
    pub max_generation_attempts: u32,
    /// A safe route home holds strictly fewer hostile nodes than this.
    pub max_safe_hostiles: usize,
}

/// Drawn size of a planet; the default spacing and border scale from it.
const NODE_DIAMETER: i32 = 25;

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            min_nodes: 5,
            max_nodes: 100,
            average_degree: 2.5,
            width: 1600,
            height: 1600,
            node_buffer_radius: f64::from(NODE_DIAMETER * 5),
            border: (f64::from(NODE_DIAMETER) * 2.5) as i32,
            hostile_probability: 0.30,
            upgrade_probability: 0.20,
            placement_retries: 100_000,
            max_edge_iterations: 1000,
            max_repair_attempts: 1000,
            max_generation_attempts: 25,
            max_safe_hostiles: 3,
        }
    }
}

impl GenerationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GenerationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Full board width including the border on both sides.
    pub fn board_width(&self) -> i32 {
        self.width + 2 * self.border
    }

    pub fn board_height(&self) -> i32 {
        self.height + 2 * self.border
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid {
                field,
                reason: reason.into(),
            })
        }

        if self.min_nodes < 2 {
            return invalid("min_nodes", "a board needs at least Earth and a target");
        }
        if self.min_nodes > self.max_nodes {
            return invalid(
                "max_nodes",
                format!("{} is below min_nodes {}", self.max_nodes, self.min_nodes),
            );
        }
        if self.max_nodes > PLANET_NAMES.len() + 1 {
            return invalid(
                "max_nodes",
                format!("only {} planet names are available", PLANET_NAMES.len() + 1),
            );
        }
        for (field, p) in [
            ("hostile_probability", self.hostile_probability),
            ("upgrade_probability", self.upgrade_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(field, format!("{p} is not a probability"));
            }
        }
        if self.width <= 0 || self.height <= 0 {
            return invalid("width", "play area must be positive");
        }
        if !(self.node_buffer_radius.is_finite() && self.node_buffer_radius >= 0.0) {
            return invalid("node_buffer_radius", "must be a non-negative distance");
        }
        if self.border < 0 {
            return invalid("border", "must not be negative");
        }
        if !(self.average_degree.is_finite() && self.average_degree >= 0.0) {
            return invalid("average_degree", "must be a non-negative number");
        }
        if self.max_generation_attempts == 0 {
            return invalid("max_generation_attempts", "must allow at least one attempt");
        }
        if self.max_safe_hostiles == 0 {
            return invalid("max_safe_hostiles", "must be at least 1");
        }
        Ok(())
    }
}
