//! Navigation configuration and file persistence
//!
//! Configs and agent descriptors can be stored as RON or JSON.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Ticks between two stuck checks
pub const STUCK_CHECK_INTERVAL: u64 = 100;
/// Minimum ticks between two path recomputations
pub const RECOMPUTE_COOLDOWN: u64 = 20;
/// Elapsed time over the estimate after which a waypoint is abandoned
pub const TIMEOUT_MULTIPLIER: f32 = 3.0;
/// Fraction of the expected travel distance the agent must cover between stuck checks
pub const STUCK_THRESHOLD_DISTANCE_FACTOR: f32 = 0.25;
/// Weight applied to the A* heuristic; makes the search greedy on purpose
pub const HEURISTIC_FUDGE: f32 = 1.5;

/// Per-follower tuning knobs
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Search radius floor, applied even when the agent's follow range is shorter
    pub required_path_length: f32,
    /// Node budget of one search (before the multiplier); derived from the range when unset
    pub max_visited_nodes: Option<usize>,
    /// Scales the node budget
    pub search_depth_multiplier: f32,
    /// Ticks between stuck checks
    pub stuck_check_interval: u64,
    /// Minimum ticks between recomputations
    pub recompute_cooldown: u64,
    /// Timeout multiplier over the estimated arrival time
    pub timeout_multiplier: f32,
    /// Distance factor for the stuck threshold
    pub stuck_distance_factor: f32,
    /// A* heuristic weight
    pub heuristic_fudge: f32,
    /// Manhattan distance at which a target counts as reached
    pub default_accuracy: i32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            required_path_length: 16.0,
            max_visited_nodes: None,
            search_depth_multiplier: 1.0,
            stuck_check_interval: STUCK_CHECK_INTERVAL,
            recompute_cooldown: RECOMPUTE_COOLDOWN,
            timeout_multiplier: TIMEOUT_MULTIPLIER,
            stuck_distance_factor: STUCK_THRESHOLD_DISTANCE_FACTOR,
            heuristic_fudge: HEURISTIC_FUDGE,
            default_accuracy: 1,
        }
    }
}

impl NavigationConfig {
    /// Set the minimum search radius
    #[must_use]
    pub fn with_required_path_length(mut self, length: f32) -> Self {
        self.required_path_length = length;
        self
    }

    /// Fix the node budget instead of deriving it from the range
    #[must_use]
    pub fn with_max_visited_nodes(mut self, nodes: usize) -> Self {
        self.max_visited_nodes = Some(nodes);
        self
    }

    /// Set the node budget multiplier
    #[must_use]
    pub fn with_search_depth_multiplier(mut self, multiplier: f32) -> Self {
        self.search_depth_multiplier = multiplier;
        self
    }

    /// Set the stuck check interval
    #[must_use]
    pub fn with_stuck_check_interval(mut self, ticks: u64) -> Self {
        self.stuck_check_interval = ticks;
        self
    }

    /// Set the recompute cooldown
    #[must_use]
    pub fn with_recompute_cooldown(mut self, ticks: u64) -> Self {
        self.recompute_cooldown = ticks;
        self
    }

    /// Node budget for a search radius
    #[must_use]
    pub fn visited_nodes_for_range(&self, range: f32) -> usize {
        self.max_visited_nodes
            .unwrap_or_else(|| (range * 16.0).floor().max(0.0) as usize)
    }

    /// Check the values make sense
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.required_path_length > 0.0) {
            return Err(ConfigError::Invalid("required_path_length must be positive".into()));
        }
        if !(self.search_depth_multiplier > 0.0) {
            return Err(ConfigError::Invalid("search_depth_multiplier must be positive".into()));
        }
        if self.max_visited_nodes == Some(0) {
            return Err(ConfigError::Invalid("max_visited_nodes must be non-zero".into()));
        }
        if self.stuck_check_interval == 0 {
            return Err(ConfigError::Invalid("stuck_check_interval must be non-zero".into()));
        }
        if !(self.timeout_multiplier > 0.0) {
            return Err(ConfigError::Invalid("timeout_multiplier must be positive".into()));
        }
        if !(self.heuristic_fudge >= 0.0) {
            return Err(ConfigError::Invalid("heuristic_fudge must not be negative".into()));
        }
        if self.default_accuracy < 0 {
            return Err(ConfigError::Invalid("default_accuracy must not be negative".into()));
        }
        Ok(())
    }

    /// Load and validate a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = load_ron(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = load_json(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// Serialize a value to a RON file
///
/// # Errors
///
/// Returns an error if the file cannot be written or serialization fails
pub fn save_ron<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let ron_string = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
        .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
    fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
    Ok(())
}

/// Deserialize a value from a RON file
///
/// # Errors
///
/// Returns an error if the file cannot be read or deserialization fails
pub fn load_ron<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
    ron::from_str(&content).map_err(|e| ConfigError::DeserializeError(e.to_string()))
}

/// Serialize a value to a JSON file
///
/// # Errors
///
/// Returns an error if the file cannot be written or serialization fails
pub fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let json_string = serde_json::to_string_pretty(value)
        .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
    fs::write(path, json_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
    Ok(())
}

/// Deserialize a value from a JSON file
///
/// # Errors
///
/// Returns an error if the file cannot be read or deserialization fails
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| ConfigError::DeserializeError(e.to_string()))
}

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// A value is out of range
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
