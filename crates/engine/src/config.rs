//! Game configuration
//!
//! Defaults match the classic 10x20 field. Values can come from environment
//! variables (`BLOCKFALL_*`) or a JSON file; either way [`GameConfig::validate`]
//! runs before a [`Game`](crate::Game) is built.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{
    GridSize, InvalidGridSize, GRID_HEIGHT, GRID_WIDTH, LINES_PER_LEVEL, LINE_CLEAR_WIPE_MS,
    MAX_GRID_EDGE, MIN_GRID_EDGE, START_LEVEL,
};

pub const ENV_WIDTH: &str = "BLOCKFALL_WIDTH";
pub const ENV_HEIGHT: &str = "BLOCKFALL_HEIGHT";
pub const ENV_START_LEVEL: &str = "BLOCKFALL_START_LEVEL";
pub const ENV_LINES_PER_LEVEL: &str = "BLOCKFALL_LINES_PER_LEVEL";
pub const ENV_GHOST: &str = "BLOCKFALL_GHOST";
/// Path of a JSON config file, read by the binary
pub const ENV_CONFIG: &str = "BLOCKFALL_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid {axis} {value} is outside {}..={}", MIN_GRID_EDGE, MAX_GRID_EDGE)]
    GridEdge { axis: &'static str, value: u8 },

    #[error("lines_per_level must be at least 1")]
    ZeroLinesPerLevel,

    #[error("start_level must be at least 1")]
    ZeroStartLevel,

    #[error("failed to read config {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config json")]
    Parse(#[from] serde_json::Error),
}

/// Tunable game parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: u8,
    pub height: u8,
    pub start_level: u32,
    /// Cleared lines per level step
    pub lines_per_level: u32,
    /// Milliseconds between line-wipe steps
    pub wipe_interval_ms: u64,
    /// Project the landing position of the active piece
    pub ghost: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            start_level: START_LEVEL,
            lines_per_level: LINES_PER_LEVEL,
            wipe_interval_ms: LINE_CLEAR_WIPE_MS,
            ghost: true,
        }
    }
}

impl GameConfig {
    /// Read `BLOCKFALL_*` variables, keeping defaults for missing or
    /// unparsable values
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            width: parsed(&lookup, ENV_WIDTH).unwrap_or(defaults.width),
            height: parsed(&lookup, ENV_HEIGHT).unwrap_or(defaults.height),
            start_level: parsed(&lookup, ENV_START_LEVEL).unwrap_or(defaults.start_level),
            lines_per_level: parsed(&lookup, ENV_LINES_PER_LEVEL)
                .unwrap_or(defaults.lines_per_level),
            wipe_interval_ms: defaults.wipe_interval_ms,
            ghost: lookup(ENV_GHOST)
                .and_then(|s| parse_flag(&s))
                .unwrap_or(defaults.ghost),
        }
    }

    /// Parse a JSON document; absent fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid_size()?;
        if self.lines_per_level == 0 {
            return Err(ConfigError::ZeroLinesPerLevel);
        }
        if self.start_level == 0 {
            return Err(ConfigError::ZeroStartLevel);
        }
        Ok(())
    }

    pub fn grid_size(&self) -> Result<GridSize, ConfigError> {
        GridSize::new(self.width, self.height)
            .map_err(|InvalidGridSize { axis, value }| ConfigError::GridEdge { axis, value })
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|s| s.trim().parse().ok())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid_size().unwrap(), GridSize::default());
        assert!(config.ghost);
    }

    #[test]
    fn test_env_overrides_and_fallbacks() {
        let config = GameConfig::from_lookup(lookup(&[
            (ENV_WIDTH, "12"),
            (ENV_HEIGHT, "not-a-number"),
            (ENV_START_LEVEL, " 5 "),
            (ENV_GHOST, "off"),
        ]));
        assert_eq!(config.width, 12);
        assert_eq!(config.height, GRID_HEIGHT);
        assert_eq!(config.start_level, 5);
        assert_eq!(config.lines_per_level, LINES_PER_LEVEL);
        assert!(!config.ghost);
    }

    #[test]
    fn test_json_partial_document() {
        let config = GameConfig::from_json_str(r#"{ "width": 8, "ghost": false }"#).unwrap();
        assert_eq!(config.width, 8);
        assert_eq!(config.height, GRID_HEIGHT);
        assert!(!config.ghost);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let err = GameConfig::from_json_str(r#"{ "width": 3 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::GridEdge { axis: "width", value: 3 }));

        let err = GameConfig::from_json_str(r#"{ "height": 65 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::GridEdge { axis: "height", .. }));

        let err = GameConfig::from_json_str(r#"{ "lines_per_level": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroLinesPerLevel));

        let err = GameConfig::from_json_str(r#"{ "start_level": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroStartLevel));

        let err = GameConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = GameConfig::load("/nonexistent/blockfall.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
