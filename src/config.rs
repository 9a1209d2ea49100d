use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SEARCH_RADIUS_TILES, PROXIMITY_TOLERANCE};
use crate::error::TopologyError;

/// Tunables for building and querying a network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Distance within which a location is considered to be on a track feature
    pub proximity_tolerance: f64,
    /// Build track nodes on the rayon thread pool
    pub parallel_build: bool,
    /// Tiles searched in each direction around a looked-up location
    pub search_radius_tiles: i32,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            proximity_tolerance: PROXIMITY_TOLERANCE,
            parallel_build: true,
            search_radius_tiles: DEFAULT_SEARCH_RADIUS_TILES,
        }
    }
}

impl TopologyConfig {
    /// Parse a configuration, filling any missing field with its default
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed
    pub fn from_json(json: &str) -> Result<Self, TopologyError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TopologyConfig::default();
        assert_eq!(config.proximity_tolerance, PROXIMITY_TOLERANCE);
        assert!(config.parallel_build);
        assert_eq!(config.search_radius_tiles, 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TopologyConfig::from_json(r#"{ "parallel_build": false }"#)
            .expect("config should parse");
        assert!(!config.parallel_build);
        assert_eq!(config.proximity_tolerance, PROXIMITY_TOLERANCE);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(TopologyConfig::from_json("{ not json").is_err());
    }
}
