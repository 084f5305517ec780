//! Configuration for the adapters and services
//!
//! Nothing here reads the environment: embedders build a [`MapbridgeConfig`]
//! (directly, from a [`MapbridgeProfile`] preset, or deserialised from JSON)
//! and hand it to the adapters that need it.

use crate::{core::constants::DEFAULT_CIRCLE_STEPS, MapsError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum MapbridgeProfile {
    Balanced,
    LowDetail,
    HighDetail,
    Custom(MapbridgeConfig),
}

impl MapbridgeProfile {
    pub fn resolve(&self) -> MapbridgeConfig {
        match self {
            Self::Balanced => MapbridgeConfig {
                circle: CircleRenderConfig {
                    steps: DEFAULT_CIRCLE_STEPS,
                },
                services: ServiceConfig::default(),
            },
            Self::LowDetail => MapbridgeConfig {
                circle: CircleRenderConfig { steps: 32 },
                services: ServiceConfig {
                    max_results: 1,
                    default_language: None,
                },
            },
            Self::HighDetail => MapbridgeConfig {
                circle: CircleRenderConfig { steps: 128 },
                services: ServiceConfig {
                    max_results: 10,
                    default_language: None,
                },
            },
            Self::Custom(config) => config.clone(),
        }
    }
}

impl Default for MapbridgeProfile {
    fn default() -> Self {
        Self::Balanced
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapbridgeConfig {
    pub circle: CircleRenderConfig,
    pub services: ServiceConfig,
}

impl MapbridgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.circle.steps < 3 {
            return Err(MapsError::InvalidArgument(format!(
                "circle polygons need at least 3 steps, got {}",
                self.circle.steps
            )));
        }
        if self.services.max_results == 0 {
            return Err(MapsError::InvalidArgument(
                "max_results must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for MapbridgeConfig {
    fn default() -> Self {
        MapbridgeProfile::default().resolve()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleRenderConfig {
    /// Vertices in the generated polygon ring (before closing).
    pub steps: usize,
}

impl Default for CircleRenderConfig {
    fn default() -> Self {
        Self {
            steps: DEFAULT_CIRCLE_STEPS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub max_results: u32,
    /// Used when a request carries no `language` of its own.
    pub default_language: Option<String>,
}

impl ServiceConfig {
    /// Request language wins over the configured default.
    pub fn language_for(&self, requested: Option<&str>) -> Option<String> {
        requested
            .map(str::to_string)
            .or_else(|| self.default_language.clone())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            default_language: None,
        }
    }
}
