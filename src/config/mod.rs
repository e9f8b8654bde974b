mod time;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::predict::ObserverLocation;
use crate::rank::{ObservationEvent, RankingOptions, SkyDirection};
use crate::spacetrack::{QueryParameters, DEFAULT_BASE_URL};

pub use time::parse_instant;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid observer coordinates: {0}")]
    InvalidCoordinates(String),
    #[error("invalid time '{0}': {1}")]
    InvalidTime(String, String),
    #[error("invalid query parameter: {0}")]
    InvalidQuery(String),
}

/// Everything needed to fetch records and explain one sighting.
///
/// Every section is optional; the defaults describe the 2024-04-08 eclipse
/// sighting near Jackson, Missouri.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_records_file")]
    pub records_file: PathBuf,
    #[serde(default)]
    pub event: EventConfig,
    #[serde(default)]
    pub ranking: RankingOptions,
    #[serde(default)]
    pub spacetrack: SpaceTrackConfig,
}

fn default_records_file() -> PathBuf {
    PathBuf::from("satellite_data.json")
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventConfig {
    #[serde(default)]
    pub observer: ObserverConfig,
    #[serde(default = "default_time")]
    pub time: String,
    #[serde(default = "default_sun")]
    pub sun: SkyDirection,
}

// First photographed object, five seconds after third contact
fn default_time() -> String {
    "2024-04-08T19:02:26Z + 5s".to_string()
}

// USNO solar eclipse computation for the observer at third contact
fn default_sun() -> SkyDirection {
    SkyDirection::new(57.0, 209.2)
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            observer: ObserverConfig::default(),
            time: default_time(),
            sun: default_sun(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObserverConfig {
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            coordinates: "37.42902,-89.64276".to_string(),
            altitude_m: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpaceTrackConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_query")]
    pub query: serde_yaml::Mapping,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_query() -> serde_yaml::Mapping {
    QueryParameters::default()
        .iter()
        .map(|(k, v)| {
            (
                serde_yaml::Value::String(k.to_string()),
                serde_yaml::Value::String(v.to_string()),
            )
        })
        .collect()
}

impl Default for SpaceTrackConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            query: default_query(),
        }
    }
}

impl SpaceTrackConfig {
    /// Query parameters in file order
    pub fn query_parameters(&self) -> Result<QueryParameters, ConfigError> {
        let mut params = QueryParameters::new();
        for (key, value) in &self.query {
            let key = simple_to_string(key)
                .ok_or_else(|| ConfigError::InvalidQuery(format!("{:?}", key)))?;
            let value = simple_to_string(value)
                .ok_or_else(|| ConfigError::InvalidQuery(format!("{}: {:?}", key, value)))?;
            params.push(key, value);
        }
        Ok(params)
    }
}

impl EventConfig {
    pub fn resolve(&self, time_override: Option<&str>) -> Result<ObservationEvent, ConfigError> {
        let observer = ObserverLocation::from_coordinates(
            &self.observer.coordinates,
            Some(self.observer.altitude_m),
        )
        .ok_or_else(|| ConfigError::InvalidCoordinates(self.observer.coordinates.clone()))?;

        let time = time_override.unwrap_or(self.time.as_str());
        let instant =
            parse_instant(time).map_err(|e| ConfigError::InvalidTime(time.to_string(), e))?;

        Ok(ObservationEvent {
            observer,
            instant,
            sun: self.sun,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            records_file: default_records_file(),
            event: EventConfig::default(),
            ranking: RankingOptions::default(),
            spacetrack: SpaceTrackConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty mapping
        if yaml.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}

fn simple_to_string(v: &serde_yaml::Value) -> Option<String> {
    match v {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
