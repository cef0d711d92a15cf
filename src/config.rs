use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::session::SessionSettings;
use crate::tracking::{classify, is_road_user, ParticipantId, ParticipantKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid tick '{0}': {1}")]
    Tick(String, humantime::DurationError),
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
    #[error("duplicate participant id {0}")]
    DuplicateParticipant(ParticipantId),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub session: SessionConfig,
    pub participants: Vec<ParticipantConfig>,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub api_keys: Vec<ApiKey>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub relevance_radius: f64,
    pub max_entry_count: usize,
    #[serde(default)]
    pub hero_id: Option<ParticipantId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantConfig {
    pub id: ParticipantId,
    pub blueprint: String,
}

impl ParticipantConfig {
    pub fn kind(&self) -> ParticipantKind {
        classify(&self.blueprint)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_tick")]
    pub tick: String,
    #[serde(default)]
    pub error_range: f64,
    #[serde(default)]
    pub paced: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick: default_tick(),
            error_range: 0.0,
            paced: false,
        }
    }
}

fn default_tick() -> String {
    "500ms".to_string()
}

impl FeedConfig {
    pub fn tick(&self) -> Result<Duration, ConfigError> {
        humantime::parse_duration(self.tick.trim()).map_err(|e| ConfigError::Tick(self.tick.clone(), e))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_path")]
    pub path: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path: default_export_path(),
        }
    }
}

fn default_export_path() -> PathBuf {
    PathBuf::from("data.csv")
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKey {
    pub key: String,
    pub name: String,
    pub permissions: HashSet<Permission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    IngestSamples,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let radius = self.session.relevance_radius;
        if !radius.is_finite() || radius < 0.0 {
            return Err(ConfigError::Invalid("relevance_radius", radius.to_string()));
        }
        if self.session.max_entry_count == 0 {
            return Err(ConfigError::Invalid("max_entry_count", "0".into()));
        }
        let error_range = self.feed.error_range;
        if !error_range.is_finite() || error_range < 0.0 {
            return Err(ConfigError::Invalid("error_range", error_range.to_string()));
        }
        self.feed.tick()?;

        let mut seen = HashSet::new();
        for participant in &self.participants {
            if !seen.insert(participant.id) {
                return Err(ConfigError::DuplicateParticipant(participant.id));
            }
        }

        if self.api_keys.iter().any(|k| k.key.trim().is_empty()) {
            return Err(ConfigError::Invalid("api_keys", "empty key".into()));
        }
        Ok(())
    }

    pub fn settings(&self) -> SessionSettings {
        SessionSettings {
            relevance_radius: self.session.relevance_radius,
            max_entry_count: self.session.max_entry_count,
        }
    }

    /// Participants whose blueprint names a vehicle or a pedestrian.
    pub fn road_users(&self) -> impl Iterator<Item = &ParticipantConfig> {
        self.participants
            .iter()
            .filter(|p| is_road_user(&p.blueprint))
    }
}
