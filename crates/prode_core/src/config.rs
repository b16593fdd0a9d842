//! Runtime configuration
//!
//! JSON file with scoring values, an optional knockout format override and
//! mock feed settings. `ProdeConfig::from_env` loads it from the path in
//! `PRODE_CONFIG_PATH`; without that variable the defaults apply.

use std::path::PathBuf;
use std::{env, fs};

use serde::{Deserialize, Serialize};

use crate::data::{Tournament, FIXTURES_YAML, PLAYOFFS_YAML, TEAMS_YAML};
use crate::error::{ProdeError, Result};
use crate::feed::MockResultsFeed;
use crate::scoring::ScoringRules;

pub const CONFIG_PATH_ENV: &str = "PRODE_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_finish_probability")]
    pub finish_probability: f64,
}

fn default_finish_probability() -> f64 {
    MockResultsFeed::DEFAULT_FINISH_PROBABILITY
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { seed: 0, finish_probability: default_finish_probability() }
    }
}

impl FeedConfig {
    pub fn build(&self) -> MockResultsFeed {
        MockResultsFeed::new(self.seed).with_probability(self.finish_probability)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProdeConfig {
    #[serde(default)]
    pub scoring: ScoringRules,
    /// YAML knockout format replacing the embedded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_path: Option<PathBuf>,
    #[serde(default)]
    pub feed: FeedConfig,
}

impl ProdeConfig {
    // ========== Presets ==========

    /// 5 / 3 / 0, the standard table.
    pub fn classic() -> Self {
        Self::default()
    }

    /// A point for every submitted prediction, even a miss.
    pub fn participation() -> Self {
        Self { scoring: ScoringRules { exact: 5, correct_outcome: 3, miss: 1 }, ..Self::default() }
    }

    /// Only exact scorelines count.
    pub fn exact_only() -> Self {
        Self { scoring: ScoringRules { exact: 5, correct_outcome: 0, miss: 0 }, ..Self::default() }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "classic" => Some(Self::classic()),
            "participation" => Some(Self::participation()),
            "exact_only" | "exact-only" => Some(Self::exact_only()),
            _ => None,
        }
    }

    // ========== Loading ==========

    pub fn from_json(json: &str) -> Result<Self> {
        let config: ProdeConfig =
            serde_json::from_str(json).map_err(|e| ProdeError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.scoring.validate().map_err(ProdeError::InvalidConfig)?;
        let p = self.feed.finish_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ProdeError::InvalidConfig(format!("finish_probability must be 0.0-1.0, got {}", p)));
        }
        Ok(())
    }

    /// Reads the file named by `PRODE_CONFIG_PATH`. Unset or blank means
    /// defaults.
    pub fn from_env() -> Result<Self> {
        let Ok(path) = env::var(CONFIG_PATH_ENV) else {
            return Ok(Self::default());
        };

        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ProdeError::InvalidConfig(format!("Failed to read config from {CONFIG_PATH_ENV}='{path}': {e}"))
        })?;

        let config = Self::from_json(&content)
            .map_err(|e| ProdeError::InvalidConfig(format!("Bad config from {CONFIG_PATH_ENV}='{path}': {e}")))?;

        tracing::debug!(path, "loaded config");
        Ok(config)
    }

    /// The embedded tournament, or one using the overridden knockout format.
    pub fn load_tournament(&self) -> Result<Tournament> {
        let Some(path) = &self.format_path else {
            return Ok(Tournament::world_cup_2026().clone());
        };
        let format_yaml = fs::read_to_string(path)?;
        let tournament = Tournament::from_yaml(TEAMS_YAML, FIXTURES_YAML, PLAYOFFS_YAML, &format_yaml)?;
        tracing::info!(path = %path.display(), format = %tournament.format.name, "using custom knockout format");
        Ok(tournament)
    }
}
