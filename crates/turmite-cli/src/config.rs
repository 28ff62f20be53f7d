//! Configuration management for the turmite CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use turmite::prelude::*;

/// Project configuration, read from `turmite.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub colony: ColonyConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Preset used for fresh worlds.
    #[serde(default = "default_preset")]
    pub preset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Largest viewport drawn, in cells.
    #[serde(default = "default_max_width")]
    pub max_width: usize,
    #[serde(default = "default_max_height")]
    pub max_height: usize,
}

// Default value functions
fn default_preset() -> String { "langtons".to_string() }
fn default_frame_interval() -> u64 { 33 }
fn default_poll_interval() -> u64 { 4 }
fn default_max_width() -> usize { 100 }
fn default_max_height() -> usize { 45 }

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval(),
            poll_interval_ms: default_poll_interval(),
            max_width: default_max_width(),
            max_height: default_max_height(),
        }
    }
}

impl Config {
    /// Load config from turmite.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// A fresh world built from this config.
    pub fn build_simulation(&self) -> Result<Simulation> {
        let sim = ColonyBuilder::new()
            .with_config(self.simulation.clone())
            .with_colony(self.colony.clone())
            .preset(self.rules.preset.as_str())
            .build()
            .with_context(|| format!("Invalid preset in config: {}", self.rules.preset))?;
        Ok(sim)
    }
}

/// Find turmite.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join("turmite.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Get the turmite data directory (.turmite/).
pub fn data_dir() -> Result<PathBuf> {
    let dir = std::env::current_dir()?.join(".turmite");
    Ok(dir)
}

/// Get the sessions directory.
pub fn sessions_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join("sessions"))
}

/// Get the current session file path.
pub fn current_session_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("current.json"))
}

/// Per-user directory of rule table files, if the platform has one.
pub fn user_rules_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("turmite").join("rules"))
}

/// The current session, or a fresh world from the config when there is
/// none (or `fresh` is set).
pub fn current_simulation(config: &Config, fresh: bool) -> Result<Simulation> {
    let path = current_session_path()?;
    if fresh || !path.exists() {
        return config.build_simulation();
    }
    restore_session(&path).with_context(|| format!("Failed to load {}", path.display()))
}
