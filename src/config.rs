use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::dictionary::Language;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub learning_language: Language,
    #[serde(default = "default_round_size")]
    pub round_size: usize,
    #[serde(default = "default_lane_duration_secs")]
    pub lane_duration_secs: u32,
    #[serde(default = "default_lane_time_bonus_secs")]
    pub lane_time_bonus_secs: u32,
    #[serde(default = "default_lane_lives")]
    pub lane_lives: u32,
    #[serde(default = "default_lane_pass_limit")]
    pub lane_pass_limit: u32,
    #[serde(default = "default_quiz_reveal_ms")]
    pub quiz_reveal_ms: u64,
    #[serde(default = "default_celebration_ms")]
    pub celebration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

fn default_round_size() -> usize {
    5
}
fn default_lane_duration_secs() -> u32 {
    120
}
fn default_lane_time_bonus_secs() -> u32 {
    3
}
fn default_lane_lives() -> u32 {
    5
}
fn default_lane_pass_limit() -> u32 {
    5
}
fn default_quiz_reveal_ms() -> u64 {
    2000
}
fn default_celebration_ms() -> u64 {
    1500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            learning_language: Language::default(),
            round_size: default_round_size(),
            lane_duration_secs: default_lane_duration_secs(),
            lane_time_bonus_secs: default_lane_time_bonus_secs(),
            lane_lives: default_lane_lives(),
            lane_pass_limit: default_lane_pass_limit(),
            quiz_reveal_ms: default_quiz_reveal_ms(),
            celebration_ms: default_celebration_ms(),
            data_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vocabdrill")
            .join("config.toml")
    }

    /// Clamp hand-edited values into ranges the drills can run with.
    pub fn validate(&mut self) {
        self.round_size = self.round_size.clamp(3, 10);
        self.lane_duration_secs = self.lane_duration_secs.clamp(10, 600);
        self.lane_time_bonus_secs = self.lane_time_bonus_secs.min(self.lane_duration_secs);
        self.lane_lives = self.lane_lives.clamp(1, 10);
        self.lane_pass_limit = self.lane_pass_limit.clamp(1, 20);
    }

    pub fn data_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(PathBuf::from)
    }
}
