pub mod capture;
pub mod lane;
pub mod matching;
pub mod outcome;
pub mod quiz;

use std::fmt;
use std::time::Duration;

use crate::config::Config;
use crate::dictionary::Language;
use crate::error::EngineError;

pub use outcome::{Choice, Effects, Outcome, Verdict};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrillKind {
    Capture,
    Lane,
    Quiz,
    Match,
}

impl DrillKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DrillKind::Capture => "capture",
            DrillKind::Lane => "lane",
            DrillKind::Quiz => "quiz",
            DrillKind::Match => "match",
        }
    }

    /// Capture and lane rounds move things every frame.
    pub fn is_continuous(self) -> bool {
        matches!(self, DrillKind::Capture | DrillKind::Lane)
    }
}

impl fmt::Display for DrillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunables every drill reads at setup.
#[derive(Clone, Debug)]
pub struct DrillRules {
    pub round_size: usize,
    pub lane_duration_secs: u32,
    pub lane_time_bonus_secs: u32,
    pub lane_lives: u32,
    pub lane_pass_limit: u32,
    pub quiz_reveal: Duration,
    pub celebration: Duration,
    pub language: Language,
}

impl Default for DrillRules {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for DrillRules {
    fn from(config: &Config) -> Self {
        Self {
            round_size: config.round_size,
            lane_duration_secs: config.lane_duration_secs,
            lane_time_bonus_secs: config.lane_time_bonus_secs,
            lane_lives: config.lane_lives,
            lane_pass_limit: config.lane_pass_limit,
            quiz_reveal: Duration::from_millis(config.quiz_reveal_ms),
            celebration: Duration::from_millis(config.celebration_ms),
            language: config.learning_language,
        }
    }
}

pub fn ensure_pool(drill: DrillKind, available: usize, needed: usize) -> Result<(), EngineError> {
    if available < needed {
        return Err(EngineError::InsufficientVocabulary {
            drill,
            needed,
            available,
        });
    }
    Ok(())
}
