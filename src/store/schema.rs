use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dictionary::Entry;
use crate::engine::ledger::MistakeLedger;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DictionaryData {
    pub schema_version: u32,
    pub entries: Vec<Entry>,
}

impl Default for DictionaryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            entries: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerData {
    pub schema_version: u32,
    pub ledger: MistakeLedger,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for LedgerData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            ledger: MistakeLedger::default(),
            updated_at: None,
        }
    }
}

impl LedgerData {
    pub fn stamped(ledger: MistakeLedger) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            ledger,
            updated_at: Some(Utc::now()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HighScoreData {
    pub schema_version: u32,
    pub high_score: u32,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for HighScoreData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            high_score: 0,
            updated_at: None,
        }
    }
}

impl HighScoreData {
    pub fn stamped(high_score: u32) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            high_score,
            updated_at: Some(Utc::now()),
        }
    }
}
