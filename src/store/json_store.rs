use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::dictionary::Entry;
use crate::engine::ledger::MistakeLedger;
use crate::store::PracticeStore;
use crate::store::schema::{DictionaryData, HighScoreData, LedgerData, SCHEMA_VERSION};

const DICTIONARY_FILE: &str = "dictionary.json";
const LEDGER_FILE: &str = "mistakes.json";
const HIGH_SCORE_FILE: &str = "high_score.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vocabdrill");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("creating data dir {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// A missing file is a fresh default; a file that exists but will not
    /// parse is reported rather than silently replaced.
    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        let path = self.file_path(name);
        if !path.exists() {
            return Ok(T::default());
        }
        let content =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        debug!(file = name, "saved");
        Ok(())
    }

    /// Replace the stored dictionary. Only seeding tools call this.
    pub fn save_entries(&self, entries: &[Entry]) -> Result<()> {
        self.save(
            DICTIONARY_FILE,
            &DictionaryData {
                schema_version: SCHEMA_VERSION,
                entries: entries.to_vec(),
            },
        )
    }
}

impl PracticeStore for JsonStore {
    fn load_entries(&self) -> Result<Vec<Entry>> {
        let data: DictionaryData = self.load(DICTIONARY_FILE)?;
        Ok(data.entries)
    }

    fn load_ledger(&self) -> Result<MistakeLedger> {
        let data: LedgerData = self.load(LEDGER_FILE)?;
        Ok(data.ledger)
    }

    fn save_ledger(&self, ledger: &MistakeLedger) -> Result<()> {
        self.save(LEDGER_FILE, &LedgerData::stamped(ledger.clone()))
    }

    fn load_high_score(&self) -> Result<u32> {
        let data: HighScoreData = self.load(HIGH_SCORE_FILE)?;
        Ok(data.high_score)
    }

    fn save_high_score(&self, score: u32) -> Result<()> {
        self.save(HIGH_SCORE_FILE, &HighScoreData::stamped(score))
    }
}
