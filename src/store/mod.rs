pub mod json_store;
pub mod memory;
pub mod schema;

use anyhow::Result;

use crate::dictionary::Entry;
use crate::engine::ledger::MistakeLedger;

pub use json_store::JsonStore;
pub use memory::MemoryStore;

/// Key-value persistence behind the trainer. Missing keys read as their
/// empty defaults; only I/O or decode failures are errors.
pub trait PracticeStore {
    fn load_entries(&self) -> Result<Vec<Entry>>;
    fn load_ledger(&self) -> Result<MistakeLedger>;
    fn save_ledger(&self, ledger: &MistakeLedger) -> Result<()>;
    fn load_high_score(&self) -> Result<u32>;
    fn save_high_score(&self, score: u32) -> Result<()>;
}
