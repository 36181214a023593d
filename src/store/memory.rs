use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Result, bail};

use crate::dictionary::Entry;
use crate::engine::ledger::MistakeLedger;
use crate::store::PracticeStore;

#[derive(Debug, Default)]
struct MemoryState {
    entries: Vec<Entry>,
    ledger: MistakeLedger,
    high_score: u32,
    failing: bool,
}

/// In-memory store. Clones share state, so a caller can keep a handle to
/// inspect what the trainer wrote.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<Entry>) -> Self {
        let store = Self::default();
        store.state.borrow_mut().entries = entries;
        store
    }

    /// While set, every operation fails as if the backing store were gone.
    pub fn set_failing(&self, failing: bool) {
        self.state.borrow_mut().failing = failing;
    }

    fn check(&self) -> Result<()> {
        if self.state.borrow().failing {
            bail!("memory store switched off");
        }
        Ok(())
    }
}

impl PracticeStore for MemoryStore {
    fn load_entries(&self) -> Result<Vec<Entry>> {
        self.check()?;
        Ok(self.state.borrow().entries.clone())
    }

    fn load_ledger(&self) -> Result<MistakeLedger> {
        self.check()?;
        Ok(self.state.borrow().ledger.clone())
    }

    fn save_ledger(&self, ledger: &MistakeLedger) -> Result<()> {
        self.check()?;
        self.state.borrow_mut().ledger = ledger.clone();
        Ok(())
    }

    fn load_high_score(&self) -> Result<u32> {
        self.check()?;
        Ok(self.state.borrow().high_score)
    }

    fn save_high_score(&self, score: u32) -> Result<()> {
        self.check()?;
        self.state.borrow_mut().high_score = score;
        Ok(())
    }
}
