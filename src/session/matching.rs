use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::dictionary::view::dedupe_by_identity;
use crate::dictionary::{Entry, Language};
use crate::error::EngineError;
use crate::session::outcome::{Effects, Outcome};
use crate::session::{DrillKind, DrillRules, ensure_pool};

pub const MATCH_PAIRS: usize = 5;

#[derive(Clone, Debug, PartialEq)]
pub struct PairItem {
    pub entry: Entry,
    pub paired: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchPhase {
    Playing { selected: Option<usize> },
    Won,
}

/// Two shuffled columns, English on the left and translations on the right.
#[derive(Debug)]
pub struct MatchDrill {
    left: Vec<PairItem>,
    right: Vec<PairItem>,
    language: Language,
    phase: MatchPhase,
    wrong_pairs: u32,
}

impl MatchDrill {
    pub fn new<R: Rng + ?Sized>(
        pool: &[Entry],
        rules: &DrillRules,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        let pool = dedupe_by_identity(pool);
        ensure_pool(DrillKind::Match, pool.len(), MATCH_PAIRS)?;

        let chosen: Vec<Entry> = pool
            .choose_multiple(rng, MATCH_PAIRS)
            .cloned()
            .collect();
        let column = |rng: &mut R| {
            let mut items: Vec<PairItem> = chosen
                .iter()
                .map(|entry| PairItem {
                    entry: entry.clone(),
                    paired: false,
                })
                .collect();
            items.shuffle(rng);
            items
        };
        let left = column(rng);
        let right = column(rng);

        info!(pairs = left.len(), "match round ready");

        Ok(Self {
            left,
            right,
            language: rules.language,
            phase: MatchPhase::Playing { selected: None },
            wrong_pairs: 0,
        })
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn left(&self) -> &[PairItem] {
        &self.left
    }

    pub fn right(&self) -> &[PairItem] {
        &self.right
    }

    /// Label shown for a right-column item.
    pub fn right_label(&self, index: usize) -> Option<&str> {
        self.right
            .get(index)
            .map(|item| item.entry.translation(self.language))
    }

    pub fn wrong_pairs(&self) -> u32 {
        self.wrong_pairs
    }

    pub fn pairs_formed(&self) -> usize {
        self.left.iter().filter(|item| item.paired).count()
    }

    pub fn select_left(&mut self, index: usize) -> Outcome {
        let MatchPhase::Playing { .. } = self.phase else {
            return Outcome::ignored();
        };
        match self.left.get(index) {
            Some(item) if !item.paired => {
                self.phase = MatchPhase::Playing {
                    selected: Some(index),
                };
                Outcome::accepted()
            }
            _ => Outcome::ignored(),
        }
    }

    pub fn select_right(&mut self, index: usize) -> Outcome {
        let MatchPhase::Playing {
            selected: Some(left_idx),
        } = self.phase
        else {
            return Outcome::ignored();
        };
        let Some(right_item) = self.right.get(index).filter(|item| !item.paired) else {
            return Outcome::ignored();
        };

        if right_item.entry.same_identity(&self.left[left_idx].entry) {
            self.right[index].paired = true;
            self.left[left_idx].paired = true;
            self.phase = if self.left.iter().all(|item| item.paired) {
                info!("match round won");
                MatchPhase::Won
            } else {
                MatchPhase::Playing { selected: None }
            };
            Outcome::correct(Effects::default())
        } else {
            // Wrong pairs only flash; they are not charged to the ledger.
            self.wrong_pairs += 1;
            self.phase = MatchPhase::Playing { selected: None };
            debug!(left = left_idx, right = index, "wrong pair");
            Outcome::incorrect(Effects::default())
        }
    }

    pub fn is_won(&self) -> bool {
        self.phase == MatchPhase::Won
    }
}
