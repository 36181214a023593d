use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::dictionary::Entry;
use crate::dictionary::view::dedupe_by_identity;
use crate::engine::ledger::MistakeLedger;
use crate::engine::scheduler::{Countdown, Timers, frames_in};
use crate::engine::selector;
use crate::error::EngineError;
use crate::session::outcome::{Effects, Outcome};
use crate::session::{DrillKind, DrillRules, ensure_pool};

pub const LANES: usize = 4;
pub const POINTS_PER_MATCH: u32 = 10;

const ENTRY_X: f64 = 110.0;
const ENTRY_SPREAD: f64 = 50.0;
const EXIT_X: f64 = -20.0;
const MIN_SPEED: f64 = 0.15;
const SPEED_SPREAD: f64 = 0.10;
const TILE_RESET: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotStatus {
    Open,
    Matched,
    Skipped,
}

/// One position in the target sequence bar.
#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    pub entry: Entry,
    pub status: SlotStatus,
    pub passes: u32,
}

impl Slot {
    fn open(entry: Entry) -> Self {
        Self {
            entry,
            status: SlotStatus::Open,
            passes: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileStatus {
    Active,
    Correct,
    Incorrect,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub id: u64,
    pub entry: Entry,
    pub lane: usize,
    pub x: f64,
    pub speed: f64,
    pub status: TileStatus,
    generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LanePhase {
    Ready,
    Playing,
    GameOver { score: u32, new_high_score: bool },
}

#[derive(Debug)]
enum LaneTimer {
    Replace { tile: u64, generation: u64, slot: usize },
    Reset { tile: u64, generation: u64 },
}

/// Timed lane-matching drill with lives, score and a countdown.
#[derive(Debug)]
pub struct LaneDrill {
    pool: Vec<Entry>,
    slots: Vec<Slot>,
    tiles: Vec<Tile>,
    phase: LanePhase,
    score: u32,
    lives: u32,
    high_score: u32,
    countdown: Countdown,
    held: Option<u64>,
    time_bonus: u32,
    pass_limit: u32,
    timers: Timers<LaneTimer>,
}

fn entry_x<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    ENTRY_X + rng.gen_range(0.0..ENTRY_SPREAD)
}

impl LaneDrill {
    pub fn new<R: Rng + ?Sized>(
        pool: &[Entry],
        ledger: &MistakeLedger,
        high_score: u32,
        rules: &DrillRules,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        let pool = dedupe_by_identity(pool);
        ensure_pool(DrillKind::Lane, pool.len(), rules.round_size)?;

        let sequence = selector::select(&pool, ledger, rules.round_size, rng).selected;

        let mut tile_words = sequence.clone();
        tile_words.shuffle(rng);
        let tiles = tile_words
            .into_iter()
            .enumerate()
            .map(|(i, entry)| Tile {
                id: i as u64,
                entry,
                lane: i % LANES,
                x: entry_x(rng),
                speed: MIN_SPEED + rng.gen_range(0.0..SPEED_SPREAD),
                status: TileStatus::Active,
                generation: 0,
            })
            .collect();

        info!(slots = sequence.len(), high_score, "lane round ready");

        Ok(Self {
            pool,
            slots: sequence.into_iter().map(Slot::open).collect(),
            tiles,
            phase: LanePhase::Ready,
            score: 0,
            lives: rules.lane_lives,
            high_score,
            countdown: Countdown::new(rules.lane_duration_secs),
            held: None,
            time_bonus: rules.lane_time_bonus_secs,
            pass_limit: rules.lane_pass_limit,
            timers: Timers::new(),
        })
    }

    pub fn phase(&self) -> LanePhase {
        self.phase
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn time_left(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn held(&self) -> Option<u64> {
        self.held
    }

    pub fn is_animating(&self) -> bool {
        self.phase == LanePhase::Playing
    }

    /// The first slot still waiting to be matched.
    pub fn current_slot(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.status == SlotStatus::Open)
    }

    pub fn start(&mut self) -> Outcome {
        if self.phase != LanePhase::Ready {
            return Outcome::ignored();
        }
        self.phase = LanePhase::Playing;
        self.countdown.start();
        info!(seconds = self.countdown.remaining(), "lane round started");
        Outcome::accepted()
    }

    pub fn grab(&mut self, tile: u64) -> Outcome {
        if self.phase != LanePhase::Playing {
            return Outcome::ignored();
        }
        let grabbable = self
            .tiles
            .iter()
            .any(|t| t.id == tile && t.status == TileStatus::Active);
        if !grabbable {
            return Outcome::ignored();
        }
        self.held = Some(tile);
        Outcome::accepted()
    }

    pub fn release(&mut self) -> Outcome {
        match self.held.take() {
            Some(_) => Outcome::accepted(),
            None => Outcome::ignored(),
        }
    }

    pub fn drop_tile(&mut self, tile_id: u64, slot: usize) -> Outcome {
        if self.phase != LanePhase::Playing {
            return Outcome::ignored();
        }
        if self.held == Some(tile_id) {
            self.held = None;
        }
        let Some(tile_idx) = self
            .tiles
            .iter()
            .position(|t| t.id == tile_id && t.status == TileStatus::Active)
        else {
            return Outcome::ignored();
        };
        if self.slots.get(slot).map(|s| s.status) != Some(SlotStatus::Open) {
            return Outcome::ignored();
        }

        let tile = &mut self.tiles[tile_idx];
        if tile.entry.same_identity(&self.slots[slot].entry) {
            self.slots[slot].status = SlotStatus::Matched;
            self.countdown.extend(self.time_bonus);
            self.score += POINTS_PER_MATCH;
            tile.status = TileStatus::Correct;
            self.timers.schedule(
                TILE_RESET,
                LaneTimer::Replace {
                    tile: tile.id,
                    generation: tile.generation,
                    slot,
                },
            );
            Outcome::correct(Effects::score(POINTS_PER_MATCH))
        } else {
            let mut effects = Effects::mistake(tile.entry.identity());
            tile.status = TileStatus::Incorrect;
            self.timers.schedule(
                TILE_RESET,
                LaneTimer::Reset {
                    tile: tile.id,
                    generation: tile.generation,
                },
            );
            effects.merge(self.lose_life());
            Outcome::incorrect(effects)
        }
    }

    fn lose_life(&mut self) -> Effects {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.game_over()
        } else {
            Effects::default()
        }
    }

    fn game_over(&mut self) -> Effects {
        self.countdown.stop();
        self.held = None;
        // Pending replacements would reopen slots on a finished board.
        self.timers.bump_epoch();
        self.timers.cancel_all();
        let beaten = self.score > self.high_score;
        if beaten {
            self.high_score = self.score;
        }
        self.phase = LanePhase::GameOver {
            score: self.score,
            new_high_score: beaten,
        };
        info!(score = self.score, beaten, "lane round over");
        Effects {
            new_high_score: beaten.then_some(self.score),
            ..Effects::default()
        }
    }

    /// A word for a freshly vacated slot: prefer one absent from every slot
    /// and tile, then one absent from the other slots, then anything.
    fn replacement_word<R: Rng + ?Sized>(&self, slot: usize, rng: &mut R) -> Option<Entry> {
        let on_screen: HashSet<&str> = self
            .slots
            .iter()
            .map(|s| s.entry.identity())
            .chain(self.tiles.iter().map(|t| t.entry.identity()))
            .collect();
        let disjoint: Vec<&Entry> = self
            .pool
            .iter()
            .filter(|e| !on_screen.contains(e.identity()))
            .collect();
        if let Some(entry) = disjoint.choose(rng) {
            return Some((*entry).clone());
        }

        let other_slots: HashSet<&str> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != slot)
            .map(|(_, s)| s.entry.identity())
            .collect();
        let fallback: Vec<&Entry> = self
            .pool
            .iter()
            .filter(|e| !other_slots.contains(e.identity()))
            .collect();
        if let Some(entry) = fallback.choose(rng) {
            return Some((*entry).clone());
        }
        self.pool.choose(rng).cloned()
    }

    pub fn advance_timers<R: Rng + ?Sized>(&mut self, elapsed: Duration, rng: &mut R) -> Effects {
        for timer in self.timers.advance(elapsed) {
            match timer {
                LaneTimer::Replace {
                    tile,
                    generation,
                    slot,
                } => self.replace(tile, generation, slot, rng),
                LaneTimer::Reset { tile, generation } => {
                    if let Some(t) = self
                        .tiles
                        .iter_mut()
                        .find(|t| t.id == tile && t.generation == generation)
                        && t.status == TileStatus::Incorrect
                    {
                        t.status = TileStatus::Active;
                    }
                }
            }
        }
        Effects::default()
    }

    fn replace<R: Rng + ?Sized>(&mut self, tile: u64, generation: u64, slot: usize, rng: &mut R) {
        let Some(tile_idx) = self
            .tiles
            .iter()
            .position(|t| t.id == tile && t.generation == generation)
        else {
            debug!(tile, generation, "replacement skipped for recycled tile");
            return;
        };
        let Some(word) = self.replacement_word(slot, rng) else {
            return;
        };

        if self.slots.get(slot).map(|s| s.status) == Some(SlotStatus::Matched) {
            self.slots[slot] = Slot::open(word.clone());
        }
        let x = entry_x(rng);
        let t = &mut self.tiles[tile_idx];
        t.entry = word;
        t.status = TileStatus::Active;
        t.x = x;
        t.generation += 1;
    }

    /// Per-frame update: run the countdown, slide tiles along their lanes,
    /// and count passes of the current target.
    pub fn advance_frame<R: Rng + ?Sized>(&mut self, elapsed: Duration, rng: &mut R) -> Effects {
        if self.phase != LanePhase::Playing {
            return Effects::default();
        }

        self.countdown.advance(elapsed);
        if self.countdown.is_expired() {
            return self.game_over();
        }

        let frames = frames_in(elapsed);
        let current = self.current_slot();
        let mut passed: Vec<usize> = Vec::new();

        for tile in self.tiles.iter_mut() {
            if tile.status == TileStatus::Correct || self.held == Some(tile.id) {
                continue;
            }
            tile.x -= tile.speed * frames;
            if tile.x < EXIT_X {
                if let Some(slot) = current
                    && tile.entry.same_identity(&self.slots[slot].entry)
                {
                    passed.push(slot);
                }
                tile.x = ENTRY_X + rng.gen_range(0.0..ENTRY_SPREAD);
            }
        }

        let mut effects = Effects::default();
        for slot in passed {
            if self.phase != LanePhase::Playing {
                break;
            }
            effects.merge(self.record_pass(slot));
        }
        effects
    }

    fn record_pass(&mut self, slot: usize) -> Effects {
        let limit = self.pass_limit;
        let s = &mut self.slots[slot];
        if s.status != SlotStatus::Open {
            return Effects::default();
        }
        let passes = s.passes + 1;
        if passes >= limit {
            s.status = SlotStatus::Skipped;
            debug!(word = %s.entry.english, "target skipped after repeated passes");
            self.lose_life()
        } else {
            s.passes = passes;
            Effects::default()
        }
    }

    pub fn teardown(&mut self) -> usize {
        self.countdown.stop();
        self.held = None;
        self.timers.bump_epoch();
        self.timers.cancel_all()
    }
}
