use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::dictionary::VocabularyView;
use crate::engine::ledger::MistakeLedger;
use crate::engine::scheduler::FrameLoop;
use crate::error::EngineError;
use crate::session::capture::CaptureDrill;
use crate::session::lane::LaneDrill;
use crate::session::matching::MatchDrill;
use crate::session::outcome::{Choice, Effects, Outcome};
use crate::session::quiz::QuizDrill;
use crate::session::{DrillKind, DrillRules};
use crate::store::PracticeStore;

/// Ticket for one round. Only the most recently started round's handle is
/// live; older handles are rejected or ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RoundHandle {
    id: u64,
    kind: DrillKind,
}

impl RoundHandle {
    pub fn id(self) -> u64 {
        self.id
    }

    pub fn kind(self) -> DrillKind {
        self.kind
    }
}

#[derive(Debug)]
pub enum ActiveRound {
    Capture(CaptureDrill),
    Lane(LaneDrill),
    Quiz(QuizDrill),
    Match(MatchDrill),
}

impl ActiveRound {
    pub fn kind(&self) -> DrillKind {
        match self {
            ActiveRound::Capture(_) => DrillKind::Capture,
            ActiveRound::Lane(_) => DrillKind::Lane,
            ActiveRound::Quiz(_) => DrillKind::Quiz,
            ActiveRound::Match(_) => DrillKind::Match,
        }
    }

    /// Whether the round wants per-frame updates right now.
    fn is_animating(&self) -> bool {
        match self {
            ActiveRound::Capture(d) => d.is_animating(),
            ActiveRound::Lane(d) => d.is_animating(),
            ActiveRound::Quiz(_) | ActiveRound::Match(_) => false,
        }
    }

    fn teardown(&mut self) -> usize {
        match self {
            ActiveRound::Capture(d) => d.teardown(),
            ActiveRound::Lane(d) => d.teardown(),
            ActiveRound::Quiz(d) => d.teardown(),
            ActiveRound::Match(_) => 0,
        }
    }
}

#[derive(Debug)]
struct Round {
    id: u64,
    drill: ActiveRound,
}

/// Owns the vocabulary, the persisted practice state, and the single active
/// round. Hosts drive it with `start_round`, `submit_answer`, `tick` and
/// `teardown`.
pub struct Trainer {
    config: Config,
    rules: DrillRules,
    store: Box<dyn PracticeStore>,
    vocabulary: VocabularyView,
    ledger: MistakeLedger,
    high_score: u32,
    rng: SmallRng,
    round: Option<Round>,
    frames: FrameLoop,
    rounds_started: u64,
}

impl Trainer {
    pub fn new(config: Config, store: Box<dyn PracticeStore>) -> Self {
        Self::with_rng(config, store, SmallRng::from_entropy())
    }

    pub fn with_rng(mut config: Config, store: Box<dyn PracticeStore>, rng: SmallRng) -> Self {
        config.validate();
        let entries = match store.load_entries() {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %EngineError::persistence(err), "dictionary unavailable, starting empty");
                Vec::new()
            }
        };
        let vocabulary = VocabularyView::new(entries);
        info!(entries = vocabulary.len(), language = %config.learning_language, "trainer ready");

        Self {
            rules: DrillRules::from(&config),
            config,
            store,
            vocabulary,
            ledger: MistakeLedger::new(),
            high_score: 0,
            rng,
            round: None,
            frames: FrameLoop::default(),
            rounds_started: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn vocabulary(&self) -> &VocabularyView {
        &self.vocabulary
    }

    pub fn ledger(&self) -> &MistakeLedger {
        &self.ledger
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn active(&self) -> Option<&ActiveRound> {
        self.round.as_ref().map(|r| &r.drill)
    }

    pub fn handle(&self) -> Option<RoundHandle> {
        self.round.as_ref().map(|r| RoundHandle {
            id: r.id,
            kind: r.drill.kind(),
        })
    }

    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frames
    }

    /// Supersede any running round and set up a fresh one. The ledger and
    /// high score are re-read from the store first; if the store cannot be
    /// read the round runs on the values already held in memory.
    pub fn start_round(&mut self, kind: DrillKind) -> Result<RoundHandle, EngineError> {
        if let Some(current) = self.handle() {
            self.teardown(current);
        }
        self.refresh_from_store();

        let words = self.vocabulary.words();
        let drill = match kind {
            DrillKind::Capture => ActiveRound::Capture(CaptureDrill::new(
                &words,
                &self.ledger,
                &self.rules,
                &mut self.rng,
            )?),
            DrillKind::Lane => ActiveRound::Lane(LaneDrill::new(
                &words,
                &self.ledger,
                self.high_score,
                &self.rules,
                &mut self.rng,
            )?),
            DrillKind::Quiz => ActiveRound::Quiz(QuizDrill::new(
                &words,
                &self.vocabulary.phrases(),
                &self.rules,
                &mut self.rng,
            )?),
            DrillKind::Match => {
                ActiveRound::Match(MatchDrill::new(&words, &self.rules, &mut self.rng)?)
            }
        };

        self.rounds_started += 1;
        let id = self.rounds_started;
        self.round = Some(Round { id, drill });
        self.sync_frame_loop();
        info!(round = id, drill = %kind, "round started");

        Ok(RoundHandle { id, kind })
    }

    pub fn submit_answer(
        &mut self,
        handle: RoundHandle,
        choice: Choice,
    ) -> Result<Outcome, EngineError> {
        let Some(round) = self.round.as_mut().filter(|r| r.id == handle.id) else {
            return Err(EngineError::StaleCallback { round: handle.id });
        };

        let outcome = match (&mut round.drill, choice) {
            (ActiveRound::Capture(d), Choice::Bubble(id)) => d.select_bubble(id),
            (ActiveRound::Lane(d), Choice::Start) => d.start(),
            (ActiveRound::Lane(d), Choice::Grab(tile)) => d.grab(tile),
            (ActiveRound::Lane(d), Choice::Release) => d.release(),
            (ActiveRound::Lane(d), Choice::Drop { tile, slot }) => d.drop_tile(tile, slot),
            (ActiveRound::Quiz(d), Choice::Answer(option)) => d.answer(option),
            (ActiveRound::Quiz(d), Choice::Continue) => d.celebration_done(&mut self.rng),
            (ActiveRound::Match(d), Choice::Left(i)) => d.select_left(i),
            (ActiveRound::Match(d), Choice::Right(i)) => d.select_right(i),
            (drill, choice) => {
                debug!(drill = %drill.kind(), ?choice, "choice does not apply");
                Outcome::ignored()
            }
        };

        self.apply(&outcome.effects);
        self.sync_frame_loop();
        Ok(outcome)
    }

    /// Advance the live round by `elapsed`: pending one-shot timers always,
    /// motion only while the frame loop is registered for it. A stale handle
    /// is a no-op.
    pub fn tick(&mut self, handle: RoundHandle, elapsed: Duration) -> Effects {
        let Some(round) = self.round.as_mut().filter(|r| r.id == handle.id) else {
            debug!(round = handle.id, "tick for superseded round ignored");
            return Effects::default();
        };
        let framed = self.frames.is_running_for(round.id);

        let mut effects = Effects::default();
        match &mut round.drill {
            ActiveRound::Capture(d) => {
                effects.merge(d.advance_timers(elapsed));
                if framed {
                    d.advance_frame(elapsed, &mut self.rng);
                }
            }
            ActiveRound::Lane(d) => {
                effects.merge(d.advance_timers(elapsed, &mut self.rng));
                if framed {
                    effects.merge(d.advance_frame(elapsed, &mut self.rng));
                }
            }
            ActiveRound::Quiz(d) => effects.merge(d.advance_timers(elapsed, &mut self.rng)),
            ActiveRound::Match(_) => {}
        }
        if framed {
            self.frames.record_frame();
        }

        self.apply(&effects);
        self.sync_frame_loop();
        effects
    }

    /// Cancel everything the round has pending. Returns false when the handle
    /// is not the live round, including a second teardown of the same round.
    pub fn teardown(&mut self, handle: RoundHandle) -> bool {
        let Some(mut round) = self.round.take_if(|r| r.id == handle.id) else {
            return false;
        };
        let cancelled = round.drill.teardown();
        self.frames.cancel();
        debug!(round = round.id, cancelled, "round torn down");
        true
    }

    fn refresh_from_store(&mut self) {
        match self.store.load_ledger() {
            Ok(ledger) => self.ledger = ledger,
            Err(err) => {
                warn!(error = %EngineError::persistence(err), "mistake ledger unavailable, using in-memory copy");
            }
        }
        match self.store.load_high_score() {
            Ok(score) => self.high_score = self.high_score.max(score),
            Err(err) => {
                warn!(error = %EngineError::persistence(err), "high score unavailable, using in-memory copy");
            }
        }
    }

    /// Persist what a drill reported. Each miss is a read-modify-write of
    /// the stored ledger; storage failures are logged and play continues.
    fn apply(&mut self, effects: &Effects) {
        for identity in &effects.mistakes {
            let mut ledger = match self.store.load_ledger() {
                Ok(ledger) => ledger,
                Err(err) => {
                    warn!(error = %EngineError::persistence(err), "mistake ledger unreadable, updating in-memory copy");
                    self.ledger.clone()
                }
            };
            let count = ledger.record_miss(identity);
            debug!(word = %identity, count, "mistake recorded");
            if let Err(err) = self.store.save_ledger(&ledger) {
                warn!(error = %EngineError::persistence(err), "could not save mistake ledger");
            }
            self.ledger = ledger;
        }

        if let Some(score) = effects.new_high_score
            && score > self.high_score
        {
            self.high_score = score;
            info!(score, "new high score");
            if let Err(err) = self.store.save_high_score(score) {
                warn!(error = %EngineError::persistence(err), "could not save high score");
            }
        }
    }

    /// Keep the frame loop registered exactly while the live round animates.
    fn sync_frame_loop(&mut self) {
        match &self.round {
            Some(round) if round.drill.is_animating() => {
                if !self.frames.is_running_for(round.id) {
                    self.frames.register(round.id);
                }
            }
            _ => {
                self.frames.cancel();
            }
        }
    }
}
