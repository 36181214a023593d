use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

use crate::dictionary::Entry;
use crate::engine::ledger::MistakeLedger;
use crate::engine::scheduler::{Timers, frames_in};
use crate::engine::selector;
use crate::error::EngineError;
use crate::session::outcome::{Effects, Outcome};
use crate::session::{DrillKind, DrillRules, ensure_pool};

const MAX_X: f64 = 90.0;
const TOP_EDGE: f64 = -10.0;
const BOTTOM_EDGE: f64 = 110.0;
const SPAWN_DEPTH: f64 = 50.0;
const MIN_SPEED: f64 = 0.10;
const SPEED_SPREAD: f64 = 0.15;
const GRACE_WINDOW: Duration = Duration::from_millis(600);

#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    pub entry: Entry,
    pub collected: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BubbleStatus {
    Active,
    Burst,
    Dispersed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bubble {
    pub id: u64,
    pub entry: Entry,
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub status: BubbleStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapturePhase {
    Playing { target: usize },
    Won,
}

#[derive(Debug)]
enum CaptureTimer {
    Remove(u64),
}

/// Falling-bubble drill: collect the round's words in sequence order.
#[derive(Debug)]
pub struct CaptureDrill {
    targets: Vec<Target>,
    bubbles: Vec<Bubble>,
    phase: CapturePhase,
    timers: Timers<CaptureTimer>,
}

impl CaptureDrill {
    pub fn new<R: Rng + ?Sized>(
        pool: &[Entry],
        ledger: &MistakeLedger,
        rules: &DrillRules,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        ensure_pool(DrillKind::Capture, pool.len(), rules.round_size)?;

        let selection = selector::select(pool, ledger, rules.round_size, rng);
        ensure_pool(DrillKind::Capture, selection.selected.len(), rules.round_size)?;

        let mut bubbles: Vec<Bubble> = selection
            .selected
            .iter()
            .chain(selection.distractors.iter())
            .enumerate()
            .map(|(i, entry)| Bubble {
                id: i as u64,
                entry: entry.clone(),
                x: rng.gen_range(0.0..MAX_X),
                y: TOP_EDGE - rng.gen_range(0.0..SPAWN_DEPTH),
                speed: MIN_SPEED + rng.gen_range(0.0..SPEED_SPREAD),
                status: BubbleStatus::Active,
            })
            .collect();
        bubbles.shuffle(rng);

        let targets = selection
            .selected
            .into_iter()
            .map(|entry| Target {
                entry,
                collected: false,
            })
            .collect();

        info!(bubbles = bubbles.len(), "capture round ready");

        Ok(Self {
            targets,
            bubbles,
            phase: CapturePhase::Playing { target: 0 },
            timers: Timers::new(),
        })
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn target_index(&self) -> Option<usize> {
        match self.phase {
            CapturePhase::Playing { target } => Some(target),
            CapturePhase::Won => None,
        }
    }

    pub fn current_target(&self) -> Option<&Target> {
        self.target_index().and_then(|i| self.targets.get(i))
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, CapturePhase::Playing { .. })
    }

    pub fn select_bubble(&mut self, id: u64) -> Outcome {
        let CapturePhase::Playing { target } = self.phase else {
            return Outcome::ignored();
        };
        let Some(bubble) = self
            .bubbles
            .iter_mut()
            .find(|b| b.id == id && b.status == BubbleStatus::Active)
        else {
            return Outcome::ignored();
        };

        let wanted = &self.targets[target].entry;
        if bubble.entry.same_identity(wanted) {
            bubble.status = BubbleStatus::Burst;
            self.timers.schedule(GRACE_WINDOW, CaptureTimer::Remove(id));
            self.targets[target].collected = true;
            self.phase = if target + 1 == self.targets.len() {
                info!("capture round won");
                CapturePhase::Won
            } else {
                CapturePhase::Playing { target: target + 1 }
            };
            Outcome::correct(Effects::default())
        } else {
            // The miss belongs to the word the player failed to find.
            let missed = wanted.identity().to_string();
            bubble.status = BubbleStatus::Dispersed;
            self.timers.schedule(GRACE_WINDOW, CaptureTimer::Remove(id));
            Outcome::incorrect(Effects::mistake(&missed))
        }
    }

    pub fn advance_timers(&mut self, elapsed: Duration) -> Effects {
        for timer in self.timers.advance(elapsed) {
            match timer {
                CaptureTimer::Remove(id) => {
                    self.bubbles
                        .retain(|b| b.id != id || b.status == BubbleStatus::Active);
                }
            }
        }
        Effects::default()
    }

    /// Move active bubbles down; bubbles falling past the bottom re-enter at
    /// the top in a new column.
    pub fn advance_frame<R: Rng + ?Sized>(&mut self, elapsed: Duration, rng: &mut R) {
        if !self.is_animating() {
            return;
        }
        let frames = frames_in(elapsed);
        for bubble in self
            .bubbles
            .iter_mut()
            .filter(|b| b.status == BubbleStatus::Active)
        {
            bubble.y += bubble.speed * frames;
            if bubble.y > BOTTOM_EDGE {
                bubble.y = TOP_EDGE;
                bubble.x = rng.gen_range(0.0..MAX_X);
            }
        }
    }

    pub fn teardown(&mut self) -> usize {
        self.timers.bump_epoch();
        self.timers.cancel_all()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::session::fixtures;
    use crate::session::outcome::Verdict;

    fn drill(pool: &[Entry], seed: u64) -> CaptureDrill {
        let mut rng = SmallRng::seed_from_u64(seed);
        CaptureDrill::new(pool, &MistakeLedger::new(), &DrillRules::default(), &mut rng).unwrap()
    }

    fn bubble_for(drill: &CaptureDrill, identity: &str) -> u64 {
        drill
            .bubbles()
            .iter()
            .find(|b| b.entry.identity() == identity && b.status == BubbleStatus::Active)
            .map(|b| b.id)
            .unwrap()
    }

    fn wrong_bubble(drill: &CaptureDrill) -> u64 {
        let wanted = drill.current_target().unwrap().entry.identity().to_string();
        drill
            .bubbles()
            .iter()
            .find(|b| b.entry.identity() != wanted && b.status == BubbleStatus::Active)
            .map(|b| b.id)
            .unwrap()
    }

    #[test]
    fn test_refuses_small_pool() {
        let mut rng = SmallRng::seed_from_u64(1);
        let pool = fixtures::numbered("w", 4);
        let err = CaptureDrill::new(&pool, &MistakeLedger::new(), &DrillRules::default(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientVocabulary { needed: 5, .. }));
    }

    #[test]
    fn test_five_word_pool_starts_playing_at_zero() {
        let pool = fixtures::words(&["sun", "moon", "star", "sky", "cloud"]);
        let mut d = drill(&pool, 2);
        assert_eq!(d.phase(), CapturePhase::Playing { target: 0 });
        assert_eq!(d.targets().len(), 5);
        assert_eq!(d.bubbles().len(), 5);

        let first = d.targets()[0].entry.identity().to_string();
        let id = bubble_for(&d, &first);
        let outcome = d.select_bubble(id);
        assert_eq!(outcome.verdict, Verdict::Correct);
        assert_eq!(d.target_index(), Some(1));
        assert!(d.targets()[0].collected);
    }

    #[test]
    fn test_bubbles_include_distractors() {
        let pool = fixtures::numbered("w", 12);
        let d = drill(&pool, 3);
        assert_eq!(d.bubbles().len(), 10);
        assert!(d.bubbles().iter().all(|b| b.y < TOP_EDGE + 0.001));
    }

    #[test]
    fn test_wrong_bubble_charges_current_target() {
        let pool = fixtures::numbered("w", 10);
        let mut d = drill(&pool, 4);
        let wanted = d.current_target().unwrap().entry.identity().to_string();
        let id = wrong_bubble(&d);

        let outcome = d.select_bubble(id);
        assert_eq!(outcome.verdict, Verdict::Incorrect);
        assert_eq!(outcome.ledger_delta(), &[wanted]);
        assert_eq!(d.target_index(), Some(0));
        let clicked = d.bubbles().iter().find(|b| b.id == id).unwrap();
        assert_eq!(clicked.status, BubbleStatus::Dispersed);
    }

    #[test]
    fn test_collecting_all_targets_wins() {
        let pool = fixtures::numbered("w", 8);
        let mut d = drill(&pool, 5);
        for i in 0..5 {
            let wanted = d.targets()[i].entry.identity().to_string();
            let id = bubble_for(&d, &wanted);
            assert!(d.select_bubble(id).is_correct());
        }
        assert_eq!(d.phase(), CapturePhase::Won);
        assert!(!d.is_animating());
        assert!(d.targets().iter().all(|t| t.collected));

        let any = d.bubbles()[0].id;
        assert_eq!(d.select_bubble(any).verdict, Verdict::Ignored);
    }

    #[test]
    fn test_resolved_bubbles_removed_after_grace_window() {
        let pool = fixtures::numbered("w", 10);
        let mut d = drill(&pool, 6);
        let id = wrong_bubble(&d);
        d.select_bubble(id);
        assert_eq!(d.select_bubble(id).verdict, Verdict::Ignored);

        d.advance_timers(Duration::from_millis(300));
        assert!(d.bubbles().iter().any(|b| b.id == id));
        d.advance_timers(Duration::from_millis(300));
        assert!(!d.bubbles().iter().any(|b| b.id == id));
        assert_eq!(d.bubbles().len(), 9);
    }

    #[test]
    fn test_bubbles_wrap_instead_of_leaving() {
        let pool = fixtures::numbered("w", 10);
        let mut d = drill(&pool, 7);
        let mut rng = SmallRng::seed_from_u64(70);
        for _ in 0..2000 {
            d.advance_frame(Duration::from_millis(16), &mut rng);
            for b in d.bubbles() {
                assert!(b.y <= BOTTOM_EDGE);
                assert!((0.0..MAX_X).contains(&b.x));
            }
        }
        assert_eq!(d.bubbles().len(), 10);
    }

    #[test]
    fn test_frames_do_not_move_after_win() {
        let pool = fixtures::numbered("w", 5);
        let mut d = drill(&pool, 8);
        for i in 0..5 {
            let wanted = d.targets()[i].entry.identity().to_string();
            let id = bubble_for(&d, &wanted);
            d.select_bubble(id);
        }
        let before: Vec<f64> = d.bubbles().iter().map(|b| b.y).collect();
        let mut rng = SmallRng::seed_from_u64(80);
        d.advance_frame(Duration::from_secs(1), &mut rng);
        let after: Vec<f64> = d.bubbles().iter().map(|b| b.y).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_teardown_cancels_pending_removals() {
        let pool = fixtures::numbered("w", 10);
        let mut d = drill(&pool, 9);
        let id = wrong_bubble(&d);
        d.select_bubble(id);
        assert_eq!(d.teardown(), 1);
        assert_eq!(d.teardown(), 0);
        d.advance_timers(Duration::from_secs(5));
        assert!(d.bubbles().iter().any(|b| b.id == id));
    }
}
