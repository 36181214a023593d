/// A player action addressed to the active round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    /// Leave the lane drill's ready screen.
    Start,
    /// Click a capture bubble.
    Bubble(u64),
    /// Pick up a lane tile; it stops moving while held.
    Grab(u64),
    /// Let go of a held tile without dropping it on a slot.
    Release,
    /// Drop a lane tile on a target slot.
    Drop { tile: u64, slot: usize },
    /// Pick a quiz option by display index.
    Answer(usize),
    /// Host signal that the quiz celebration finished.
    Continue,
    /// Pair-match: select an English item.
    Left(usize),
    /// Pair-match: select a translation item.
    Right(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    /// Acted on, but not a graded answer (start, grab, left selection).
    Accepted,
    /// No state change.
    Ignored,
}

/// Side effects a drill asks its owner to persist.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Effects {
    /// One identity per mistake increment.
    pub mistakes: Vec<String>,
    pub score_delta: u32,
    /// Set when a finished session beat the stored high score.
    pub new_high_score: Option<u32>,
}

impl Effects {
    pub fn mistake(identity: &str) -> Self {
        Self {
            mistakes: vec![identity.to_string()],
            ..Self::default()
        }
    }

    pub fn score(delta: u32) -> Self {
        Self {
            score_delta: delta,
            ..Self::default()
        }
    }

    pub fn merge(&mut self, other: Effects) {
        self.mistakes.extend(other.mistakes);
        self.score_delta += other.score_delta;
        if other.new_high_score.is_some() {
            self.new_high_score = other.new_high_score;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mistakes.is_empty() && self.score_delta == 0 && self.new_high_score.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub verdict: Verdict,
    pub effects: Effects,
}

impl Outcome {
    pub fn correct(effects: Effects) -> Self {
        Self {
            verdict: Verdict::Correct,
            effects,
        }
    }

    pub fn incorrect(effects: Effects) -> Self {
        Self {
            verdict: Verdict::Incorrect,
            effects,
        }
    }

    pub fn accepted() -> Self {
        Self {
            verdict: Verdict::Accepted,
            effects: Effects::default(),
        }
    }

    pub fn ignored() -> Self {
        Self {
            verdict: Verdict::Ignored,
            effects: Effects::default(),
        }
    }

    pub fn is_correct(&self) -> bool {
        self.verdict == Verdict::Correct
    }

    pub fn ledger_delta(&self) -> &[String] {
        &self.effects.mistakes
    }

    pub fn score_delta(&self) -> u32 {
        self.effects.score_delta
    }
}
