use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::dictionary::view::dedupe_by_identity;
use crate::dictionary::{Entry, Language};
use crate::engine::distractor::{self, DEFAULT_DISTRACTORS};
use crate::engine::scheduler::Timers;
use crate::error::EngineError;
use crate::session::outcome::{Effects, Outcome};
use crate::session::{DrillKind, DrillRules, ensure_pool};

pub const MIN_QUIZ_POOL: usize = 4;

#[derive(Clone, Debug, PartialEq)]
pub struct Question {
    pub entry: Entry,
    pub options: Vec<String>,
    answer_index: usize,
}

impl Question {
    pub fn prompt(&self) -> &str {
        self.entry.identity()
    }

    pub fn answer(&self) -> &str {
        &self.options[self.answer_index]
    }

    pub fn answer_index(&self) -> usize {
        self.answer_index
    }

    /// Graded by position, so a distractor can never pass for the answer.
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.answer_index
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizPhase {
    AwaitingAnswer,
    Revealed { chosen: usize, correct: bool },
}

#[derive(Debug)]
enum QuizTimer {
    Next,
}

/// Multiple-choice translation quiz.
#[derive(Debug)]
pub struct QuizDrill {
    words: Vec<Entry>,
    phrases: Vec<Entry>,
    language: Language,
    question: Question,
    phase: QuizPhase,
    score: u32,
    asked: u32,
    reveal_delay: Duration,
    celebration: Duration,
    timers: Timers<QuizTimer>,
}

impl QuizDrill {
    pub fn new<R: Rng + ?Sized>(
        words: &[Entry],
        phrases: &[Entry],
        rules: &DrillRules,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        let words = dedupe_by_identity(words);
        let phrases = dedupe_by_identity(phrases);
        ensure_pool(DrillKind::Quiz, words.len() + phrases.len(), MIN_QUIZ_POOL)?;

        let question = build_question(&words, &phrases, rules.language, rng);
        info!(
            words = words.len(),
            phrases = phrases.len(),
            language = %rules.language,
            "quiz ready"
        );

        Ok(Self {
            words,
            phrases,
            language: rules.language,
            question,
            phase: QuizPhase::AwaitingAnswer,
            score: 0,
            asked: 0,
            reveal_delay: rules.quiz_reveal,
            celebration: rules.celebration,
            timers: Timers::new(),
        })
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn asked(&self) -> u32 {
        self.asked
    }

    /// Running `(correct, asked)` tally for this session.
    pub fn tally(&self) -> (u32, u32) {
        (self.score, self.asked)
    }

    /// Only the first answer to a question counts.
    pub fn answer(&mut self, option: usize) -> Outcome {
        if self.phase != QuizPhase::AwaitingAnswer || option >= self.question.options.len() {
            return Outcome::ignored();
        }

        self.asked += 1;
        let correct = self.question.is_correct(option);
        self.phase = QuizPhase::Revealed {
            chosen: option,
            correct,
        };

        if correct {
            self.score += 1;
            self.timers.schedule(self.celebration, QuizTimer::Next);
            Outcome::correct(Effects::score(1))
        } else {
            self.timers.schedule(self.reveal_delay, QuizTimer::Next);
            Outcome::incorrect(Effects::mistake(self.question.entry.identity()))
        }
    }

    /// Visual-completion signal after a correct answer. Incorrect reveals
    /// wait out their own delay regardless.
    pub fn celebration_done<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Outcome {
        match self.phase {
            QuizPhase::Revealed { correct: true, .. } => {
                // Drop the fallback timer for this question.
                self.timers.bump_epoch();
                self.next_question(rng);
                Outcome::accepted()
            }
            _ => Outcome::ignored(),
        }
    }

    pub fn advance_timers<R: Rng + ?Sized>(&mut self, elapsed: Duration, rng: &mut R) -> Effects {
        for timer in self.timers.advance(elapsed) {
            match timer {
                QuizTimer::Next => {
                    if matches!(self.phase, QuizPhase::Revealed { .. }) {
                        self.next_question(rng);
                    }
                }
            }
        }
        Effects::default()
    }

    fn next_question<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.question = build_question(&self.words, &self.phrases, self.language, rng);
        self.phase = QuizPhase::AwaitingAnswer;
        debug!(prompt = %self.question.prompt(), "next question");
    }

    pub fn teardown(&mut self) -> usize {
        self.timers.bump_epoch();
        self.timers.cancel_all()
    }
}

/// Pick phrases or words with equal odds. A side too small to supply three
/// distractors defers to the other side, and to the combined pool if both are.
fn question_source(words: &[Entry], phrases: &[Entry], prefer_phrases: bool) -> Vec<Entry> {
    let (first, second) = if prefer_phrases {
        (phrases, words)
    } else {
        (words, phrases)
    };
    if first.len() >= MIN_QUIZ_POOL {
        first.to_vec()
    } else if second.len() >= MIN_QUIZ_POOL {
        second.to_vec()
    } else {
        first.iter().chain(second.iter()).cloned().collect()
    }
}

fn build_question<R: Rng + ?Sized>(
    words: &[Entry],
    phrases: &[Entry],
    language: Language,
    rng: &mut R,
) -> Question {
    let source = question_source(words, phrases, rng.gen_bool(0.5));
    let idx = rng.gen_range(0..source.len());
    let entry = source[idx].clone();

    let answer = entry.translation(language).to_string();
    // Options must read differently from the answer and from each other.
    let mut seen: HashSet<&str> = HashSet::from([answer.as_str()]);
    let candidates: Vec<Entry> = source
        .iter()
        .filter(|e| {
            let text = e.translation(language);
            !text.is_empty() && seen.insert(text)
        })
        .cloned()
        .collect();
    let others = distractor::distractors(&entry, &candidates, DEFAULT_DISTRACTORS, rng);

    let mut options: Vec<String> = std::iter::once(answer)
        .chain(others.iter().map(|e| e.translation(language).to_string()))
        .collect();
    let mut order: Vec<usize> = (0..options.len()).collect();
    order.shuffle(rng);
    let answer_index = order.iter().position(|&i| i == 0).unwrap_or(0);
    options = order.into_iter().map(|i| std::mem::take(&mut options[i])).collect();

    Question {
        entry,
        options,
        answer_index,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::session::fixtures;
    use crate::session::outcome::Verdict;

    fn phrases(n: usize) -> Vec<Entry> {
        (0..n)
            .map(|i| {
                let name = format!("phrase number {i}");
                Entry::phrase(&name, &format!("{name} te"), &format!("{name} ko"))
            })
            .collect()
    }

    fn quiz(seed: u64) -> (QuizDrill, SmallRng) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let drill = QuizDrill::new(
            &fixtures::numbered("w", 6),
            &phrases(5),
            &DrillRules::default(),
            &mut rng,
        )
        .unwrap();
        (drill, rng)
    }

    fn correct_index(drill: &QuizDrill) -> usize {
        let q = drill.question();
        (0..q.options.len()).find(|&i| q.is_correct(i)).unwrap()
    }

    fn wrong_index(drill: &QuizDrill) -> usize {
        let q = drill.question();
        (0..q.options.len()).find(|&i| !q.is_correct(i)).unwrap()
    }

    #[test]
    fn test_refuses_fewer_than_four_entries() {
        let mut rng = SmallRng::seed_from_u64(1);
        let err = QuizDrill::new(
            &fixtures::numbered("w", 2),
            &phrases(1),
            &DrillRules::default(),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientVocabulary { needed: 4, available: 3, .. }));
    }

    #[test]
    fn test_shared_translation_not_marked_correct() {
        let words = vec![
            Entry::word("river", "nadi", "nhoi"),
            Entry::word("stream", "vaagu", "nhoi"),
            Entry::word("brook", "kaluva", "nhoi"),
            Entry::word("pond", "cheruvu", ""),
            Entry::word("lake", "sarassu", "tollem"),
            Entry::word("sea", "samudram", "dorya"),
        ];
        for seed in 0..40 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let q = build_question(&words, &[], Language::Konkani, &mut rng);
            let correct: Vec<usize> = (0..q.options.len()).filter(|&i| q.is_correct(i)).collect();
            assert_eq!(correct, vec![q.answer_index()]);
            assert_eq!(q.answer(), q.entry.translation(Language::Konkani));
            assert_eq!(q.options.iter().filter(|o| *o == q.answer()).count(), 1);
            let distinct: HashSet<&String> = q.options.iter().collect();
            assert_eq!(distinct.len(), q.options.len());
            for (i, option) in q.options.iter().enumerate() {
                if i != q.answer_index() {
                    assert!(!option.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_question_has_four_distinct_options_with_answer() {
        for seed in 0..20 {
            let (drill, _) = quiz(seed);
            let q = drill.question();
            assert_eq!(q.options.len(), 4);
            assert!(q.options.contains(&q.answer().to_string()));
            assert_eq!(q.answer(), q.entry.translation(Language::Konkani));
            let mut sorted = q.options.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), 4);
        }
    }

    #[test]
    fn test_options_come_from_the_same_kind() {
        for seed in 0..20 {
            let (drill, _) = quiz(seed);
            let q = drill.question();
            let phrase = q.entry.english.starts_with("phrase");
            for option in &q.options {
                assert_eq!(option.starts_with("phrase"), phrase, "{option}");
            }
        }
    }

    #[test]
    fn test_small_side_falls_back() {
        let mut rng = SmallRng::seed_from_u64(3);
        let drill = QuizDrill::new(
            &fixtures::numbered("w", 4),
            &phrases(1),
            &DrillRules::default(),
            &mut rng,
        )
        .unwrap();
        assert!(drill.question().entry.english.starts_with('w'));
        assert_eq!(drill.question().options.len(), 4);

        let drill = QuizDrill::new(
            &fixtures::numbered("w", 2),
            &phrases(2),
            &DrillRules::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(drill.question().options.len(), 4);
    }

    #[test]
    fn test_correct_answer_scores_and_waits_for_celebration() {
        let (mut drill, mut rng) = quiz(4);
        let idx = correct_index(&drill);
        let outcome = drill.answer(idx);
        assert!(outcome.is_correct());
        assert_eq!(outcome.score_delta(), 1);
        assert!(outcome.ledger_delta().is_empty());
        assert_eq!(drill.tally(), (1, 1));
        assert_eq!(
            drill.phase(),
            QuizPhase::Revealed {
                chosen: idx,
                correct: true
            }
        );

        assert_eq!(drill.celebration_done(&mut rng).verdict, Verdict::Accepted);
        assert_eq!(drill.phase(), QuizPhase::AwaitingAnswer);

        // The fallback timer from the previous question must not skip this one.
        drill.advance_timers(Duration::from_secs(5), &mut rng);
        assert_eq!(drill.phase(), QuizPhase::AwaitingAnswer);
    }

    #[test]
    fn test_correct_answer_advances_without_signal() {
        let (mut drill, mut rng) = quiz(5);
        drill.answer(correct_index(&drill));
        drill.advance_timers(Duration::from_millis(1499), &mut rng);
        assert!(matches!(drill.phase(), QuizPhase::Revealed { .. }));
        drill.advance_timers(Duration::from_millis(1), &mut rng);
        assert_eq!(drill.phase(), QuizPhase::AwaitingAnswer);
    }

    #[test]
    fn test_incorrect_answer_records_correct_identity() {
        let (mut drill, mut rng) = quiz(6);
        let expected = drill.question().entry.english.clone();
        let outcome = drill.answer(wrong_index(&drill));
        assert_eq!(outcome.verdict, Verdict::Incorrect);
        assert_eq!(outcome.ledger_delta(), &[expected]);
        assert_eq!(drill.tally(), (0, 1));

        assert_eq!(drill.celebration_done(&mut rng).verdict, Verdict::Ignored);
        assert!(matches!(drill.phase(), QuizPhase::Revealed { correct: false, .. }));

        drill.advance_timers(Duration::from_millis(1999), &mut rng);
        assert!(matches!(drill.phase(), QuizPhase::Revealed { .. }));
        drill.advance_timers(Duration::from_millis(1), &mut rng);
        assert_eq!(drill.phase(), QuizPhase::AwaitingAnswer);
    }

    #[test]
    fn test_only_first_answer_counts() {
        let (mut drill, _) = quiz(7);
        let wrong = wrong_index(&drill);
        let right = correct_index(&drill);
        drill.answer(wrong);
        let before = drill.tally();
        assert_eq!(drill.answer(right).verdict, Verdict::Ignored);
        assert_eq!(drill.answer(wrong).verdict, Verdict::Ignored);
        assert_eq!(drill.tally(), before);
    }

    #[test]
    fn test_out_of_range_option_ignored() {
        let (mut drill, _) = quiz(8);
        assert_eq!(drill.answer(10).verdict, Verdict::Ignored);
        assert_eq!(drill.asked(), 0);
    }

    #[test]
    fn test_teardown_cancels_advance() {
        let (mut drill, mut rng) = quiz(9);
        drill.answer(wrong_index(&drill));
        assert_eq!(drill.teardown(), 1);
        drill.advance_timers(Duration::from_secs(5), &mut rng);
        assert!(matches!(drill.phase(), QuizPhase::Revealed { .. }));
    }
}
