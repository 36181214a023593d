use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::dictionary::Entry;
use crate::engine::fuzzy;

pub const DEFAULT_DISTRACTORS: usize = 3;

/// Wrong-answer candidates for `correct`: the closest textual matches by
/// identity first, topped off with random pool entries. Never contains
/// `correct` or repeated identities.
pub fn distractors<R: Rng + ?Sized>(
    correct: &Entry,
    pool: &[Entry],
    n: usize,
    rng: &mut R,
) -> Vec<Entry> {
    let mut chosen: Vec<Entry> = Vec::with_capacity(n);
    let mut used: HashSet<&str> = HashSet::new();
    used.insert(correct.identity());

    let ranked = fuzzy::rank(
        correct.identity(),
        pool.iter().map(|e| e.identity()),
        fuzzy::RELATED_THRESHOLD,
    );
    for (idx, _) in ranked {
        if chosen.len() >= n {
            break;
        }
        let candidate = &pool[idx];
        if used.insert(candidate.identity()) {
            chosen.push(candidate.clone());
        }
    }

    if chosen.len() < n {
        let mut rest: Vec<&Entry> = pool
            .iter()
            .filter(|e| !used.contains(e.identity()))
            .collect();
        rest.shuffle(rng);
        for candidate in rest {
            if chosen.len() >= n {
                break;
            }
            if used.insert(candidate.identity()) {
                chosen.push(candidate.clone());
            }
        }
    }

    chosen
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn word(english: &str) -> Entry {
        Entry::word(english, &format!("{english}-te"), &format!("{english}-ko"))
    }

    #[test]
    fn test_similar_entries_ranked_first() {
        let mut rng = SmallRng::seed_from_u64(1);
        let correct = word("hello");
        let pool = vec![
            word("water"),
            correct.clone(),
            word("book"),
            word("hello there"),
            word("help"),
            word("river"),
        ];
        let picked = distractors(&correct, &pool, 2, &mut rng);
        let ids: HashSet<&str> = picked.iter().map(|e| e.identity()).collect();
        assert_eq!(ids, HashSet::from(["hello there", "help"]));
    }

    #[test]
    fn test_never_includes_correct_or_duplicates() {
        let mut rng = SmallRng::seed_from_u64(2);
        let correct = word("cat");
        let pool = vec![
            word("cat"),
            word("cart"),
            word("cart"),
            word("dog"),
            word("car"),
            word("cat"),
        ];
        for _ in 0..50 {
            let picked = distractors(&correct, &pool, 3, &mut rng);
            assert!(picked.iter().all(|e| e.identity() != "cat"));
            let ids: HashSet<&str> = picked.iter().map(|e| e.identity()).collect();
            assert_eq!(ids.len(), picked.len());
            assert_eq!(picked.len(), 3);
        }
    }

    #[test]
    fn test_tops_off_with_random_entries() {
        let mut rng = SmallRng::seed_from_u64(3);
        let correct = word("zebra");
        let pool = vec![word("apple"), word("moon"), word("sky"), correct.clone()];
        let picked = distractors(&correct, &pool, 3, &mut rng);
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn test_bounded_by_pool_size() {
        let mut rng = SmallRng::seed_from_u64(4);
        let correct = word("one");
        let pool = vec![correct.clone(), word("two")];
        let picked = distractors(&correct, &pool, 3, &mut rng);
        assert_eq!(picked.len(), 1);
        assert!(distractors(&correct, &[], 3, &mut rng).is_empty());
    }
}
