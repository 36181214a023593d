use rand::Rng;
use rand::seq::SliceRandom;

use crate::dictionary::Entry;
use crate::dictionary::view::dedupe_by_identity;
use crate::engine::ledger::MistakeLedger;

/// Output of a weighted draw: the practice sequence plus extra decoys that
/// share no identity with it.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    pub selected: Vec<Entry>,
    pub distractors: Vec<Entry>,
}

/// Draw `k` entries biased toward historically missed ones, plus up to `k`
/// uniformly drawn decoys from the remainder.
///
/// Callers check the minimum pool size first; if the pool is smaller than `k`
/// the whole (deduplicated) pool is returned as the selection.
pub fn select<R: Rng + ?Sized>(
    pool: &[Entry],
    ledger: &MistakeLedger,
    k: usize,
    rng: &mut R,
) -> Selection {
    let pool = dedupe_by_identity(pool);

    let mut weighted: Vec<(Entry, u32)> = pool
        .into_iter()
        .map(|entry| {
            let weight = ledger.weight(entry.identity());
            (entry, weight)
        })
        .collect();

    // Shuffle first so the stable sort leaves each tie group in random order.
    weighted.shuffle(rng);
    weighted.sort_by(|a, b| b.1.cmp(&a.1));

    let ordered = weighted_permutation(weighted, rng);

    let take = k.min(ordered.len());
    let mut rest = ordered;
    let selected: Vec<Entry> = rest.drain(..take).collect();

    rest.shuffle(rng);
    rest.truncate(k);

    Selection {
        selected,
        distractors: rest,
    }
}

/// Random permutation where an entry with weight `w` behaves as if it had
/// `w + 1` tickets (Efraimidis-Spirakis keys). Zero-weight pools come out
/// uniformly shuffled.
fn weighted_permutation<R: Rng + ?Sized>(items: Vec<(Entry, u32)>, rng: &mut R) -> Vec<Entry> {
    let mut keyed: Vec<(f64, Entry)> = items
        .into_iter()
        .map(|(entry, weight)| {
            let u: f64 = rng.gen_range(f64::EPSILON..=1.0);
            (u.powf(1.0 / (1.0 + weight as f64)), entry)
        })
        .collect();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
    keyed.into_iter().map(|(_, entry)| entry).collect()
}
