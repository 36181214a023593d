//! Approximate text similarity.
//!
//! The score blends three signals over case-folded, whitespace-normalized text:
//! how much of the query survives as an in-order subsequence of the candidate,
//! edit-distance similarity, and whole-token overlap. Partial matches such as
//! "hello" against "hello there" score high without being identical.

const SUBSEQUENCE_WEIGHT: f64 = 0.5;
const EDIT_WEIGHT: f64 = 0.3;
const TOKEN_WEIGHT: f64 = 0.2;

/// Minimum score for a candidate to count as "related" when picking distractors.
pub const RELATED_THRESHOLD: f64 = 0.3;

/// Minimum score for a dictionary search hit.
pub const SEARCH_THRESHOLD: f64 = 0.6;

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn levenshtein_distance(a: &[char], b: &[char]) -> usize {
    let m = a.len();
    let n = b.len();
    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Length of the longest common subsequence.
pub fn common_subsequence_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let n = b.len();
    let mut prev = vec![0usize; n + 1];
    let mut curr = vec![0usize; n + 1];

    for &ca in a {
        for j in 1..=n {
            curr[j] = if ca == b[j - 1] {
                prev[j - 1] + 1
            } else {
                prev[j].max(curr[j - 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

fn token_overlap(query: &str, candidate: &str) -> f64 {
    let query_tokens: Vec<&str> = query.split(' ').filter(|t| !t.is_empty()).collect();
    if query_tokens.is_empty() {
        return 0.0;
    }
    let candidate_tokens: Vec<&str> = candidate.split(' ').collect();
    let shared = query_tokens
        .iter()
        .filter(|t| candidate_tokens.contains(t))
        .count();
    shared as f64 / query_tokens.len() as f64
}

/// Similarity of `candidate` to `query` in `0.0..=1.0`.
pub fn similarity(query: &str, candidate: &str) -> f64 {
    let query = normalize(query);
    let candidate = normalize(candidate);

    if query.is_empty() || candidate.is_empty() {
        return if query == candidate { 1.0 } else { 0.0 };
    }
    if query == candidate {
        return 1.0;
    }

    let q: Vec<char> = query.chars().collect();
    let c: Vec<char> = candidate.chars().collect();

    let coverage = common_subsequence_len(&q, &c) as f64 / q.len() as f64;
    let max_len = q.len().max(c.len());
    let edit = 1.0 - levenshtein_distance(&q, &c) as f64 / max_len as f64;
    let tokens = token_overlap(&query, &candidate);

    (SUBSEQUENCE_WEIGHT * coverage + EDIT_WEIGHT * edit + TOKEN_WEIGHT * tokens).clamp(0.0, 1.0)
}

/// Indices of `candidates` scoring at least `threshold` against `query`,
/// best first. Ties keep their input order.
pub fn rank<'a, I>(query: &str, candidates: I, threshold: f64) -> Vec<(usize, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<(usize, f64)> = candidates
        .into_iter()
        .enumerate()
        .map(|(i, text)| (i, similarity(query, text)))
        .filter(|(_, score)| *score >= threshold)
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance(&chars(""), &chars("")), 0);
        assert_eq!(levenshtein_distance(&chars("abc"), &chars("")), 3);
        assert_eq!(levenshtein_distance(&chars("kitten"), &chars("sitting")), 3);
        assert_eq!(levenshtein_distance(&chars("saturday"), &chars("sunday")), 3);
    }

    #[test]
    fn test_common_subsequence_len() {
        assert_eq!(common_subsequence_len(&chars("hello"), &chars("hello there")), 5);
        assert_eq!(common_subsequence_len(&chars("hello"), &chars("help")), 3);
        assert_eq!(common_subsequence_len(&chars("abc"), &chars("xyz")), 0);
    }

    #[test]
    fn test_identical_scores_one() {
        assert_eq!(similarity("Water", "  water "), 1.0);
    }

    #[test]
    fn test_related_beats_unrelated() {
        let there = similarity("hello", "hello there");
        let help = similarity("hello", "help");
        let water = similarity("hello", "water");
        let book = similarity("hello", "book");
        assert!(there > water && there > book, "{there} vs {water}/{book}");
        assert!(help > water && help > book, "{help} vs {water}/{book}");
        assert!(there >= RELATED_THRESHOLD);
        assert!(help >= RELATED_THRESHOLD);
        assert!(water < RELATED_THRESHOLD);
    }

    #[test]
    fn test_rank_orders_and_filters() {
        let pool = ["water", "hello there", "help", "book"];
        let ranked = rank("hello", pool.iter().copied(), RELATED_THRESHOLD);
        let indices: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(similarity("", "water"), 0.0);
        assert_eq!(similarity("", ""), 1.0);
    }
}
