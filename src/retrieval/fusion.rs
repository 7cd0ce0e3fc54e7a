//! Weighted reciprocal rank fusion
//!
//! Each ranked list contributes `weight / (rank + c)` per key, with 1-based
//! ranks. Only the first occurrence of a key within a list counts. Scores are
//! summed across lists and the result is sorted by score descending; equal
//! scores keep the order in which keys first appear across the concatenated
//! lists.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Rank offset used by the standard formulation
pub const RRF_C: f64 = 60.0;

/// Key with its fused score
#[derive(Debug, Clone, PartialEq)]
pub struct Fused<K> {
    pub key: K,
    pub score: f64,
}

/// Equal-weight fusion (`1/n` per list)
pub fn fuse_equal<K>(lists: &[Vec<K>]) -> Vec<Fused<K>>
where
    K: Clone + Eq + Hash,
{
    if lists.is_empty() {
        return Vec::new();
    }
    let weight = 1.0 / lists.len() as f64;
    let weights = vec![weight; lists.len()];
    fuse_weighted(lists, &weights, RRF_C)
}

/// Weighted fusion; `weights[i]` applies to `lists[i]`
///
/// Lists without a matching weight contribute nothing.
pub fn fuse_weighted<K>(lists: &[Vec<K>], weights: &[f64], c: f64) -> Vec<Fused<K>>
where
    K: Clone + Eq + Hash,
{
    // key -> (score, first appearance)
    let mut scores: HashMap<K, (f64, usize)> = HashMap::new();
    let mut appearance = 0usize;

    for (list, &weight) in lists.iter().zip(weights) {
        let mut counted: HashSet<&K> = HashSet::with_capacity(list.len());
        for (idx, key) in list.iter().enumerate() {
            if !counted.insert(key) {
                continue;
            }
            let contribution = weight / ((idx + 1) as f64 + c);
            let entry = scores.entry(key.clone()).or_insert((0.0, appearance));
            entry.0 += contribution;
            appearance += 1;
        }
    }

    let mut fused: Vec<(K, f64, usize)> = scores
        .into_iter()
        .map(|(key, (score, first))| (key, score, first))
        .collect();
    fused.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.2.cmp(&b.2))
    });

    fused
        .into_iter()
        .map(|(key, score, _)| Fused { key, score })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn keys(fused: &[Fused<&'static str>]) -> Vec<&'static str> {
        fused.iter().map(|f| f.key).collect()
    }

    #[test]
    fn test_item_in_both_lists_wins() {
        let fused = fuse_equal(&[vec!["a", "b", "c"], vec!["c", "d"]]);
        assert_eq!(keys(&fused)[0], "c");
        assert_eq!(fused.len(), 4);
    }

    #[test]
    fn test_ties_keep_first_appearance() {
        // a and x both sit at rank 1 of one list
        let fused = fuse_equal(&[vec!["a", "b"], vec!["x", "y"]]);
        assert_eq!(keys(&fused), vec!["a", "x", "b", "y"]);
    }

    #[test]
    fn test_duplicates_within_list_keep_best_rank() {
        let fused = fuse_equal(&[vec!["a", "b", "a"]]);
        assert_eq!(keys(&fused), vec!["a", "b"]);
        assert!((fused[0].score - 1.0 / 61.0).abs() < 1e-12);
    }

    #[test]
    fn test_scores_use_one_based_rank() {
        let fused = fuse_equal(&[vec!["a"], vec!["a"]]);
        assert!((fused[0].score - 1.0 / 61.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(fuse_equal::<&str>(&[]).is_empty());
        assert!(fuse_equal::<&str>(&[vec![], vec![]]).is_empty());
    }

    #[test]
    fn test_weighted_prefers_heavier_list() {
        let fused = fuse_weighted(&[vec!["a"], vec!["b"]], &[0.3, 0.7], RRF_C);
        assert_eq!(keys(&fused), vec!["b", "a"]);
    }

    proptest! {
        #[test]
        fn prop_fused_keys_unique_and_complete(
            a in proptest::collection::vec(0u8..20, 0..15),
            b in proptest::collection::vec(0u8..20, 0..15),
        ) {
            let fused = fuse_equal(&[a.clone(), b.clone()]);
            let mut out: Vec<u8> = fused.iter().map(|f| f.key).collect();
            let mut expected: Vec<u8> = a.iter().chain(b.iter()).copied().collect();
            expected.sort_unstable();
            expected.dedup();
            out.sort_unstable();
            prop_assert_eq!(out.len(), fused.len());
            prop_assert_eq!(out, expected);
        }

        #[test]
        fn prop_fusion_is_deterministic(
            a in proptest::collection::vec(0u8..10, 0..10),
            b in proptest::collection::vec(0u8..10, 0..10),
        ) {
            let first = fuse_equal(&[a.clone(), b.clone()]);
            let second = fuse_equal(&[a, b]);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_scores_descending(
            a in proptest::collection::vec(0u8..10, 0..10),
            b in proptest::collection::vec(0u8..10, 0..10),
        ) {
            let fused = fuse_equal(&[a, b]);
            for pair in fused.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
        }
    }
}
