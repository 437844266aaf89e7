//! BM25 Ranker (C8): scores a candidate document set against a
//! multi-term query using posting lists and collection statistics.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::stats::CollectionStats;

pub struct Bm25Ranker {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Ranker {
    fn default() -> Self {
        Bm25Ranker { k1: 1.5, b: 0.75 }
    }
}

impl Bm25Ranker {
    pub fn new(k1: f64, b: f64) -> Self {
        Bm25Ranker { k1, b }
    }

    /// Ranks the candidate set implied by `postings_by_term` (a map from
    /// each *distinct* query term present in the index to its posting
    /// list) against `stats`, returning the top `top_k` `(doc_id, score)`
    /// pairs in descending score order, ties broken by `doc_id` ascending.
    ///
    /// `query_tokens` may repeat terms; repeats do not inflate the score
    /// because only the distinct terms found in `postings_by_term` are
    /// iterated.
    pub fn rank(
        &self,
        query_tokens: &[String],
        postings_by_term: &HashMap<String, BTreeMap<String, u32>>,
        stats: &CollectionStats,
        top_k: usize,
    ) -> Vec<(String, f64)> {
        let distinct_terms: HashSet<&String> = query_tokens
            .iter()
            .filter(|t| postings_by_term.contains_key(*t))
            .collect();

        let mut candidates: Vec<String> = distinct_terms
            .iter()
            .flat_map(|t| postings_by_term[*t].keys())
            .collect::<HashSet<&String>>()
            .into_iter()
            .cloned()
            .collect();
        candidates.sort();

        if candidates.is_empty() {
            return Vec::new();
        }

        let doc_index: HashMap<&str, usize> =
            candidates.iter().enumerate().map(|(i, d)| (d.as_str(), i)).collect();

        let n = stats.n as f64;
        let avgdl = stats.avgdl;
        let mut scores = vec![0.0_f64; candidates.len()];

        for term in &distinct_terms {
            let postings = &postings_by_term[*term];
            if postings.is_empty() {
                continue;
            }
            let df = postings.len() as f64;
            let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

            for (doc_id, &tf) in postings {
                let i = doc_index[doc_id.as_str()];
                let length = stats.doc_lengths.get(doc_id).copied().unwrap_or(0) as f64;
                let tf = tf as f64;
                let denom = tf + self.k1 * (1.0 - self.b + self.b * length / avgdl.max(1e-9));
                scores[i] += idf * (tf * (self.k1 + 1.0)) / denom;
            }
        }

        let mut ranked: Vec<(String, f64)> =
            candidates.into_iter().zip(scores).collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(top_k);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_stats() -> CollectionStats {
        let mut stats = CollectionStats::new();
        stats.observe("d1", 3);
        stats.observe("d2", 2);
        stats.observe("d3", 3);
        stats.finalize();
        stats
    }

    fn postings(pairs: &[(&str, u32)]) -> BTreeMap<String, u32> {
        pairs.iter().map(|(d, tf)| (d.to_string(), *tf)).collect()
    }

    fn scenario_postings() -> HashMap<String, BTreeMap<String, u32>> {
        let mut map = HashMap::new();
        map.insert("apple".to_string(), postings(&[("d1", 2), ("d2", 1)]));
        map.insert("banana".to_string(), postings(&[("d1", 1), ("d3", 2)]));
        map.insert("cherry".to_string(), postings(&[("d2", 1)]));
        map.insert("date".to_string(), postings(&[("d3", 1)]));
        map
    }

    #[test]
    fn scenario_1_apple_ranks_d1_above_d2_and_excludes_d3() {
        let ranker = Bm25Ranker::default();
        let stats = scenario_stats();
        let postings = scenario_postings();
        let ranked = ranker.rank(&["apple".to_string()], &postings, &stats, 3);

        let doc_ids: Vec<&str> = ranked.iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(doc_ids, vec!["d1", "d2"]);
        assert!(ranked[0].1 > ranked[1].1);
    }

    #[test]
    fn scenario_2_banana_date_ranks_d3_above_d1() {
        let ranker = Bm25Ranker::default();
        let stats = scenario_stats();
        let postings = scenario_postings();
        let ranked = ranker.rank(
            &["banana".to_string(), "date".to_string()],
            &postings,
            &stats,
            3,
        );
        let doc_ids: Vec<&str> = ranked.iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(doc_ids, vec!["d3", "d1"]);
        assert!(ranked[0].1 > ranked[1].1);
    }

    #[test]
    fn scenario_3_unknown_term_returns_empty() {
        let ranker = Bm25Ranker::default();
        let stats = scenario_stats();
        let postings = scenario_postings();
        let ranked = ranker.rank(&["kiwi".to_string()], &postings, &stats, 3);
        assert!(ranked.is_empty());
    }

    #[test]
    fn scenario_4_duplicate_query_term_is_idempotent() {
        let ranker = Bm25Ranker::default();
        let stats = scenario_stats();
        let postings = scenario_postings();
        let single = ranker.rank(&["apple".to_string()], &postings, &stats, 3);
        let doubled =
            ranker.rank(&["apple".to_string(), "apple".to_string()], &postings, &stats, 3);
        assert_eq!(single, doubled);
    }

    #[test]
    fn monotonicity_more_occurrences_strictly_increase_score() {
        let ranker = Bm25Ranker::default();
        let stats = scenario_stats();
        let mut postings = HashMap::new();
        postings.insert("apple".to_string(), postings_map(&[("d1", 1)]));
        let low = ranker.rank(&["apple".to_string()], &postings, &stats, 1)[0].1;

        postings.insert("apple".to_string(), postings_map(&[("d1", 5)]));
        let high = ranker.rank(&["apple".to_string()], &postings, &stats, 1)[0].1;

        assert!(high > low);
    }

    fn postings_map(pairs: &[(&str, u32)]) -> BTreeMap<String, u32> {
        pairs.iter().map(|(d, tf)| (d.to_string(), *tf)).collect()
    }

    #[test]
    fn empty_query_returns_empty() {
        let ranker = Bm25Ranker::default();
        let stats = scenario_stats();
        let postings = scenario_postings();
        let ranked = ranker.rank(&[], &postings, &stats, 3);
        assert!(ranked.is_empty());
    }
}
