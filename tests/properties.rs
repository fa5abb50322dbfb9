//! Property-based invariants from the retrieval core's testable-properties
//! list: corpus aggregates, BM25 monotonicity, LSH banding, and ranking
//! determinism.

use std::collections::HashSet;

use proptest::prelude::*;

use retrieval_core::{Analyzer, Bm25Params, Bm25Ranker, InvertedIndex, LshConfig, LshInvertedIndex};

fn word() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["cat", "dog", "bird", "the", "runs", "jumps", "quick", "fox"])
        .prop_map(|s| s.to_string())
}

fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(word(), 1..12).prop_map(|words| words.join(" "))
}

fn corpus() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(document(), 0..8)
        .prop_map(|docs| docs.into_iter().enumerate().map(|(i, d)| (format!("d{i}"), d)).collect())
}

proptest! {
    #[test]
    fn total_doc_length_equals_sum_of_posting_frequencies(corpus in corpus()) {
        let analyzer = Analyzer::default();
        let index = InvertedIndex::create(corpus, &analyzer);

        let mut sum: u64 = 0;
        for term in ["cat", "dog", "bird", "runs", "jumps", "quick", "fox"] {
            if let Some(list) = index.get(term) {
                sum += list.iter().map(|p| p.frequency as u64).sum::<u64>();
            }
        }
        prop_assert_eq!(sum, index.total_doc_length());
    }

    #[test]
    fn document_frequency_matches_distinct_doc_ids_in_posting_list(corpus in corpus()) {
        let analyzer = Analyzer::default();
        let index = InvertedIndex::create(corpus, &analyzer);

        for term in ["cat", "dog", "bird", "runs", "jumps", "quick", "fox"] {
            if let Some(list) = index.get(term) {
                let distinct: HashSet<_> = list.iter().map(|p| p.doc_id.clone()).collect();
                prop_assert_eq!(index.document_frequency(term), distinct.len());
            }
        }
    }

    #[test]
    fn bm25_score_is_non_negative_for_positive_document_frequency(
        tf in 0.0f32..50.0,
        doc_length in 1usize..500,
        n in 1usize..1000,
        df in 1usize..1000,
        avgdl in 1.0f32..200.0,
    ) {
        let df = df.min(n);
        let term_idf = retrieval_core::idf(n, df);
        let score = retrieval_core::bm25_term_score(tf, doc_length, term_idf, avgdl, &Bm25Params::default());
        prop_assert!(score >= 0.0);
    }

    #[test]
    fn bm25_score_is_monotonic_in_term_frequency(
        doc_length in 1usize..500,
        avgdl in 1.0f32..200.0,
        low_tf in 0.0f32..20.0,
        delta in 0.01f32..20.0,
    ) {
        let params = Bm25Params::default();
        let term_idf = 1.0;
        let high_tf = low_tf + delta;
        let low_score = retrieval_core::bm25_term_score(low_tf, doc_length, term_idf, avgdl, &params);
        let high_score = retrieval_core::bm25_term_score(high_tf, doc_length, term_idf, avgdl, &params);
        prop_assert!(high_score >= low_score - 1e-5);
    }

    #[test]
    fn every_document_lands_in_exactly_band_count_bands(corpus in corpus()) {
        let config = LshConfig {
            shingle_size: 2,
            signature_length: 16,
            band_count: 4,
            seed: 7,
        };
        let analyzer = Analyzer::default();
        let exact = InvertedIndex::create(corpus.clone(), &analyzer);
        let index = LshInvertedIndex::create(corpus.clone(), &exact, &config).unwrap();
        let candidate_terms = index_terms(&index);

        for (doc_id, _) in &corpus {
            let mut band_indices: HashSet<usize> = HashSet::new();
            for term in &candidate_terms {
                if let Some(buckets) = index.get(term) {
                    for bucket in buckets {
                        if bucket.doc_refs().iter().any(|r| &r.doc_id == doc_id) {
                            band_indices.insert(bucket.band_index());
                        }
                    }
                }
            }
            if !band_indices.is_empty() {
                prop_assert_eq!(band_indices.len(), config.band_count);
            }
        }
    }

    #[test]
    fn ranking_is_deterministic_across_repeated_calls(corpus in corpus()) {
        let analyzer = Analyzer::default();
        let index = InvertedIndex::create(corpus, &analyzer);
        let ranker = Bm25Ranker::new(&index, Bm25Params::default());
        let query = vec!["cat".to_string(), "dog".to_string()];

        let first = ranker.rank(&query, 10, false);
        let second = ranker.rank(&query, 10, false);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn top_k_is_a_prefix_of_the_unbounded_ranking(corpus in corpus(), k in 0usize..6) {
        let analyzer = Analyzer::default();
        let index = InvertedIndex::create(corpus, &analyzer);
        let ranker = Bm25Ranker::new(&index, Bm25Params::default());
        let query = vec!["cat".to_string(), "dog".to_string(), "quick".to_string()];

        let unbounded = ranker.rank(&query, usize::MAX, false);
        let bounded = ranker.rank(&query, k, false);
        prop_assert!(bounded.len() <= k);
        prop_assert_eq!(bounded, unbounded.into_iter().take(k).collect::<Vec<_>>());
    }
}

fn index_terms(index: &LshInvertedIndex) -> Vec<String> {
    ["cat", "dog", "bird", "runs", "jumps", "quick", "fox", "the"]
        .iter()
        .filter(|t| index.get(t).is_some())
        .map(|t| t.to_string())
        .collect()
}
