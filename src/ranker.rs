//! BM25 scoring and top-k ranking, generic over the index it scores
//! against (exact or LSH).

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_B, DEFAULT_K1, LSH_SOFT_TERM_FREQUENCY};
use crate::inverted::{DocId, InvertedIndex};
use crate::lsh::LshInvertedIndex;

/// BM25 tuning constants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bm25Params {
    /// Term-frequency saturation parameter.
    #[serde(default = "default_k1")]
    pub k1: f32,

    /// Document-length normalization parameter, in `[0, 1]`.
    #[serde(default = "default_b")]
    pub b: f32,
}

fn default_k1() -> f32 {
    DEFAULT_K1
}

fn default_b() -> f32 {
    DEFAULT_B
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: default_k1(),
            b: default_b(),
        }
    }
}

/// Inverse document frequency. `0` when the term is absent from the
/// corpus — a design choice, not an error.
pub fn idf(number_of_documents: usize, document_frequency: usize) -> f32 {
    if document_frequency == 0 {
        return 0.0;
    }
    let n = number_of_documents as f32;
    let df = document_frequency as f32;
    (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
}

/// Per-term BM25 contribution for one candidate document.
pub fn bm25_term_score(tf: f32, doc_length: usize, idf: f32, avgdl: f32, params: &Bm25Params) -> f32 {
    let numerator = tf * (params.k1 + 1.0);
    let denominator =
        tf + params.k1 * (1.0 - params.b + params.b * (doc_length as f32 / avgdl));
    if denominator == 0.0 {
        0.0
    } else {
        idf * numerator / denominator
    }
}

/// Abstraction over the exact and LSH indexes, so [`Bm25Ranker`] can score
/// against either without caring which one it holds.
pub trait SearchIndex {
    fn number_of_documents(&self) -> usize;
    fn average_doc_length(&self) -> f32;
    fn document_frequency(&self, term: &str) -> usize;

    /// Candidate documents for `term`: `(doc_id, doc_length, term_frequency)`.
    fn term_candidates(&self, term: &str) -> Vec<(DocId, usize, f32)>;
}

impl SearchIndex for InvertedIndex {
    fn number_of_documents(&self) -> usize {
        InvertedIndex::number_of_documents(self)
    }

    fn average_doc_length(&self) -> f32 {
        InvertedIndex::average_doc_length(self)
    }

    fn document_frequency(&self, term: &str) -> usize {
        InvertedIndex::document_frequency(self, term)
    }

    fn term_candidates(&self, term: &str) -> Vec<(DocId, usize, f32)> {
        let mut candidates: Vec<(DocId, usize, f32)> = match self.get(term) {
            Some(postings) => postings
                .iter()
                .map(|posting| (posting.doc_id.clone(), posting.doc_length, posting.frequency as f32))
                .collect(),
            None => Vec::new(),
        };
        candidates.sort_by(|a, b| a.0.cmp(&b.0));
        candidates
    }
}

impl SearchIndex for LshInvertedIndex {
    fn number_of_documents(&self) -> usize {
        LshInvertedIndex::number_of_documents(self)
    }

    fn average_doc_length(&self) -> f32 {
        LshInvertedIndex::average_doc_length(self)
    }

    fn document_frequency(&self, term: &str) -> usize {
        LshInvertedIndex::document_frequency(self, term)
    }

    fn term_candidates(&self, term: &str) -> Vec<(DocId, usize, f32)> {
        let mut candidates: Vec<(DocId, usize, f32)> = self
            .documents_for(term)
            .into_iter()
            .map(|doc_ref| {
                let tf = doc_ref
                    .freq_map
                    .get(term)
                    .map(|&f| f as f32)
                    .unwrap_or(LSH_SOFT_TERM_FREQUENCY);
                (doc_ref.doc_id.clone(), doc_ref.doc_len, tf)
            })
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0));
        candidates
    }
}

/// Scores and ranks queries against a wrapped [`SearchIndex`].
pub struct Bm25Ranker<'a, I: SearchIndex> {
    index: &'a I,
    params: Bm25Params,
}

impl<'a, I: SearchIndex> Bm25Ranker<'a, I> {
    pub fn new(index: &'a I, params: Bm25Params) -> Self {
        Self { index, params }
    }

    /// Score `query_terms` against the wrapped index and return the
    /// `top_k` highest-scoring documents, ties broken by the order in
    /// which a document was first seen across the query terms.
    ///
    /// Returns an empty list for an empty query, or when none of the
    /// query terms occur in the index.
    pub fn rank(
        &self,
        query_terms: &[String],
        top_k: usize,
        binary_scores: bool,
    ) -> Vec<(DocId, f32)> {
        let n = self.index.number_of_documents();
        let avgdl = self.index.average_doc_length();

        let mut scores: HashMap<DocId, f32> = HashMap::new();
        let mut order: Vec<DocId> = Vec::new();

        for term in query_terms {
            let df = self.index.document_frequency(term);
            if df == 0 {
                continue;
            }
            let term_idf = idf(n, df);

            for (doc_id, doc_length, tf) in self.index.term_candidates(term) {
                let contribution = bm25_term_score(tf, doc_length, term_idf, avgdl, &self.params);
                if let Some(existing) = scores.get_mut(&doc_id) {
                    *existing += contribution;
                } else {
                    scores.insert(doc_id.clone(), contribution);
                    order.push(doc_id);
                }
            }
        }

        let mut ranked: Vec<(DocId, f32)> = order
            .into_iter()
            .map(|doc_id| {
                let score = scores[&doc_id];
                (doc_id, score)
            })
            .collect();

        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(top_k);

        if binary_scores {
            for (_, score) in ranked.iter_mut() {
                *score = 1.0;
            }
        }

        ranked
    }
}
