//! The LSH inverted index: term → set of buckets, each bucket holding the
//! documents that landed together under one band.
//!
//! Built from an already-constructed [`InvertedIndex`] rather than raw
//! corpus text a second time, per-document length and term frequencies are
//! copied straight out of it instead of re-tokenizing (the original Python
//! reference, `examples/original_source/create_lsh_index.py`, re-runs its
//! lexer over every document in a bucket; that second pass is redundant
//! once the exact index already holds the same information).

use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use super::{build_raw_buckets, LshConfig};
use crate::errors::Result;
use crate::inverted::{DocId, InvertedIndex};

/// A document's membership in one bucket: its id, token length, and the
/// per-term frequencies it contributed (copied from the exact index).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct DocReference {
    pub doc_id: DocId,
    pub doc_len: usize,
    pub freq_map: HashMap<String, u32>,
}

/// A set of documents grouped together by one band of the MinHash
/// signature.
///
/// Two buckets are equal only if they come from the same band *and* hold
/// the same document ids — identical document sets arising from different
/// bands are distinct buckets, never merged.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Bucket {
    band_index: usize,
    doc_refs: Vec<DocReference>,
}

impl Bucket {
    pub fn band_index(&self) -> usize {
        self.band_index
    }

    pub fn doc_refs(&self) -> &[DocReference] {
        &self.doc_refs
    }

    fn member_ids(&self) -> std::collections::BTreeSet<&str> {
        self.doc_refs.iter().map(|r| r.doc_id.as_str()).collect()
    }
}

impl PartialEq for Bucket {
    fn eq(&self, other: &Self) -> bool {
        self.band_index == other.band_index && self.member_ids() == other.member_ids()
    }
}

impl Eq for Bucket {}

impl Hash for Bucket {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.band_index.hash(state);
        for id in self.member_ids() {
            id.hash(state);
        }
    }
}

/// Approximate index over a corpus: term → the buckets containing a
/// document with that term, plus the same corpus-wide aggregates the
/// exact index exposes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct LshInvertedIndex {
    postings: HashMap<String, HashSet<Bucket>>,
    number_of_documents: usize,
    total_doc_length: u64,
    average_doc_length: f32,
}

impl LshInvertedIndex {
    /// Build the approximate index. `corpus` must be the same `(doc_id,
    /// text)` rows used to build `exact_index` — the LSH builder needs raw
    /// text for shingling, while document length and term frequency come
    /// from `exact_index` rather than a second tokenization pass.
    pub fn create<I, S>(corpus: I, exact_index: &InvertedIndex, config: &LshConfig) -> Result<Self>
    where
        I: IntoIterator<Item = (DocId, S)>,
        S: AsRef<str>,
    {
        let raw_buckets = build_raw_buckets(corpus, config)?;

        let mut index = Self {
            postings: HashMap::new(),
            number_of_documents: exact_index.number_of_documents(),
            total_doc_length: exact_index.total_doc_length(),
            average_doc_length: exact_index.average_doc_length(),
        };

        for raw in raw_buckets {
            let mut doc_refs = Vec::with_capacity(raw.doc_ids.len());
            let mut terms_in_bucket: HashSet<String> = HashSet::new();

            for doc_id in &raw.doc_ids {
                let doc_len = exact_index.document_length(doc_id).unwrap_or(0);
                let mut freq_map = HashMap::new();
                for (term, frequency) in exact_index.terms_for_document(doc_id) {
                    freq_map.insert(term.to_string(), frequency);
                    terms_in_bucket.insert(term.to_string());
                }
                doc_refs.push(DocReference {
                    doc_id: doc_id.clone(),
                    doc_len,
                    freq_map,
                });
            }

            let bucket = Bucket {
                band_index: raw.band_index,
                doc_refs,
            };
            for term in terms_in_bucket {
                index.postings.entry(term).or_default().insert(bucket.clone());
            }
        }

        tracing::debug!(terms = index.postings.len(), "built LSH inverted index");
        Ok(index)
    }

    /// All buckets recorded for `term`, if any.
    pub fn get(&self, term: &str) -> Option<&HashSet<Bucket>> {
        self.postings.get(term)
    }

    /// Number of buckets containing `term` — an approximation of exact
    /// document frequency, since one bucket may hold several documents.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map(HashSet::len).unwrap_or(0)
    }

    /// Deduplicated documents across every bucket recorded for `term`, in
    /// canonical order (sorted by `doc_id`) so callers never observe an
    /// ordering dependent on the bucket set's hash iteration order.
    pub fn documents_for(&self, term: &str) -> Vec<&DocReference> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        if let Some(buckets) = self.postings.get(term) {
            for bucket in buckets {
                for doc_ref in &bucket.doc_refs {
                    if seen.insert(doc_ref.doc_id.as_str()) {
                        out.push(doc_ref);
                    }
                }
            }
        }
        out.sort_by(|a, b| a.doc_id.cmp(&b.doc_id));
        out
    }

    pub fn number_of_documents(&self) -> usize {
        self.number_of_documents
    }

    pub fn total_doc_length(&self) -> u64 {
        self.total_doc_length
    }

    /// Average document length, or `1.0` if undefined or `0`, mirroring
    /// [`InvertedIndex::average_doc_length`].
    pub fn average_doc_length(&self) -> f32 {
        if self.number_of_documents == 0 || self.average_doc_length == 0.0 {
            1.0
        } else {
            self.average_doc_length
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;
    use crate::lsh::LshConfig;

    fn corpus() -> Vec<(DocId, &'static str)> {
        vec![
            ("d1".to_string(), "the quick brown fox jumps over the lazy dog"),
            ("d2".to_string(), "the quick brown fox jumps over the lazy cat"),
            ("d3".to_string(), "completely unrelated content about astronomy"),
        ]
    }

    fn build() -> LshInvertedIndex {
        let analyzer = Analyzer::default();
        let exact = InvertedIndex::create(corpus(), &analyzer);
        let config = LshConfig {
            shingle_size: 2,
            signature_length: 32,
            band_count: 8,
            seed: 42,
        };
        LshInvertedIndex::create(corpus(), &exact, &config).unwrap()
    }

    #[test]
    fn document_frequency_counts_buckets_not_documents() {
        let index = build();
        if let Some(term) = ["quick", "brown", "fox", "jump"]
            .iter()
            .find(|t| index.get(t).is_some())
        {
            assert_eq!(index.document_frequency(term), index.get(term).unwrap().len());
        }
    }

    #[test]
    fn documents_for_term_are_deduplicated() {
        let index = build();
        for term in index.postings.keys() {
            let docs = index.documents_for(term);
            let unique: HashSet<&str> = docs.iter().map(|d| d.doc_id.as_str()).collect();
            assert_eq!(docs.len(), unique.len());
        }
    }

    #[test]
    fn aggregates_match_the_exact_index_they_were_built_from() {
        let analyzer = Analyzer::default();
        let exact = InvertedIndex::create(corpus(), &analyzer);
        let index = build();
        assert_eq!(index.number_of_documents(), exact.number_of_documents());
        assert_eq!(index.total_doc_length(), exact.total_doc_length());
    }

    #[test]
    fn empty_corpus_is_not_an_error() {
        let analyzer = Analyzer::default();
        let exact = InvertedIndex::create(Vec::<(DocId, &str)>::new(), &analyzer);
        let index =
            LshInvertedIndex::create(Vec::<(DocId, &str)>::new(), &exact, &LshConfig::default())
                .unwrap();
        assert_eq!(index.number_of_documents(), 0);
        assert_eq!(index.average_doc_length(), 1.0);
    }
}
