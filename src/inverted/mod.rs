//! Exact inverted index: term → posting list, plus corpus aggregates.

mod storage;

pub use storage::{SNAPSHOT_VERSION as INVERTED_SNAPSHOT_VERSION, ToTextError};

use std::collections::HashMap;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::analyzer::Analyzer;

/// Document identifier, supplied by the corpus loader. Opaque beyond
/// equality and hashing.
pub type DocId = String;

/// A single (term, document) pairing: how often the term occurs in that
/// document, and the document's total token count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Posting {
    pub doc_id: DocId,
    pub doc_length: usize,
    pub frequency: u32,
}

/// For a single term, the set of documents containing it.
///
/// Iteration order over postings is unspecified and must not be relied
/// upon by callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct PostingList {
    entries: HashMap<DocId, Posting>,
}

impl PostingList {
    fn new() -> Self {
        Self::default()
    }

    /// Look up the posting for a given document, if present.
    pub fn get(&self, doc_id: &str) -> Option<&Posting> {
        self.entries.get(doc_id)
    }

    /// Number of distinct documents containing the term.
    pub fn document_frequency(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over all postings for this term, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Posting> {
        self.entries.values()
    }

    fn record(&mut self, doc_id: &str, doc_length: usize) {
        self.entries
            .entry(doc_id.to_string())
            .and_modify(|p| p.frequency += 1)
            .or_insert_with(|| Posting {
                doc_id: doc_id.to_string(),
                doc_length,
                frequency: 1,
            });
    }
}

/// Exact inverted index over a corpus: term → posting list, plus the
/// aggregates BM25 needs (`number_of_documents`, `total_doc_length`,
/// `average_doc_length`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct InvertedIndex {
    postings: HashMap<String, PostingList>,
    doc_lengths: HashMap<DocId, usize>,
    number_of_documents: usize,
    total_doc_length: u64,
    average_doc_length: f32,
}

impl InvertedIndex {
    /// Build the index from an iterator of `(doc_id, text)` rows.
    ///
    /// An empty corpus is not an error: it produces an index with zeroed
    /// aggregates and `average_doc_length` left at `0.0` (the ranker
    /// substitutes `1.0` for this case — see [`InvertedIndex::average_doc_length`]).
    pub fn create<I, S>(corpus: I, analyzer: &Analyzer) -> Self
    where
        I: IntoIterator<Item = (DocId, S)>,
        S: AsRef<str>,
    {
        let mut index = Self::default();

        for (doc_id, text) in corpus {
            let tokens = analyzer.tokenize(text.as_ref());
            let doc_length = tokens.len();

            for token in &tokens {
                let posting_list = index.postings.entry(token.clone()).or_insert_with(PostingList::new);
                posting_list.record(&doc_id, doc_length);
            }

            index.doc_lengths.insert(doc_id.clone(), doc_length);
            index.number_of_documents += 1;
            index.total_doc_length += doc_length as u64;
        }

        index.average_doc_length = if index.number_of_documents > 0 {
            index.total_doc_length as f32 / index.number_of_documents as f32
        } else {
            0.0
        };

        index
    }

    /// Look up the posting list for a term.
    pub fn get(&self, term: &str) -> Option<&PostingList> {
        self.postings.get(term)
    }

    /// Whether the index has any postings for `term`.
    pub fn contains(&self, term: &str) -> bool {
        self.postings.contains_key(term)
    }

    /// Number of distinct documents containing `term`; `0` if absent.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings
            .get(term)
            .map(PostingList::document_frequency)
            .unwrap_or(0)
    }

    pub fn number_of_documents(&self) -> usize {
        self.number_of_documents
    }

    pub fn total_doc_length(&self) -> u64 {
        self.total_doc_length
    }

    /// Average document length, or `1.0` if undefined (empty corpus) or
    /// `0` (every indexed document analyzed to zero tokens) — the ranker
    /// treats either case as `avgdl = 1`.
    pub fn average_doc_length(&self) -> f32 {
        if self.number_of_documents == 0 || self.average_doc_length == 0.0 {
            1.0
        } else {
            self.average_doc_length
        }
    }

    /// Total token count recorded for `doc_id` at construction time;
    /// `None` if no such document was indexed. Lets the LSH index builder
    /// recover a document's length without re-tokenizing its raw text.
    pub(crate) fn document_length(&self, doc_id: &str) -> Option<usize> {
        self.doc_lengths.get(doc_id).copied()
    }

    /// All terms for which a posting list exists, together with the terms'
    /// frequency for `doc_id` — used by the LSH index builder to copy
    /// per-document frequencies without re-tokenizing.
    pub(crate) fn terms_for_document<'a>(
        &'a self,
        doc_id: &'a str,
    ) -> impl Iterator<Item = (&'a str, u32)> + 'a {
        self.postings.iter().filter_map(move |(term, list)| {
            list.get(doc_id).map(|posting| (term.as_str(), posting.frequency))
        })
    }
}

pub use storage::{persist, restore, to_text};

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> Analyzer {
        Analyzer::default()
    }

    #[test]
    fn single_document_corpus() {
        let index = InvertedIndex::create(
            vec![("d1".to_string(), "the quick brown fox")],
            &analyzer(),
        );
        assert_eq!(index.number_of_documents(), 1);
        assert!(index.contains("quick"));
        assert!(index.contains("fox"));
        assert!(!index.contains("the"));
        assert_eq!(index.document_frequency("fox"), 1);
    }

    #[test]
    fn frequency_accumulates_across_repeats() {
        let index = InvertedIndex::create(vec![("d1".to_string(), "cat cat cat")], &analyzer());
        let posting = index.get("cat").unwrap().get("d1").unwrap();
        assert_eq!(posting.frequency, 3);
        assert_eq!(posting.doc_length, 3);
    }

    #[test]
    fn total_doc_length_equals_sum_of_frequencies() {
        let index = InvertedIndex::create(
            vec![
                ("d1".to_string(), "cat cat cat"),
                ("d2".to_string(), "cat dog"),
            ],
            &analyzer(),
        );
        let sum: u64 = index
            .postings
            .values()
            .flat_map(|list| list.iter())
            .map(|p| p.frequency as u64)
            .sum();
        assert_eq!(sum, index.total_doc_length());
    }

    #[test]
    fn document_frequency_matches_posting_count() {
        let index = InvertedIndex::create(
            vec![
                ("d1".to_string(), "cat cat cat"),
                ("d2".to_string(), "cat dog"),
            ],
            &analyzer(),
        );
        assert_eq!(
            index.document_frequency("cat"),
            index.get("cat").unwrap().iter().count()
        );
    }

    #[test]
    fn empty_corpus_is_not_an_error() {
        let index = InvertedIndex::create(Vec::<(DocId, &str)>::new(), &analyzer());
        assert_eq!(index.number_of_documents(), 0);
        assert_eq!(index.total_doc_length(), 0);
        assert_eq!(index.average_doc_length(), 1.0);
    }

    #[test]
    fn zero_length_documents_treat_average_doc_length_as_one() {
        // Every document analyzes to zero tokens (all stopwords), so
        // `number_of_documents > 0` but `total_doc_length == 0`.
        let index = InvertedIndex::create(
            vec![("d1".to_string(), "the a an"), ("d2".to_string(), "of and")],
            &analyzer(),
        );
        assert!(index.number_of_documents() > 0);
        assert_eq!(index.total_doc_length(), 0);
        assert_eq!(index.average_doc_length(), 1.0);
    }

    #[test]
    fn missing_term_lookup_never_fails() {
        let index = InvertedIndex::create(vec![("d1".to_string(), "hello")], &analyzer());
        assert!(index.get("xyzzy").is_none());
        assert!(!index.contains("xyzzy"));
        assert_eq!(index.document_frequency("xyzzy"), 0);
    }
}
