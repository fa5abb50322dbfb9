//! # retrieval-core
//!
//! A document retrieval core combining BM25 relevance scoring with two
//! parallel indexing strategies: an exact inverted index, and an
//! approximate index built on Locality-Sensitive Hashing (LSH) over
//! MinHash signatures of character shingles.
//!
//! ## Pipeline
//!
//! 1. [`analyzer`] — turns raw text into a sequence of terms.
//! 2. [`inverted`] — exact term → posting-list index, with corpus
//!    aggregates and binary snapshot persistence.
//! 3. [`lsh`] — shingling → MinHash → banding, producing an approximate
//!    term → bucket index.
//! 4. [`ranker`] — BM25 scoring and top-k ranking over either index.
//!
//! Loading a corpus, computing evaluation metrics, and any CLI or wire
//! protocol are left to callers; this crate is the scoring and indexing
//! core only.

pub mod analyzer;
pub mod constants;
pub mod errors;
pub mod inverted;
pub mod lsh;
pub mod ranker;

pub use analyzer::{Analyzer, AnalyzerConfig};
pub use errors::{RetrievalError, Result};
pub use inverted::{DocId, InvertedIndex, Posting, PostingList};
pub use lsh::{Bucket, DocReference, LshConfig, LshInvertedIndex};
pub use ranker::{bm25_term_score, idf, Bm25Params, Bm25Ranker, SearchIndex};
