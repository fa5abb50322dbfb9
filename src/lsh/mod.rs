//! LSH/MinHash approximate indexing.
//!
//! Pipeline: character shingling → vocabulary enumeration → one-hot
//! membership → MinHash signatures → banding into buckets. Mirrors
//! `examples/original_source/lsh.py`, re-expressed with a seeded
//! permutation-rank argmin instead of the original's
//! `vector.index(i)` scan (mathematically equivalent, linear in a
//! document's shingle count rather than quadratic in vocabulary size).

pub mod index;
mod storage;

pub use index::{Bucket, DocReference, LshInvertedIndex};
pub use storage::{persist, restore, SNAPSHOT_VERSION as LSH_SNAPSHOT_VERSION};

use std::collections::{BTreeSet, HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BAND_COUNT, DEFAULT_MINHASH_SEED, DEFAULT_SHINGLE_SIZE, DEFAULT_SIGNATURE_LENGTH,
};
use crate::errors::{RetrievalError, Result};
use crate::inverted::DocId;

/// Configuration for the LSH builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LshConfig {
    /// Characters per shingle.
    #[serde(default = "default_shingle_size")]
    pub shingle_size: usize,

    /// Length of each document's MinHash signature. Must be an exact
    /// multiple of `band_count`.
    #[serde(default = "default_signature_length")]
    pub signature_length: usize,

    /// Number of bands the signature is split into for bucketing.
    #[serde(default = "default_band_count")]
    pub band_count: usize,

    /// Seed for the permutation generator, so bucket assignment is
    /// reproducible across runs.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_shingle_size() -> usize {
    DEFAULT_SHINGLE_SIZE
}

fn default_signature_length() -> usize {
    DEFAULT_SIGNATURE_LENGTH
}

fn default_band_count() -> usize {
    DEFAULT_BAND_COUNT
}

fn default_seed() -> u64 {
    DEFAULT_MINHASH_SEED
}

impl Default for LshConfig {
    fn default() -> Self {
        Self {
            shingle_size: default_shingle_size(),
            signature_length: default_signature_length(),
            band_count: default_band_count(),
            seed: default_seed(),
        }
    }
}

impl LshConfig {
    fn rows_per_band(&self) -> Result<usize> {
        if self.band_count == 0 || self.signature_length % self.band_count != 0 {
            return Err(RetrievalError::ParameterMismatch {
                message: format!(
                    "signature_length ({}) must be an exact, nonzero multiple of band_count ({})",
                    self.signature_length, self.band_count
                ),
            });
        }
        Ok(self.signature_length / self.band_count)
    }
}

/// One band-bucket produced by the builder, before it is attached to the
/// term postings of [`LshInvertedIndex`].
///
/// `band_index` is deliberately part of the bucket's identity: two bands
/// that happen to produce the same set of documents are kept as distinct
/// raw buckets rather than merged, so collisions across different bands
/// never silently collapse into one.
pub(crate) struct RawBucket {
    pub(crate) band_index: usize,
    pub(crate) doc_ids: BTreeSet<DocId>,
}

fn build_vocabulary<'a, I>(texts: I, shingle_size: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut vocab: BTreeSet<String> = BTreeSet::new();
    for text in texts {
        let chars: Vec<char> = text.chars().collect();
        if chars.len() < shingle_size {
            continue;
        }
        for window in chars.windows(shingle_size) {
            vocab.insert(window.iter().collect());
        }
    }
    vocab.into_iter().collect()
}

/// Which vocabulary positions appear at least once in `text`.
fn shingle_membership(
    text: &str,
    vocab_index: &HashMap<String, usize>,
    shingle_size: usize,
) -> HashSet<usize> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < shingle_size {
        return HashSet::new();
    }
    chars
        .windows(shingle_size)
        .filter_map(|window| {
            let shingle: String = window.iter().collect();
            vocab_index.get(&shingle).copied()
        })
        .collect()
}

/// Build `signature_length` random rank assignments over `0..vocab_len`.
/// `permutations[k][pos]` is the rank of vocabulary position `pos` under
/// the `k`-th permutation.
fn build_permutations(vocab_len: usize, signature_length: usize, seed: u64) -> Vec<Vec<usize>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..signature_length)
        .map(|_| {
            let mut order: Vec<usize> = (0..vocab_len).collect();
            order.shuffle(&mut rng);
            let mut rank = vec![0usize; vocab_len];
            for (r, &pos) in order.iter().enumerate() {
                rank[pos] = r;
            }
            rank
        })
        .collect()
}

/// MinHash signature for one document: for each permutation, the
/// vocabulary position present in the document with the smallest rank.
/// `usize::MAX` marks a permutation with no candidate (document shorter
/// than the shingle size, or an empty vocabulary).
fn compute_signature(doc_positions: &HashSet<usize>, permutations: &[Vec<usize>]) -> Vec<usize> {
    permutations
        .iter()
        .map(|rank| {
            doc_positions
                .iter()
                .min_by_key(|&&pos| rank[pos])
                .copied()
                .unwrap_or(usize::MAX)
        })
        .collect()
}

pub(crate) fn build_raw_buckets<I, S>(corpus: I, config: &LshConfig) -> Result<Vec<RawBucket>>
where
    I: IntoIterator<Item = (DocId, S)>,
    S: AsRef<str>,
{
    let rows_per_band = config.rows_per_band()?;
    let docs: Vec<(DocId, String)> = corpus
        .into_iter()
        .map(|(id, text)| (id, text.as_ref().to_string()))
        .collect();

    let vocab = build_vocabulary(docs.iter().map(|(_, t)| t.as_str()), config.shingle_size);
    let vocab_index: HashMap<String, usize> =
        vocab.iter().enumerate().map(|(i, s)| (s.clone(), i)).collect();

    let permutations = build_permutations(vocab.len(), config.signature_length, config.seed);

    let signatures: Vec<(DocId, Vec<usize>)> = docs
        .par_iter()
        .map(|(doc_id, text)| {
            let positions = shingle_membership(text, &vocab_index, config.shingle_size);
            (doc_id.clone(), compute_signature(&positions, &permutations))
        })
        .collect();

    let mut raw_buckets = Vec::new();
    for band_index in 0..config.band_count {
        let start = band_index * rows_per_band;
        let end = start + rows_per_band;
        let mut groups: HashMap<Vec<usize>, BTreeSet<DocId>> = HashMap::new();
        for (doc_id, signature) in &signatures {
            let key = signature[start..end].to_vec();
            groups.entry(key).or_default().insert(doc_id.clone());
        }
        for doc_ids in groups.into_values() {
            raw_buckets.push(RawBucket { band_index, doc_ids });
        }
    }

    tracing::debug!(
        vocab_size = vocab.len(),
        bucket_count = raw_buckets.len(),
        "built raw LSH buckets"
    );
    Ok(raw_buckets)
}
