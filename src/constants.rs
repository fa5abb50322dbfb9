//! Default parameters for the analyzer, LSH pipeline, and BM25 ranker.
//!
//! Centralized here so the defaults documented in one place match the
//! `Default` impls on each config struct.

/// Default BM25 term-frequency saturation parameter.
pub const DEFAULT_K1: f32 = 1.5;

/// Default BM25 document-length normalization parameter.
pub const DEFAULT_B: f32 = 0.75;

/// Default MinHash signature length.
pub const DEFAULT_SIGNATURE_LENGTH: usize = 128;

/// Default number of bands the signature is split into.
pub const DEFAULT_BAND_COUNT: usize = 8;

/// Default shingle size (characters per shingle).
pub const DEFAULT_SHINGLE_SIZE: usize = 2;

/// Default seed for the MinHash permutation generator.
///
/// Fixed so bucket assignments (and therefore LSH-based rankings) are
/// reproducible across runs unless a caller opts into a different seed.
pub const DEFAULT_MINHASH_SEED: u64 = 0x4249_4d32_355f_4c53;

/// Term frequency assumed for an LSH candidate document that shares a
/// bucket with a query term but has no recorded frequency for it.
pub const LSH_SOFT_TERM_FREQUENCY: f32 = 0.5;
