//! Binary snapshot persistence and human-readable dump for [`super::InvertedIndex`].

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use bincode::config;

use super::InvertedIndex;
use crate::errors::{RetrievalError, Result};

/// Current snapshot format version. Bumped whenever the encoded layout of
/// [`InvertedIndex`] changes in an incompatible way.
pub const SNAPSHOT_VERSION: u32 = 1;

pub type ToTextError = RetrievalError;

/// Atomically write a binary snapshot of `index` to `path`.
///
/// Writes to a temporary file in the same directory first, then renames it
/// into place, so a crash mid-write never leaves a corrupt file at `path`.
pub fn persist(index: &InvertedIndex, path: &Path) -> Result<()> {
    let tmp_path = path.with_extension("tmp");

    let file = fs::File::create(&tmp_path).map_err(|e| RetrievalError::IoFailure {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut writer = BufWriter::new(file);

    bincode::encode_into_std_write(SNAPSHOT_VERSION, &mut writer, config::standard()).map_err(
        |e| RetrievalError::IoFailure {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    )?;
    bincode::encode_into_std_write(index, &mut writer, config::standard()).map_err(|e| {
        RetrievalError::IoFailure {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;
    writer.flush().map_err(|e| RetrievalError::IoFailure {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    drop(writer);

    fs::rename(&tmp_path, path).map_err(|e| RetrievalError::IoFailure {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::debug!(path = %path.display(), "persisted exact inverted index snapshot");
    Ok(())
}

/// Load a binary snapshot previously written by [`persist`].
pub fn restore(path: &Path) -> Result<InvertedIndex> {
    let file = fs::File::open(path).map_err(|e| RetrievalError::IoFailure {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut reader = BufReader::new(file);

    let version: u32 = bincode::decode_from_std_read(&mut reader, config::standard()).map_err(
        |e| RetrievalError::SnapshotCorrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    )?;
    if version != SNAPSHOT_VERSION {
        return Err(RetrievalError::SnapshotVersionMismatch {
            path: path.to_path_buf(),
            found: version,
            expected: SNAPSHOT_VERSION,
        });
    }

    let index: InvertedIndex = bincode::decode_from_std_read(&mut reader, config::standard())
        .map_err(|e| RetrievalError::SnapshotCorrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    tracing::debug!(path = %path.display(), "restored exact inverted index snapshot");
    Ok(index)
}

/// Write a human-readable dump: one UTF-8 line per term, followed by
/// space-separated `doc_id doc_length frequency` triples, one per posting.
pub fn to_text(index: &InvertedIndex, path: &Path) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| RetrievalError::IoFailure {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut writer = BufWriter::new(file);

    for (term, postings) in &index.postings {
        write!(writer, "{}", term).map_err(|e| RetrievalError::IoFailure {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        for posting in postings.iter() {
            write!(
                writer,
                " {} {} {}",
                posting.doc_id, posting.doc_length, posting.frequency
            )
            .map_err(|e| RetrievalError::IoFailure {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        writeln!(writer).map_err(|e| RetrievalError::IoFailure {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    }

    Ok(())
}
