//! Binary snapshot persistence for [`super::LshInvertedIndex`].

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use bincode::config;

use super::LshInvertedIndex;
use crate::errors::{RetrievalError, Result};

/// Current snapshot format version. Bumped whenever the encoded layout of
/// [`LshInvertedIndex`] changes in an incompatible way.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Atomically write a binary snapshot of `index` to `path`.
pub fn persist(index: &LshInvertedIndex, path: &Path) -> Result<()> {
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

    tracing::debug!(path = %path.display(), "persisted LSH inverted index snapshot");
    Ok(())
}

/// Load a binary snapshot previously written by [`persist`].
pub fn restore(path: &Path) -> Result<LshInvertedIndex> {
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

    let index: LshInvertedIndex = bincode::decode_from_std_read(&mut reader, config::standard())
        .map_err(|e| RetrievalError::SnapshotCorrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    tracing::debug!(path = %path.display(), "restored LSH inverted index snapshot");
    Ok(index)
}
