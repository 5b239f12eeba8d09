//! Reading and writing [`SaveFile`]s on disk (§4.10).

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::PersistError;
use crate::save_file::SaveFile;

/// Write `save` to `path` as pretty-printed JSON, overwriting any existing
/// file.
///
/// # Errors
///
/// Returns [`PersistError::Io`] if the file cannot be created or written,
/// or [`PersistError::Json`] if serialization fails.
pub fn write_to_path(save: &SaveFile, path: &Path) -> Result<(), PersistError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), save)?;
    Ok(())
}

/// Read a [`SaveFile`] previously written by [`write_to_path`].
///
/// # Errors
///
/// Returns [`PersistError::Io`] if the file cannot be opened, or
/// [`PersistError::Json`] if its contents are not a valid [`SaveFile`].
pub fn read_from_path(path: &Path) -> Result<SaveFile, PersistError> {
    let file = File::open(path)?;
    let save = serde_json::from_reader(BufReader::new(file))?;
    Ok(save)
}
