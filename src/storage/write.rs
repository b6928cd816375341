use std::{
    ffi::OsString,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::{domain::record::PlaybackRecord, storage::error::StorageError};

const PARTIAL_SUFFIX: &str = ".partial";

fn partial_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Writes the records as an indented JSON array, replacing `path`.
///
/// The data goes to a sibling `.partial` file first and is renamed into place
/// only once fully flushed, so a failed write leaves any previous artifact
/// untouched.
pub fn write_sorted(
    path: &Path,
    records: &[PlaybackRecord],
    indent: usize,
) -> Result<(), StorageError> {
    let partial = partial_path(path);

    let result = write_to(&partial, records, indent).and_then(|_| {
        std::fs::rename(&partial, path).map_err(|source| StorageError::Write {
            path: path.to_path_buf(),
            source,
        })
    });

    if result.is_err() {
        let _ = std::fs::remove_file(&partial);
    }
    result
}

fn write_to(path: &Path, records: &[PlaybackRecord], indent: usize) -> Result<(), StorageError> {
    let write_err = |source: std::io::Error| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);

    let indent = " ".repeat(indent);
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    records
        .serialize(&mut serializer)
        .map_err(|source| StorageError::Encode {
            path: path.to_path_buf(),
            source,
        })?;

    writer.write_all(b"\n").map_err(write_err)?;
    writer.flush().map_err(write_err)?;
    writer.get_ref().sync_all().map_err(write_err)
}
