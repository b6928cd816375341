//! Module to find history batch files in the input directory

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::{
    config::{Discovery, InputConfig},
    storage::error::StorageError,
};

const BATCH_EXTENSION: &str = "json";

fn is_batch_file(path: &Path, prefix: &str) -> bool {
    let has_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(BATCH_EXTENSION))
        .unwrap_or(false);

    has_extension
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with(prefix))
            .unwrap_or(false)
}

/// Finds the batch files according to the configured convention.
///
/// Fails when nothing matches at all.
pub fn discover(input: &InputConfig) -> Result<Vec<PathBuf>, StorageError> {
    let prefix = input.prefix();
    let (files, pattern) = match input.discovery {
        Discovery::Sequence => (
            discover_sequence(&input.dir, prefix)?,
            format!("{prefix}<n>.{BATCH_EXTENSION}"),
        ),
        Discovery::Prefix => (
            discover_prefix(&input.dir, prefix)?,
            format!("{prefix}*.{BATCH_EXTENSION}"),
        ),
    };

    if files.is_empty() {
        return Err(StorageError::NoInputFiles {
            dir: input.dir.clone(),
            pattern,
        });
    }

    Ok(files)
}

/// Collects `<prefix>0.json`, `<prefix>1.json`, ... stopping at the first
/// missing index.
pub fn discover_sequence(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, StorageError> {
    let mut files = Vec::new();

    for index in 0.. {
        let path = dir.join(format!("{prefix}{index}.{BATCH_EXTENSION}"));
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => files.push(path),
            Ok(_) => break,
            Err(err) if err.kind() == ErrorKind::NotFound => break,
            Err(source) => return Err(StorageError::Read { path, source }),
        }
    }

    Ok(files)
}

/// Collects every `<prefix>*.json` file directly inside `dir`, ordered by
/// file name.
pub fn discover_prefix(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, StorageError> {
    let mut files = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && is_batch_file(entry.path(), prefix) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn input(dir: &Path, discovery: Discovery) -> InputConfig {
        InputConfig {
            dir: dir.to_path_buf(),
            discovery,
            prefix: None,
        }
    }

    #[test]
    fn sequence_stops_at_first_gap() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();

        fs::write(root.join("endsong_0.json"), b"[]").unwrap();
        fs::write(root.join("endsong_1.json"), b"[]").unwrap();
        // index 2 missing, 3 must not be picked up
        fs::write(root.join("endsong_3.json"), b"[]").unwrap();

        let files = discover(&input(root, Discovery::Sequence)).unwrap();

        assert_eq!(
            files,
            vec![root.join("endsong_0.json"), root.join("endsong_1.json")]
        );
    }

    #[test]
    fn sequence_without_first_file_is_discovery_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("endsong_1.json"), b"[]").unwrap();

        let err = discover(&input(tmp.path(), Discovery::Sequence)).unwrap_err();

        assert!(matches!(err, StorageError::NoInputFiles { .. }));
    }

    #[test]
    fn prefix_matches_only_prefixed_json_files() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();

        let a = root.join("Streaming_History_Audio_2019-2020_0.json");
        let b = root.join("Streaming_History_Audio_2020-2021_1.json");
        fs::write(&b, b"[]").unwrap();
        fs::write(&a, b"[]").unwrap();
        fs::write(root.join("Streaming_History_Video_2020.json"), b"[]").unwrap();
        fs::write(root.join("Streaming_History_Audio_notes.txt"), b"x").unwrap();
        fs::create_dir(root.join("Streaming_History_Audio_dir.json")).unwrap();

        let files = discover(&input(root, Discovery::Prefix)).unwrap();

        assert_eq!(files, vec![a, b]);
    }

    #[test]
    fn prefix_does_not_descend_into_subdirectories() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("Streaming_History_Audio_0.json"), b"[]").unwrap();

        let err = discover(&input(tmp.path(), Discovery::Prefix)).unwrap_err();

        assert!(matches!(err, StorageError::NoInputFiles { .. }));
    }

    #[test]
    fn custom_prefix_is_respected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("history_0.json"), b"[]").unwrap();

        let mut cfg = input(tmp.path(), Discovery::Sequence);
        cfg.prefix = Some("history_".into());

        let files = discover(&cfg).unwrap();
        assert_eq!(files, vec![tmp.path().join("history_0.json")]);
    }

    #[test]
    fn prefix_in_missing_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing");

        let err = discover(&input(&missing, Discovery::Prefix)).unwrap_err();

        assert!(matches!(err, StorageError::Walk(_)));
    }
}
