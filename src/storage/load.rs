use std::{fs::File, io::BufReader, path::Path, path::PathBuf};

use log::debug;

use crate::{domain::record::PlaybackRecord, storage::error::StorageError};

/// Parses one batch file. The whole file must be a JSON array of records.
pub fn load_batch(path: &Path) -> Result<Vec<PlaybackRecord>, StorageError> {
    let file = File::open(path).map_err(|source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| StorageError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads every batch and concatenates them in the given order.
///
/// Stops at the first unreadable or malformed file.
pub fn load_all(paths: &[PathBuf]) -> Result<Vec<PlaybackRecord>, StorageError> {
    let mut records = Vec::new();

    for path in paths {
        let batch = load_batch(path)?;
        debug!("{} records in {}", batch.len(), path.display());
        records.extend(batch);

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        println!("{name} done!");
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    const BATCH: &str = r#"[
        {"ts": "2020-01-02T00:00:00Z", "ms_played": 1000, "spotify_track_uri": "spotify:track:A",
         "master_metadata_track_name": "Song A", "shuffle": false},
        {"ts": "2020-01-01T00:00:00Z", "ms_played": 0, "spotify_track_uri": null,
         "episode_name": "Ep", "spotify_episode_uri": "spotify:episode:E"}
    ]"#;

    #[test]
    fn loads_batches_in_order() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let first = dir.path().join("endsong_0.json");
        let second = dir.path().join("endsong_1.json");
        fs::write(&first, BATCH)?;
        fs::write(&second, r#"[{"ts": "2019-05-05T10:00:00Z"}]"#)?;

        let records = load_all(&[first, second])?;

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].master_metadata_track_name.as_deref(), Some("Song A"));
        assert_eq!(records[1].episode_name.as_deref(), Some("Ep"));
        assert_eq!(records[1].spotify_track_uri, None);
        assert_eq!(records[2].ts.to_string(), "2019-05-05 10:00:00 UTC");

        Ok(())
    }

    #[test]
    fn empty_batch_loads_nothing() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("endsong_0.json");
        fs::write(&path, "[]")?;

        assert!(load_all(&[path])?.is_empty());
        Ok(())
    }

    #[test]
    fn malformed_batch_is_parse_error() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let good = dir.path().join("endsong_0.json");
        let bad = dir.path().join("endsong_1.json");
        fs::write(&good, BATCH)?;
        fs::write(&bad, r#"[{"ts": "not a time"}]"#)?;

        let err = load_all(&[good, bad.clone()]).unwrap_err();

        match err {
            StorageError::Parse { path, .. } => assert_eq!(path, bad),
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn null_or_missing_play_time_stays_null() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("endsong_0.json");
        fs::write(
            &path,
            r#"[
                {"ts": "2021-03-04T05:06:07Z", "ms_played": null},
                {"ts": "2021-03-04T05:06:08Z"},
                {"ts": "2021-03-04T05:06:09Z", "ms_played": 1500}
            ]"#,
        )?;

        let records = load_all(&[path])?;

        assert_eq!(records[0].ms_played, None);
        assert_eq!(records[1].ms_played, None);
        assert_eq!(records[2].ms_played, Some(1500));

        let value = serde_json::to_value(&records[1])?;
        assert_eq!(value.get("ms_played"), Some(&serde_json::Value::Null));
        Ok(())
    }

    #[test]
    fn missing_batch_is_read_error() {
        let err = load_batch(Path::new("/nope/endsong_0.json")).unwrap_err();
        assert!(matches!(err, StorageError::Read { .. }));
    }
}
