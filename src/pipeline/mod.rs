//! Loading → Merging → Enriching → Writing.
//!
//! Every stage returns its error upward; nothing is written unless all
//! earlier stages succeeded.

use std::{fmt::Display, path::PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use thiserror::Error;

use crate::{
    catalog::{TrackCatalog, error::CatalogError},
    config::{InputConfig, OutputConfig},
    domain::record::PlaybackRecord,
    storage::{discover::discover, error::StorageError, load::load_all, write::write_sorted},
};

pub mod cache;
pub mod enrich;
pub mod merge;
pub mod summary;

use enrich::{EnrichReport, Enricher};
use merge::merge_chronologically;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Merging,
    Enriching,
    Writing,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Loading => "loading",
            Stage::Merging => "merging",
            Stage::Enriching => "enriching",
            Stage::Writing => "writing",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl PipelineError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Storage(StorageError::NoInputFiles { .. } | StorageError::Walk(_)) => 2,
            PipelineError::Storage(StorageError::Read { .. } | StorageError::Parse { .. }) => 3,
            PipelineError::Storage(StorageError::Write { .. } | StorageError::Encode { .. }) => 6,
            PipelineError::Catalog(err) if err.is_auth() => 4,
            PipelineError::Catalog(_) => 5,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub records: usize,
    pub enrichment: Option<EnrichReport>,
    /// None when there was nothing to write
    pub output: Option<PathBuf>,
}

/// Merged input together with the batch files it came from.
#[derive(Debug)]
pub struct History {
    pub files: Vec<PathBuf>,
    pub records: Vec<PlaybackRecord>,
}

/// Discovers, loads and merges the input batches.
pub fn load_history(input: &InputConfig) -> Result<History, PipelineError> {
    info!("stage: {}", Stage::Loading);
    let files = discover(input)?;
    let records = load_all(&files)?;

    info!("stage: {}", Stage::Merging);
    Ok(History {
        files,
        records: merge_chronologically(records),
    })
}

/// Runs the whole pipeline.
///
/// `connect` is called only when there is at least one record, so an empty
/// history never needs credentials.
pub fn enrich_history<C, F>(
    input: &InputConfig,
    output: &OutputConfig,
    namespace: &str,
    connect: F,
) -> Result<RunReport, PipelineError>
where
    C: TrackCatalog,
    F: FnOnce() -> Result<C, CatalogError>,
{
    let mut records = load_history(input)?.records;
    println!("{} streams total.", records.len());
    if records.is_empty() {
        return Ok(RunReport::default());
    }

    info!("stage: {}", Stage::Enriching);
    let catalog = connect()?;
    let progress = progress_bar(records.len() as u64);
    let mut enricher = Enricher::new(catalog, namespace);
    let report = enricher.enrich(&mut records, &progress);
    progress.finish_and_clear();
    let report = report?;
    let cache = enricher.into_cache();
    println!(
        "{} artworks total ({} tracks without artwork).",
        cache.len(),
        cache.len() - cache.resolved()
    );

    let mut run = write(output, &records)?;
    run.enrichment = Some(report);
    Ok(run)
}

/// Runs the pipeline without the enrichment stage.
pub fn sort_history(input: &InputConfig, output: &OutputConfig) -> Result<RunReport, PipelineError> {
    let records = load_history(input)?.records;
    println!("{} streams total.", records.len());
    if records.is_empty() {
        return Ok(RunReport::default());
    }

    write(output, &records)
}

fn write(output: &OutputConfig, records: &[PlaybackRecord]) -> Result<RunReport, PipelineError> {
    info!("stage: {}", Stage::Writing);
    write_sorted(&output.path, records, output.indent)?;
    println!("{} streams sorted!", records.len());

    Ok(RunReport {
        records: records.len(),
        enrichment: None,
        output: Some(output.path.clone()),
    })
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, ETA: {eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}
