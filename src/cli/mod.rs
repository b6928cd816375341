use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use log::error;
use std::fmt::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::catalog::{auth::Credentials, spotify::SpotifyClient};
use crate::config::{self, Discovery};
use crate::pipeline::{
    self, History, PipelineError, RunReport,
    summary::{HistorySummary, summarize},
};

/// Exit code for configuration and usage problems.
const CONFIG_EXIT_CODE: u8 = 1;

#[derive(Debug, Parser)]
#[command(name = "streamsort")]
#[command(version = "0.1")]
#[command(about = "Merge exported streaming history into one sorted file with artwork")]
pub struct Cli {
    /// Path to an optional config TOML file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding the exported history files
    #[arg(short, long)]
    pub input_dir: Option<PathBuf>,

    /// How history files are found in the input directory
    #[arg(short, long, value_enum)]
    pub discovery: Option<Discovery>,

    /// File name prefix of the history files
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Where to write the sorted history
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Merge, enrich with artwork and write the sorted history
    Sort {
        /// Skip the artwork lookup; no credentials needed
        #[arg(long)]
        no_artwork: bool,
    },
    /// Show what the input contains without touching the network
    Status,
}

impl Cli {
    /// Applies command line overrides on top of the loaded config.
    fn load_config(&self) -> anyhow::Result<config::Config> {
        let mut cfg = config::Config::load_or_default(self.config.as_deref())?;

        if let Some(dir) = &self.input_dir {
            cfg.input.dir = dir.clone();
        }
        if let Some(discovery) = self.discovery {
            cfg.input.discovery = discovery;
        }
        if let Some(prefix) = &self.prefix {
            cfg.input.prefix = Some(prefix.clone());
        }
        if let Some(output) = &self.output {
            cfg.output.path = output.clone();
        }

        Ok(cfg)
    }
}

fn local_time(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|ts| DateTime::<Local>::from(ts).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_written(report: &RunReport) {
    match &report.output {
        Some(path) => println!("Wrote {} streams to {}", report.records, path.display()),
        None => println!("Nothing to write"),
    }
}

fn status_text(history: &History, summary: &HistorySummary) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = writeln!(out, "Found {} history files", history.files.len());
    let _ = writeln!(out, "History contains {} streams", summary.records);
    let _ = writeln!(
        out,
        "  from {} to {}",
        local_time(summary.first),
        local_time(summary.last)
    );
    let _ = writeln!(out, "  tracks:       {}", summary.tracks);
    let _ = writeln!(out, "  episodes:     {}", summary.episodes);
    let _ = writeln!(out, "  unidentified: {}", summary.unidentified);
    let _ = write!(
        out,
        "Sorting with artwork would look up {} distinct tracks",
        summary.distinct_tracks
    );
    out
}

/// Usage errors share the config exit code; `--help` and `--version` succeed.
fn usage_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() { CONFIG_EXIT_CODE } else { 0 }
}

fn execute(command: &Commands, cfg: &config::Config) -> Result<(), PipelineError> {
    match command {
        Commands::Sort { no_artwork: true } => {
            let report = pipeline::sort_history(&cfg.input, &cfg.output)?;
            print_written(&report);
        }

        Commands::Sort { no_artwork: false } => {
            let catalog = &cfg.catalog;
            let report = pipeline::enrich_history(&cfg.input, &cfg.output, &catalog.namespace, || {
                let credentials = Credentials::from_env(catalog)?;
                SpotifyClient::connect(catalog, credentials)
            })?;

            if let Some(enrichment) = report.enrichment {
                println!(
                    "{} of {} streams got artwork, {} skipped.",
                    enrichment.enriched, enrichment.records, enrichment.skipped
                );
            }
            print_written(&report);
        }

        Commands::Status => {
            let history = pipeline::load_history(&cfg.input)?;
            let summary = summarize(&history.records, &cfg.catalog.namespace);
            println!("{}", status_text(&history, &summary));
        }
    }

    Ok(())
}

/// Entrypoint for CLI
pub fn run() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_code(&e));
        }
    };

    let cfg = match cli.load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::from(CONFIG_EXIT_CODE);
        }
    };

    match execute(&cli.command, &cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "streamsort",
            "--input-dir",
            "/data/export",
            "--discovery",
            "prefix",
            "--output",
            "/tmp/out.json",
            "sort",
            "--no-artwork",
        ]);

        let cfg = cli.load_config().unwrap();

        assert_eq!(cfg.input.dir, PathBuf::from("/data/export"));
        assert_eq!(cfg.input.discovery, Discovery::Prefix);
        assert_eq!(cfg.input.prefix(), "Streaming_History_Audio_");
        assert_eq!(cfg.output.path, PathBuf::from("/tmp/out.json"));
        assert!(matches!(cli.command, Commands::Sort { no_artwork: true }));
    }

    #[test]
    fn defaults_without_flags() {
        let cli = Cli::parse_from(["streamsort", "status"]);

        let cfg = cli.load_config().unwrap();

        assert_eq!(cfg.input.dir, PathBuf::from("."));
        assert_eq!(cfg.input.prefix(), "endsong_");
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["streamsort", "--config", "/nope/config.toml", "status"]);
        assert!(cli.load_config().is_err());
    }

    #[test]
    fn usage_errors_use_config_exit_code() {
        let err = Cli::try_parse_from(["streamsort", "--bogus", "sort"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), CONFIG_EXIT_CODE);

        let err = Cli::try_parse_from(["streamsort", "--help"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 0);
    }

    #[test]
    fn status_reports_files_found() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join("endsong_0.json"),
            r#"[{"ts": "2021-01-01T00:00:02Z", "spotify_track_uri": "spotify:track:A"}]"#,
        )?;
        std::fs::write(
            dir.path().join("endsong_1.json"),
            r#"[{"ts": "2021-01-01T00:00:01Z", "spotify_track_uri": "spotify:track:A"}]"#,
        )?;
        let cli = Cli::try_parse_from([
            "streamsort",
            "--input-dir",
            dir.path().to_str().unwrap(),
            "status",
        ])?;
        let cfg = cli.load_config()?;

        let history = pipeline::load_history(&cfg.input)?;
        let summary = summarize(&history.records, &cfg.catalog.namespace);
        let text = status_text(&history, &summary);

        assert!(text.starts_with("Found 2 history files\n"));
        assert!(text.contains("History contains 2 streams"));
        assert!(text.ends_with("would look up 1 distinct tracks"));
        Ok(())
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
