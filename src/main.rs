use std::process::ExitCode;

use crate::cli::run;

pub mod catalog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod pipeline;
pub mod storage;

fn main() -> ExitCode {
    // RUST_LOG=debug shows every catalog request
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    run()
}
