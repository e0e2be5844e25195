//! Error types for the I/O edges of the extractor. Parsing itself never fails.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    /// An input file named on the command line does not exist. Aborts the whole run.
    #[error("Input not found: {}", .0.display())]
    InputAbsent(PathBuf),

    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
