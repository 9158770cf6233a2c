use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read input file '{}': {source}", .path.display())]
    InputUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("input file '{}' is not valid UTF-8", .path.display())]
    InvalidEncoding { path: PathBuf },

    #[error("cannot write patch file '{}': {source}", .path.display())]
    OutputUnwritable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot read config file '{}': {source}", .path.display())]
    ConfigUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {source}", .path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type CliResult<T> = Result<T, CliError>;
