use thiserror::Error;

use checkbatch_config::ConfigError;
use checkbatch_core::{CoreError, PrintError};

/// Errors surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Print error: {0}")]
    Print(#[from] PrintError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("No book found in {0}; run `checkbatch_cli init` first")]
    NotInitialized(String),
    #[error("Invalid input: {0}")]
    Input(String),
}

pub type AppResult<T> = Result<T, AppError>;
