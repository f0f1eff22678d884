use crate::probe::ProbeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeednetError {
    #[error("Invalid command line option: {0}")]
    Option(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("Invalid coordinator state: {0}")]
    State(String),

    #[error("Loading indicator error: {0}")]
    Indicator(String),

    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SpeednetError>;
