use thiserror::Error;

/// Errors raised by the speed probe and the rate conversion
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to initialize speed probe: {0}")]
    Init(String),

    #[error("Download measurement failed: {0}")]
    Download(String),

    #[error("Upload measurement failed: {0}")]
    Upload(String),

    #[error("Rate must be a positive finite number, got {raw}")]
    Domain { raw: f64 },
}

pub type Result<T> = std::result::Result<T, ProbeError>;
