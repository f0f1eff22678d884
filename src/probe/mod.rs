//! Speed probe module: throughput measurement and rate conversion

pub mod error;
pub mod http;
pub mod rate;
pub mod service;

pub use error::{ProbeError, Result as ProbeResult};
pub use http::{HttpSpeedProbe, ProbeSettings};
pub use rate::{convert_to_scaled_rate, RawRate, ScaledRate, SCALE_BASE};
pub use service::{Direction, SpeedProbe};

#[cfg(test)]
pub use service::MockSpeedProbe;
