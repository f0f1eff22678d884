use crate::probe::error::Result;
use crate::probe::rate::RawRate;
use std::fmt;

/// Direction of a throughput measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Download,
    Upload,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Download => write!(f, "download"),
            Direction::Upload => write!(f, "upload"),
        }
    }
}

/// Trait for blocking throughput measurements against an external service.
///
/// Each call blocks until the measurement finishes and returns the observed
/// rate in bytes per second. Failures are returned as-is; implementations do
/// not retry.
pub trait SpeedProbe {
    /// Measure download throughput
    fn measure_download(&mut self) -> Result<RawRate>;

    /// Measure upload throughput
    fn measure_upload(&mut self) -> Result<RawRate>;

    /// Measure the given direction
    fn measure(&mut self, direction: Direction) -> Result<RawRate> {
        match direction {
            Direction::Download => self.measure_download(),
            Direction::Upload => self.measure_upload(),
        }
    }
}

impl<P: SpeedProbe + ?Sized> SpeedProbe for Box<P> {
    fn measure_download(&mut self) -> Result<RawRate> {
        (**self).measure_download()
    }

    fn measure_upload(&mut self) -> Result<RawRate> {
        (**self).measure_upload()
    }
}


#[cfg(test)]
pub use tests::MockSpeedProbe;
