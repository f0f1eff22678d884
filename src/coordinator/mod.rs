//! Measurement coordinator: runs the probe while the loading indicator animates

pub mod config;
pub mod constants;
pub mod error;
pub mod indicator;
pub mod logging;
pub mod measurement;
pub mod reporter;
pub mod signal;

pub use config::{parse_test_option, CliOutcome, Config};
pub use constants::*;
pub use error::{Result, SpeednetError};
pub use indicator::{IndicatorSettings, IndicatorTarget, LoadingIndicator};
pub use logging::{init_logging, init_logging_with_config};
pub use measurement::{Coordinator, CoordinatorState, MeasurementRequest, MeasurementResult};
pub use reporter::Reporter;
pub use signal::{CompletionObserver, CompletionSignal};
