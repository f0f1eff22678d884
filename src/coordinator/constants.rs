//! Constants used by the measurement coordinator

/// Glyphs cycled by the loading indicator, one per frame
pub const INDICATOR_FRAMES: [&str; 8] = ["⣾", "⣷", "⣯", "⣟", "⡿", "⢿", "⣻", "⣽"];

/// Delay between indicator frames in milliseconds
pub const INDICATOR_INTERVAL_MS: u64 = 100;

/// Message shown next to the indicator glyph
pub const LOADING_MESSAGE: &str = "CHECKING CONNECTION SPEED";

/// Width of the report box in characters
pub const REPORT_WIDTH: usize = 30;

/// Unit label printed after every rate, whatever tier was selected
pub const RATE_LABEL: &str = "Mbps";
