//! Speednet - connection speed check for the terminal
//!
//! This library measures download and upload throughput through a pluggable
//! speed probe while a loading indicator animates on a background thread,
//! then renders the results as a small report box.

pub mod coordinator;
pub mod probe;
