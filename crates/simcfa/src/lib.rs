//! Command-line front end for the simcfa cash-flow simulator
//!
//! Loads a scenario from JSON or YAML, runs it, and renders the recorded
//! history as a table and optionally as CSV.

pub mod loader;
pub mod logging;
pub mod report;
pub mod util;

pub use loader::{ConfigFormat, load_config, parse_config, render_config};
pub use logging::init_logging;
pub use report::{Report, Sampling};
