//! Scenario tests for the simcfa simulation engine
//!
//! Tests are organized by topic:
//! - `basic` - Scheduler mechanics: determinism, day order, conservation
//! - `events` - Bus behaviour as seen through a running simulation
//! - `scenarios` - Multi-strategy runs checked end to end

mod events;
