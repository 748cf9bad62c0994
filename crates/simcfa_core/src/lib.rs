//! Discrete-day cash-flow simulation library
//!
//! This crate provides the event-driven core of a personal-finance simulator.
//! It walks forward one day at a time and lets independently defined
//! strategies react to lifecycle events and to each other's side effects:
//! - A ledger of valued items (cash, bonds, debt, property) grouped by category
//! - Compound-interest valuation of bonds and debt
//! - A synchronous publish/subscribe event bus with a re-entrancy guard
//! - Strategy factories for income, expenses, bonds, debt and purchases
//! - A per-day state recorder for downstream reporting
//!
//! # Example
//!
//! ```ignore
//! use simcfa_core::simulation::Simulation;
//! use simcfa_core::events::EventKind;
//! use simcfa_core::strategies::{cash, recorder::StateRecorder};
//!
//! let mut sim = Simulation::new(365, jiff::civil::date(2025, 1, 1))?;
//! sim.subscribe(EventKind::SimulationStarted, cash::seed_cash(100_000));
//! sim.subscribe(EventKind::DayStarted, cash::monthly_cash_move(-5_000, 10, None, None)?);
//!
//! let recorder = StateRecorder::new();
//! sim.subscribe(EventKind::DayEnded, recorder.handler());
//! let ledger = sim.run()?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod date_math;
pub mod error;
pub mod events;
pub mod simulation;
pub mod strategies;
pub mod valuation;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::SimulationConfig;
pub use error::{ConfigError, LookupError, Result, SimError};
pub use events::{EventBus, EventKind, Payload};
pub use model::{ItemId, Ledger, LedgerItem};
pub use simulation::{SimContext, Simulation};
