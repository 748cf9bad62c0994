//! Observers that keep what happened during a run
//!
//! Each observer is a cheap handle around shared storage: clone it, subscribe
//! the handler it builds, and read the storage after the run.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::{Handler, handler};
use crate::events::{EventKind, Payload};
use crate::model::{CASH, Ledger};

/// The ledger as it stood at the end of one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySnapshot {
    pub n_day: i32,
    pub day_date: Date,
    pub ledger: Ledger,
}

/// Records a deep copy of the ledger every time its handler runs.
///
/// Subscribe [`StateRecorder::handler`] to `day_ended` to get one snapshot per
/// simulated day, in order.
#[derive(Debug, Clone, Default)]
pub struct StateRecorder {
    history: Rc<RefCell<Vec<DaySnapshot>>>,
}

impl StateRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler(&self) -> Handler {
        let history = self.history.clone();
        handler(move |ctx, _| {
            history.borrow_mut().push(DaySnapshot {
                n_day: ctx.n_day,
                day_date: ctx.day_date,
                ledger: ctx.ledger.clone(),
            });
            Ok(())
        })
    }

    pub fn len(&self) -> usize {
        self.history.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.borrow().is_empty()
    }

    /// Copy of everything recorded so far
    pub fn history(&self) -> Vec<DaySnapshot> {
        self.history.borrow().clone()
    }

    /// Move the recorded history out, leaving the recorder empty.
    pub fn take(&self) -> Vec<DaySnapshot> {
        self.history.take()
    }
}

/// Sums the `cash` category once, typically on `simulation_ended`.
#[derive(Debug, Clone, Default)]
pub struct CashReport {
    total: Rc<Cell<Option<i64>>>,
}

impl CashReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler(&self) -> Handler {
        let total = self.total.clone();
        handler(move |ctx, _| {
            let cash = ctx.ledger.total_quantity(CASH);
            tracing::info!(
                n_day = ctx.n_day,
                total_cash = %format_minor_units(cash),
                "final cash state"
            );
            total.set(Some(cash));
            Ok(())
        })
    }

    /// Total cash in minor units, once the handler has run
    pub fn total(&self) -> Option<i64> {
        self.total.get()
    }
}

/// `12345` -> `"123.45"`
pub fn format_minor_units(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub n_day: i32,
    pub kind: EventKind,
    pub payload: Payload,
}

/// Log of posted events, for debugging strategy interactions.
#[derive(Debug, Clone, Default)]
pub struct EventTrace {
    entries: Rc<RefCell<Vec<TraceEntry>>>,
}

impl EventTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler recording every post of `kind` it is subscribed to.
    pub fn handler(&self, kind: EventKind) -> Handler {
        let entries = self.entries.clone();
        handler(move |ctx, payload| {
            tracing::debug!(n_day = ctx.n_day, event = %kind, ?payload, "event");
            entries.borrow_mut().push(TraceEntry {
                n_day: ctx.n_day,
                kind: kind.clone(),
                payload: payload.clone(),
            });
            Ok(())
        })
    }

    pub fn entries(&self) -> Vec<TraceEntry> {
        self.entries.borrow().clone()
    }

    /// Entries of one kind, in posting order
    pub fn of_kind(&self, kind: &EventKind) -> Vec<TraceEntry> {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.kind == *kind)
            .cloned()
            .collect()
    }
}
