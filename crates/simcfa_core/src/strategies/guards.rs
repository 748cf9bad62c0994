//! Guard combinators
//!
//! A guard wraps a handler and only calls it when a predicate over the current
//! day holds. Guards nest: the outer predicate is checked first and a failed
//! check skips everything inside it.

use std::cell::Cell;

use jiff::civil::Date;

use super::{Handler, handler};
use crate::error::ConfigError;
use crate::simulation::SimContext;

/// Run `inner` only on days where `predicate` holds.
pub fn when<P>(predicate: P, inner: Handler) -> Handler
where
    P: Fn(&SimContext) -> bool + 'static,
{
    handler(move |ctx, payload| {
        if !predicate(ctx) {
            return Ok(());
        }
        inner(ctx, payload)
    })
}

/// Exact calendar date match
pub fn on_date(date: Date, inner: Handler) -> Handler {
    when(move |ctx| ctx.day_date == date, inner)
}

/// Fires on the given day of every month. Months without that day are skipped.
pub fn on_day_of_month(day: i8, inner: Handler) -> Result<Handler, ConfigError> {
    validate_day_of_month(day)?;
    Ok(when(move |ctx| ctx.day_date.day() == day, inner))
}

/// On or after `start`
pub fn starting_on(start: Date, inner: Handler) -> Handler {
    when(move |ctx| ctx.day_date >= start, inner)
}

/// On or before `end`
pub fn ending_on(end: Date, inner: Handler) -> Handler {
    when(move |ctx| ctx.day_date <= end, inner)
}

/// Within `[start, end]`; a missing bound is open. At least one bound is required.
pub fn between(start: Option<Date>, end: Option<Date>, inner: Handler) -> Result<Handler, ConfigError> {
    if start.is_none() && end.is_none() {
        return Err(ConfigError::EmptyDateRange);
    }
    Ok(bounded(start, end, inner))
}

/// Like [`between`], but passes `inner` through untouched when both bounds are missing.
pub fn bounded(start: Option<Date>, end: Option<Date>, inner: Handler) -> Handler {
    let mut guarded = inner;
    if let Some(start) = start {
        guarded = starting_on(start, guarded);
    }
    if let Some(end) = end {
        guarded = ending_on(end, guarded);
    }
    guarded
}

/// Exact simulation day index
pub fn on_day(n_day: i32, inner: Handler) -> Handler {
    when(move |ctx| ctx.n_day == n_day, inner)
}

/// Runs `inner` the first time it is reached, never again.
pub fn once(inner: Handler) -> Handler {
    let fired = Cell::new(false);
    handler(move |ctx, payload| {
        if fired.replace(true) {
            return Ok(());
        }
        inner(ctx, payload)
    })
}

pub(crate) fn validate_day_of_month(day: i8) -> Result<(), ConfigError> {
    if (1..=31).contains(&day) {
        Ok(())
    } else {
        Err(ConfigError::InvalidDayOfMonth(day))
    }
}
