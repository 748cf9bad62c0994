//! Day-index arithmetic for the simulation calendar.
//!
//! The scheduler maps day index `0` to the start date and every later index to
//! `start + n` calendar days. Converting through Rata Die numbering keeps this
//! an O(1) integer operation per tick instead of building a `jiff::Span` for
//! every simulated day.

use jiff::civil::Date;

/// Convert a civil date to a Rata Die day number (days since 0001-01-01).
///
/// Proleptic Gregorian calendar, March-based year so February is the last
/// month and the leap day needs no special case.
#[inline]
fn rata_die(d: Date) -> i32 {
    let y = d.year() as i32;
    let m = d.month() as i32;
    let day = d.day() as i32;

    let a = (14 - m) / 12;
    let y2 = y - a;
    let m2 = m + 12 * a - 3;

    day + (153 * m2 + 2) / 5 + 365 * y2 + y2 / 4 - y2 / 100 + y2 / 400 - 306
}

/// Inverse of `rata_die()`.
#[inline]
fn rd_to_date(rd: i32) -> Date {
    let z = rd + 306;
    let h = 100 * z - 25;
    let a = h / 3_652_425;
    let b = a - a / 4;
    let y = (100 * b + h) / 36_525;
    let c = b + z - 365 * y - y / 4;
    let m = (5 * c + 456) / 153;
    let day = c - (153 * m - 457) / 5;

    let (year, month) = if m > 12 { (y + 1, m - 12) } else { (y, m) };

    jiff::civil::date(year as i16, month as i8, day as i8)
}

/// Number of days from `d1` to `d2` (negative when `d2` is earlier).
#[inline]
pub fn days_between(d1: Date, d2: Date) -> i32 {
    rata_die(d2) - rata_die(d1)
}

/// Add `n` calendar days to a date.
#[inline]
pub fn add_days(d: Date, n: i32) -> Date {
    rd_to_date(rata_die(d) + n)
}

/// Calendar date of simulation day `n_day` for a run anchored at `start`.
///
/// The date must be representable; `Simulation::new` checks this for every
/// day of a run up front.
#[inline]
pub fn day_date(start: Date, n_day: i32) -> Date {
    add_days(start, n_day)
}

/// `day_date()` for a day that may lie past the supported calendar range.
pub fn checked_day_date(start: Date, n_day: i32) -> Result<Date, jiff::Error> {
    start.checked_add(jiff::Span::new().try_days(i64::from(n_day))?)
}

/// Day index of `date` in a run anchored at `start`.
#[inline]
pub fn day_index(start: Date, date: Date) -> i32 {
    days_between(start, date)
}
