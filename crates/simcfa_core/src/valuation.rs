//! Compound-interest arithmetic.
//!
//! Rates are expressed in percent (`6.0` means 6 % per year) and durations in
//! fractional years. All functions are pure.

/// Days in a simulated year. Leap days are not modeled in valuation.
pub const DAYS_PER_YEAR: i32 = 365;

pub const MONTHS_PER_YEAR: i32 = 12;

/// Growth factor of a unit principal after `elapsed_years`.
///
/// `(1 + rate/100/periods) ^ (elapsed_years * periods)`. A negative
/// `elapsed_years` discounts instead of growing.
pub fn compound_growth(rate_percent: f64, elapsed_years: f64, periods_per_year: u32) -> f64 {
    debug_assert!(periods_per_year > 0, "periods_per_year must be positive");
    let periods = f64::from(periods_per_year);
    let per_period = 1.0 + rate_percent / 100.0 / periods;
    per_period.powf(elapsed_years * periods)
}

/// Principal that grows to exactly one unit after `years`.
pub fn principal_for_target(rate_percent: f64, years: f64, periods_per_year: u32) -> f64 {
    1.0 / compound_growth(rate_percent, years, periods_per_year)
}

/// Nominal annual rate (percent) that compounds to a total return of
/// `target_percent` over `years`.
pub fn implied_rate(target_percent: f64, years: f64, periods_per_year: u32) -> f64 {
    debug_assert!(periods_per_year > 0, "periods_per_year must be positive");
    let periods = f64::from(periods_per_year);
    let accrued = 1.0 + target_percent / 100.0;
    let per_period = accrued.powf(1.0 / (years * periods)) - 1.0;
    per_period * periods * 100.0
}

/// Growth factor for a span of simulation days.
pub fn growth_over_days(rate_percent: f64, days: f64, periods_per_year: u32) -> f64 {
    compound_growth(rate_percent, days / f64::from(DAYS_PER_YEAR), periods_per_year)
}

/// Round a currency amount to whole minor units (half away from zero).
#[inline]
pub fn to_minor_units(amount: f64) -> i64 {
    amount.round() as i64
}
