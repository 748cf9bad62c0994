//! Bond templates and purchase/maturity strategies
//!
//! A [`BondTemplate`] describes the terms of a bond issue. Purchase strategies
//! turn a template into bonds held in the `bonds` category and schedule their
//! buy-back on the maturity date.
//!
//! # Examples
//!
//! ```ignore
//! use simcfa_core::strategies::bonds::{BondTemplate, bond_purchase_on, bond_buy_back};
//!
//! let issue = BondTemplate::three_year().rate_percent(7.1);
//! sim.subscribe(EventKind::DayStarted, bond_purchase_on(date(2023, 10, 26), 1766, &issue)?);
//! sim.subscribe(EventKind::BondBuyBack, bond_buy_back());
//! ```

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::cash::change_cash;
use super::guards::{bounded, on_date, on_day_of_month};
use super::{Handler, delayed_post, handler};
use crate::error::{ConfigError, Result};
use crate::events::{BondMaturity, EventKind, Payload, applied, keys};
use crate::model::{BONDS, Bond, BondDuration, DEFAULT_FACE_PRICE, LedgerItem};
use crate::simulation::SimContext;

/// Terms of a bond issue, some of which may still be unset.
///
/// Face price and compounding fall back to [`DEFAULT_FACE_PRICE`] and annual
/// compounding when unset; the other terms are required. Setters never modify the template they are called on; each returns an
/// updated copy, so a preset can be shared and specialized freely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BondTemplate {
    pub rate_percent: Option<f64>,
    pub duration: Option<BondDuration>,
    pub rebuy_cost: Option<i64>,
    pub pre_maturity_penalty: Option<i64>,
    pub face_price: Option<i64>,
    pub compounding_periods_per_year: Option<u32>,
}

impl BondTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Presets
    // =========================================================================

    /// 6 % one-year issue
    #[must_use]
    pub fn one_year() -> Self {
        Self::new()
            .rate_percent(6.0)
            .duration(BondDuration::years(1))
            .rebuy_cost(99_90)
            .pre_maturity_penalty(70)
    }

    /// 6.6 % three-year issue
    #[must_use]
    pub fn three_year() -> Self {
        Self::new()
            .rate_percent(6.6)
            .duration(BondDuration::years(3))
            .rebuy_cost(99_90)
            .pre_maturity_penalty(70)
    }

    // =========================================================================
    // Setters
    // =========================================================================

    #[must_use]
    pub fn rate_percent(&self, rate_percent: f64) -> Self {
        Self {
            rate_percent: Some(rate_percent),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn duration(&self, duration: BondDuration) -> Self {
        Self {
            duration: Some(duration),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn rebuy_cost(&self, rebuy_cost: i64) -> Self {
        Self {
            rebuy_cost: Some(rebuy_cost),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn pre_maturity_penalty(&self, penalty: i64) -> Self {
        Self {
            pre_maturity_penalty: Some(penalty),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn face_price(&self, face_price: i64) -> Self {
        Self {
            face_price: Some(face_price),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn compounding_periods_per_year(&self, periods: u32) -> Self {
        Self {
            compounding_periods_per_year: Some(periods),
            ..self.clone()
        }
    }

    /// Fields set on `overrides` replace the ones on `self`.
    #[must_use]
    pub fn merged(&self, overrides: &BondTemplate) -> Self {
        Self {
            rate_percent: overrides.rate_percent.or(self.rate_percent),
            duration: overrides.duration.or(self.duration),
            rebuy_cost: overrides.rebuy_cost.or(self.rebuy_cost),
            pre_maturity_penalty: overrides.pre_maturity_penalty.or(self.pre_maturity_penalty),
            face_price: overrides.face_price.or(self.face_price),
            compounding_periods_per_year: overrides
                .compounding_periods_per_year
                .or(self.compounding_periods_per_year),
        }
    }

    /// Validate the template and produce the bond terms.
    pub fn terms(&self) -> Result<Bond, ConfigError> {
        let rate_percent = self
            .rate_percent
            .ok_or(ConfigError::MissingBondField("rate_percent"))?;
        let duration = self
            .duration
            .ok_or(ConfigError::MissingBondField("duration"))?;
        let rebuy_cost = self
            .rebuy_cost
            .ok_or(ConfigError::MissingBondField("rebuy_cost"))?;
        let pre_maturity_penalty = self
            .pre_maturity_penalty
            .ok_or(ConfigError::MissingBondField("pre_maturity_penalty"))?;

        let face_price = self.face_price.unwrap_or(DEFAULT_FACE_PRICE);
        let compounding_periods_per_year = self.compounding_periods_per_year.unwrap_or(1);

        if duration.is_zero() {
            return Err(ConfigError::ZeroBondDuration);
        }
        if compounding_periods_per_year == 0 {
            return Err(ConfigError::InvalidCompounding);
        }
        if face_price <= 0 {
            return Err(ConfigError::InvalidFacePrice(face_price));
        }

        Ok(Bond {
            rate_percent,
            duration,
            rebuy_cost,
            pre_maturity_penalty,
            face_price,
            compounding_periods_per_year,
        })
    }
}

/// Buy `quantity` bonds every time the handler runs.
pub fn bond_purchase(quantity: i64, template: &BondTemplate) -> Result<Handler, ConfigError> {
    let terms = template.terms()?;
    Ok(handler(move |ctx, _| buy_bonds(ctx, quantity, &terms)))
}

/// One purchase on a fixed calendar date
pub fn bond_purchase_on(
    date: Date,
    quantity: i64,
    template: &BondTemplate,
) -> Result<Handler, ConfigError> {
    Ok(on_date(date, bond_purchase(quantity, template)?))
}

/// Recurring purchase on `day_of_month`, optionally stopping after `until`.
pub fn monthly_bond_purchase(
    quantity: i64,
    template: &BondTemplate,
    day_of_month: i8,
    until: Option<Date>,
) -> Result<Handler, ConfigError> {
    let monthly = on_day_of_month(day_of_month, bond_purchase(quantity, template)?)?;
    Ok(bounded(None, until, monthly))
}

/// Sell a matured bond: subscribe to `bond_buy_back`.
pub fn bond_buy_back() -> Handler {
    applied(|ctx: &mut SimContext, BondMaturity { item }| {
        let bond = ctx.ledger.remove(BONDS, item)?;
        let proceeds = bond.value(ctx.n_day);
        tracing::debug!(n_day = ctx.n_day, ?item, quantity = bond.quantity(), proceeds, "bond sold");

        ctx.post(
            EventKind::LedgerItemSold,
            &Payload::new().with(keys::ITEM, item).with(keys::CATEGORY, BONDS),
        )?;
        change_cash(ctx, proceeds, 0)?;
        Ok(())
    })
}

fn buy_bonds(ctx: &mut SimContext, quantity: i64, terms: &Bond) -> Result<()> {
    let bond = LedgerItem::bond(quantity, ctx.n_day, terms.clone());
    change_cash(ctx, -quantity * terms.face_price, 0)?;
    let item = ctx.ledger.push(BONDS, bond);
    tracing::debug!(n_day = ctx.n_day, ?item, quantity, rate = terms.rate_percent, "bonds bought");

    ctx.post(
        EventKind::LedgerItemAcquired,
        &Payload::new().with(keys::ITEM, item).with(keys::CATEGORY, BONDS),
    )?;

    let maturity = ctx.day_date.checked_add(terms.duration.span())?;
    let buy_back = delayed_post(EventKind::BondBuyBack, Payload::new().with(keys::ITEM, item));
    ctx.subscribe_on_date(EventKind::DayStarted, maturity, buy_back);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::events::ItemEvent;
    use crate::model::CASH;
    use crate::simulation::Simulation;
    use crate::strategies::cash::seed_cash;
    use crate::valuation::growth_over_days;
    use jiff::civil::date;

    #[test]
    fn test_setters_return_copies() {
        let preset = BondTemplate::one_year();
        let special = preset.rate_percent(7.5).face_price(50_00);

        assert_eq!(preset.rate_percent, Some(6.0));
        assert_eq!(preset.face_price, None);
        assert_eq!(preset.terms().unwrap().face_price, DEFAULT_FACE_PRICE);
        assert_eq!(special.rate_percent, Some(7.5));
        assert_eq!(special.face_price, Some(50_00));
        assert_eq!(special.duration, preset.duration);
    }

    #[test]
    fn test_presets() {
        let one = BondTemplate::one_year().terms().unwrap();
        assert_eq!(one.rate_percent, 6.0);
        assert_eq!(one.duration, BondDuration::years(1));
        assert_eq!(one.rebuy_cost, 99_90);
        assert_eq!(one.pre_maturity_penalty, 70);

        let three = BondTemplate::three_year().terms().unwrap();
        assert_eq!(three.rate_percent, 6.6);
        assert_eq!(three.duration, BondDuration::years(3));
    }

    #[test]
    fn test_incomplete_template_is_rejected() {
        assert_eq!(
            BondTemplate::new().terms(),
            Err(ConfigError::MissingBondField("rate_percent"))
        );
        assert_eq!(
            BondTemplate::new().rate_percent(5.0).terms(),
            Err(ConfigError::MissingBondField("duration"))
        );
        assert_eq!(
            BondTemplate::one_year().duration(BondDuration::default()).terms(),
            Err(ConfigError::ZeroBondDuration)
        );
        assert_eq!(
            BondTemplate::one_year().compounding_periods_per_year(0).terms(),
            Err(ConfigError::InvalidCompounding)
        );
        assert!(bond_purchase(1, &BondTemplate::new()).is_err());
    }

    #[test]
    fn test_merged_prefers_overrides() {
        let overrides = BondTemplate::new().rate_percent(7.1).compounding_periods_per_year(12);
        let merged = BondTemplate::three_year().merged(&overrides);
        assert_eq!(merged.rate_percent, Some(7.1));
        assert_eq!(merged.duration, Some(BondDuration::years(3)));
        assert_eq!(merged.compounding_periods_per_year, Some(12));
        assert_eq!(merged.face_price, None);
    }

    #[test]
    fn test_merged_keeps_overrides_equal_to_defaults() {
        let issue = BondTemplate::one_year()
            .face_price(50_00)
            .compounding_periods_per_year(12);
        let overrides = BondTemplate::new()
            .face_price(DEFAULT_FACE_PRICE)
            .compounding_periods_per_year(1);

        let terms = issue.merged(&overrides).terms().unwrap();
        assert_eq!(terms.face_price, DEFAULT_FACE_PRICE);
        assert_eq!(terms.compounding_periods_per_year, 1);

        let untouched = issue.merged(&BondTemplate::new()).terms().unwrap();
        assert_eq!(untouched.face_price, 50_00);
        assert_eq!(untouched.compounding_periods_per_year, 12);
    }

    #[test]
    fn test_purchase_and_maturity_round_trip() {
        let mut sim = Simulation::new(400, date(2025, 1, 1)).unwrap();
        sim.subscribe(EventKind::SimulationStarted, seed_cash(1_000_000));
        sim.subscribe(
            EventKind::DayStarted,
            bond_purchase_on(date(2025, 1, 1), 10, &BondTemplate::one_year()).unwrap(),
        );
        sim.subscribe(EventKind::BondBuyBack, bond_buy_back());

        let events = Rc::new(RefCell::new(Vec::new()));
        for kind in [EventKind::LedgerItemAcquired, EventKind::LedgerItemSold] {
            let sink = events.clone();
            let name = kind.to_string();
            sim.subscribe_applied(kind, move |ctx, event: ItemEvent| {
                sink.borrow_mut().push((name.clone(), ctx.day_date, event.category));
                Ok(())
            });
        }

        let ledger = sim.run().unwrap();
        assert!(ledger.items(BONDS).is_empty());
        // 10 units at 100.00, one year at 6 %
        assert_eq!(ledger.total_quantity(CASH), 1_000_000 - 100_000 + 106_000);
        assert_eq!(
            *events.borrow(),
            vec![
                ("ledger_item_acquired".to_string(), date(2025, 1, 1), BONDS.to_string()),
                ("ledger_item_sold".to_string(), date(2026, 1, 1), BONDS.to_string()),
            ]
        );
    }

    #[test]
    fn test_bond_held_one_day_short_pays_penalty() {
        let mut sim = Simulation::new(365, date(2025, 1, 1)).unwrap();
        sim.subscribe(EventKind::SimulationStarted, seed_cash(100_000));
        sim.subscribe(
            EventKind::DayStarted,
            bond_purchase_on(date(2025, 1, 1), 1, &BondTemplate::one_year()).unwrap(),
        );
        sim.subscribe(EventKind::BondBuyBack, bond_buy_back());

        // The run ends on day 364, before the buy-back fires
        let ledger = sim.run().unwrap();
        let bond = &ledger.items(BONDS)[0];
        let expected = (DEFAULT_FACE_PRICE as f64 * growth_over_days(6.0, 364.0, 1) - 70.0).round() as i64;
        assert_eq!(bond.value(364), expected);
        assert_eq!(bond.value(365), 106_00);
        assert_eq!(ledger.total_quantity(CASH), 100_000 - DEFAULT_FACE_PRICE);
    }

    #[test]
    fn test_maturity_subscription_expires_after_buy_back() {
        let mut ctx = SimContext::new(400, date(2025, 1, 1));
        seed_cash(1_000_000)(&mut ctx, &Payload::new()).unwrap();
        ctx.subscribe(EventKind::BondBuyBack, bond_buy_back());
        bond_purchase(1, &BondTemplate::one_year()).unwrap()(&mut ctx, &Payload::new()).unwrap();
        assert_eq!(ctx.events.subscriber_count(&EventKind::DayStarted), 1);

        ctx.n_day = 365;
        ctx.day_date = ctx.date_of(365);
        ctx.post(EventKind::DayStarted, &Payload::new()).unwrap();

        assert!(ctx.ledger.items(BONDS).is_empty());
        assert_eq!(ctx.events.subscriber_count(&EventKind::DayStarted), 0);
        assert_eq!(ctx.ledger.total_quantity(CASH), 1_000_000 + 6_00);
    }

    #[test]
    fn test_monthly_purchase_stops_after_until() {
        let mut sim = Simulation::new(120, date(2025, 1, 1)).unwrap();
        sim.subscribe(EventKind::SimulationStarted, seed_cash(1_000_000));
        sim.subscribe(
            EventKind::DayStarted,
            monthly_bond_purchase(2, &BondTemplate::three_year(), 5, Some(date(2025, 3, 1))).unwrap(),
        );

        let ledger = sim.run().unwrap();
        let acquired: Vec<i32> = ledger
            .items(BONDS)
            .iter()
            .map(|bond| bond.properties.acquired_on)
            .collect();
        assert_eq!(acquired, vec![4, 35]);
        assert_eq!(ledger.total_quantity(CASH), 1_000_000 - 4 * DEFAULT_FACE_PRICE);
    }

    #[test]
    fn test_buy_back_of_unknown_bond_fails() {
        let mut ctx = SimContext::new(1, date(2025, 1, 1));
        let payload = Payload::new().with(keys::ITEM, crate::model::ItemId(42));
        assert!(bond_buy_back()(&mut ctx, &payload).is_err());
    }
}
