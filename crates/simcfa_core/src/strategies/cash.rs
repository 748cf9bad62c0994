//! Cash movements: the primary account, recurring flows and income schedules

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::guards::{bounded, on_day_of_month};
use super::{Handler, handler};
use crate::error::{ConfigError, Result};
use crate::events::{EventKind, Payload, keys};
use crate::model::{CASH, LedgerItem};
use crate::simulation::SimContext;

/// Day of month recurring flows use unless told otherwise
pub const DEFAULT_DAY_OF_MONTH: i8 = 10;

/// Add `delta` to the quantity of `cash[index]` and announce the change.
///
/// The balance is allowed to go negative. A debit that leaves it below zero
/// also posts `cash_state_negative`, which is how an overdraft reaches the
/// debt strategies. Returns the new balance.
pub fn change_cash(ctx: &mut SimContext, delta: i64, index: usize) -> Result<i64> {
    let cash = ctx.ledger.item_at_mut(CASH, index)?;
    let new_state = cash.properties.quantity + delta;
    cash.properties.quantity = new_state;

    ctx.post(
        EventKind::CashStateChange,
        &Payload::new()
            .with(keys::INDEX, index)
            .with(keys::BY_HOW_MUCH, delta)
            .with(keys::NEW_STATE, new_state),
    )?;

    if delta < 0 && new_state < 0 {
        tracing::debug!(n_day = ctx.n_day, index, debit_level = new_state, "cash overdrawn");
        ctx.post(
            EventKind::CashStateNegative,
            &Payload::new()
                .with(keys::INDEX, index)
                .with(keys::DEBIT_LEVEL, new_state),
        )?;
    }
    Ok(new_state)
}

/// Append a fresh item to `category`, acquired on the current day.
pub fn append_item(category: &'static str, item: LedgerItem) -> Handler {
    handler(move |ctx, _| {
        let mut item = item.clone();
        item.properties.acquired_on = ctx.n_day;
        ctx.ledger.push(category, item);
        Ok(())
    })
}

/// Open a cash account holding `quantity`. Usually subscribed to `simulation_started`.
pub fn seed_cash(quantity: i64) -> Handler {
    append_item(CASH, LedgerItem::cash(quantity, 0))
}

/// Move a fixed signed `amount` in or out of cash every month on `day_of_month`,
/// optionally only within `[start, end]`.
pub fn monthly_cash_move(
    amount: i64,
    day_of_month: i8,
    start: Option<Date>,
    end: Option<Date>,
) -> Result<Handler, ConfigError> {
    let move_cash = handler(move |ctx, _| change_cash(ctx, amount, 0).map(|_| ()));
    let monthly = on_day_of_month(day_of_month, move_cash)?;
    Ok(bounded(start, end, monthly))
}

/// Income level that applies from `effective_date` on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTier {
    pub effective_date: Date,
    pub amount: i64,
}

impl From<(Date, i64)> for IncomeTier {
    fn from((effective_date, amount): (Date, i64)) -> Self {
        Self {
            effective_date,
            amount,
        }
    }
}

/// Monthly income that changes over time.
///
/// `tiers` must be newest first. On each qualifying day the first tier already
/// in effect is paid; before the oldest tier starts nothing is paid.
pub fn tiered_income(tiers: Vec<IncomeTier>, day_of_month: i8) -> Result<Handler, ConfigError> {
    if tiers.is_empty() {
        return Err(ConfigError::EmptyIncomeSchedule);
    }
    for pair in tiers.windows(2) {
        if pair[0].effective_date <= pair[1].effective_date {
            return Err(ConfigError::IncomeTiersNotDescending {
                listed_before: pair[0].effective_date,
                listed_after: pair[1].effective_date,
            });
        }
    }

    let pay = handler(move |ctx, _| {
        let today = ctx.day_date;
        match tiers.iter().find(|tier| tier.effective_date <= today) {
            Some(tier) => change_cash(ctx, tier.amount, 0).map(|_| ()),
            None => Ok(()),
        }
    });
    on_day_of_month(day_of_month, pay)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::error::{LookupError, SimError};
    use crate::events::{CashChange, CashNegative, applied};
    use crate::simulation::Simulation;
    use jiff::civil::date;

    fn context_with_cash(quantity: i64) -> SimContext {
        let mut ctx = SimContext::new(1, date(2025, 1, 1));
        ctx.ledger.push(CASH, LedgerItem::cash(quantity, 0));
        ctx
    }

    #[test]
    fn test_change_cash_posts_state_change() {
        let mut ctx = context_with_cash(1_000);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        ctx.subscribe(
            EventKind::CashStateChange,
            applied(move |_, change: CashChange| {
                sink.borrow_mut().push(change);
                Ok(())
            }),
        );

        assert_eq!(change_cash(&mut ctx, 250, 0).unwrap(), 1_250);
        assert_eq!(ctx.ledger.total_quantity(CASH), 1_250);
        assert_eq!(
            *seen.borrow(),
            vec![CashChange {
                index: 0,
                by_how_much: 250,
                new_state: 1_250
            }]
        );
    }

    #[test]
    fn test_overdraft_posts_exactly_one_negative_event() {
        let mut ctx = context_with_cash(100);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        ctx.subscribe(
            EventKind::CashStateNegative,
            applied(move |_, negative: CashNegative| {
                sink.borrow_mut().push(negative);
                Ok(())
            }),
        );

        assert_eq!(change_cash(&mut ctx, -300, 0).unwrap(), -200);
        assert_eq!(ctx.ledger.total_quantity(CASH), -200);
        assert_eq!(
            *seen.borrow(),
            vec![CashNegative {
                index: 0,
                debit_level: -200
            }]
        );

        // a credit that leaves the balance negative is not an overdraft
        change_cash(&mut ctx, 50, 0).unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_change_cash_without_account_is_lookup_error() {
        let mut ctx = SimContext::new(1, date(2025, 1, 1));
        assert!(matches!(
            change_cash(&mut ctx, 10, 0),
            Err(SimError::Lookup(LookupError::CategoryNotFound(_)))
        ));

        ctx.ledger.push(CASH, LedgerItem::cash(0, 0));
        assert!(matches!(
            change_cash(&mut ctx, 10, 1),
            Err(SimError::Lookup(LookupError::IndexOutOfRange { index: 1, .. }))
        ));
    }

    #[test]
    fn test_monthly_cash_move_within_bounds() {
        let mut sim = Simulation::new(365, date(2025, 1, 1)).unwrap();
        sim.subscribe(EventKind::SimulationStarted, seed_cash(10_000));
        sim.subscribe(
            EventKind::DayStarted,
            monthly_cash_move(-1_000, 15, Some(date(2025, 3, 1)), Some(date(2025, 6, 15))).unwrap(),
        );

        let ledger = sim.run().unwrap();
        // March, April, May and June
        assert_eq!(ledger.total_quantity(CASH), 6_000);
    }

    #[test]
    fn test_tiered_income_pays_most_recent_tier() {
        let tiers = vec![
            IncomeTier::from((date(2025, 3, 1), 300)),
            IncomeTier::from((date(2025, 2, 1), 200)),
            IncomeTier::from((date(2025, 1, 15), 100)),
        ];
        let mut sim = Simulation::new(120, date(2025, 1, 1)).unwrap();
        sim.subscribe(EventKind::SimulationStarted, seed_cash(0));
        sim.subscribe(EventKind::DayStarted, tiered_income(tiers, 10).unwrap());

        let ledger = sim.run().unwrap();
        // Jan 10: nothing in effect, Feb 10: 200, Mar 10: 300, Apr 10: 300
        assert_eq!(ledger.total_quantity(CASH), 800);
    }

    #[test]
    fn test_tiered_income_validation() {
        assert_eq!(
            tiered_income(Vec::new(), 10).err(),
            Some(ConfigError::EmptyIncomeSchedule)
        );

        let ascending = vec![
            IncomeTier::from((date(2024, 1, 1), 100)),
            IncomeTier::from((date(2025, 1, 1), 200)),
        ];
        let err = tiered_income(ascending, 10).err().unwrap();
        assert_eq!(
            err,
            ConfigError::IncomeTiersNotDescending {
                listed_before: date(2024, 1, 1),
                listed_after: date(2025, 1, 1),
            }
        );
        assert_eq!(
            err.to_string(),
            "income tiers must be listed newest first: 2025-01-01 follows 2024-01-01 but is not older"
        );
    }

    #[test]
    fn test_seed_cash_records_acquisition_day() {
        let mut ctx = SimContext::new(10, date(2025, 1, 1));
        ctx.n_day = 4;
        seed_cash(500)(&mut ctx, &Payload::new()).unwrap();
        assert_eq!(ctx.ledger.items(CASH)[0].properties.acquired_on, 4);
    }
}
