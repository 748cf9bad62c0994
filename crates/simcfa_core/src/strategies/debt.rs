//! Overdraft financing and debt repayment

use super::cash::change_cash;
use super::guards::on_day_of_month;
use super::{Handler, handler};
use crate::error::{ConfigError, Result};
use crate::events::{CashNegative, EventKind, Payload, applied, keys};
use crate::model::{DEBT, ItemId, LedgerItem};
use crate::simulation::SimContext;

/// Annual rate charged on overdraft loans when none is configured
pub const DEFAULT_DEBT_RATE_PERCENT: f64 = 18.0;

/// Turn every overdraft into a loan at `rate_percent`.
///
/// Subscribe to `cash_state_negative`. The loan principal is the overdrawn
/// amount; the proceeds are credited back to the overdrawn cash item so the
/// shortfall is carried by the debt rather than by negative cash.
pub fn debt_acquisition(rate_percent: f64) -> Handler {
    applied(move |ctx: &mut SimContext, CashNegative { index, debit_level }| {
        let principal = -debit_level;
        let item = ctx
            .ledger
            .push(DEBT, LedgerItem::debt(principal, ctx.n_day, rate_percent));
        tracing::debug!(n_day = ctx.n_day, ?item, principal, rate_percent, "debt acquired");

        change_cash(ctx, principal, index)?;
        ctx.post(
            EventKind::DebtAcquired,
            &Payload::new()
                .with(keys::ITEM, item)
                .with(keys::CATEGORY, DEBT)
                .with(keys::DEBIT_LEVEL, debit_level),
        )
    })
}

/// Interest-free variant of [`debt_acquisition`]
pub fn ignore_debt() -> Handler {
    debt_acquisition(0.0)
}

/// Pay down debt from cash with a fixed budget on `day_of_month`.
///
/// Debts are repaid oldest first. A debt the budget covers is settled and
/// removed and the rest of the budget moves on to the next debt; a debt
/// larger than what is left of the budget is reduced and the walk stops.
pub fn debt_payback(monthly_budget: i64, day_of_month: i8) -> Result<Handler, ConfigError> {
    let pay = handler(move |ctx, _| pay_down(ctx, monthly_budget));
    on_day_of_month(day_of_month, pay)
}

fn pay_down(ctx: &mut SimContext, budget: i64) -> Result<()> {
    // Paying can overdraw cash, which appends new debt mid-walk
    let balances: Vec<(ItemId, i64)> = ctx
        .ledger
        .items(DEBT)
        .iter()
        .map(|debt| (debt.id, debt.quantity()))
        .collect();

    let mut remaining = budget;
    let mut settled = Vec::new();
    for (id, balance) in balances {
        if remaining <= 0 {
            break;
        }

        if balance <= remaining {
            change_cash(ctx, -balance, 0)?;
            settled.push(id);
            remaining -= balance;
        } else {
            change_cash(ctx, -remaining, 0)?;
            ctx.ledger.find_mut(DEBT, id)?.properties.quantity = balance - remaining;
            remaining = 0;
        }
    }

    for id in &settled {
        ctx.ledger.remove(DEBT, *id)?;
    }
    if remaining < budget {
        tracing::debug!(
            n_day = ctx.n_day,
            paid = budget - remaining,
            settled = settled.len(),
            "debt paid down"
        );
    }
    Ok(())
}
